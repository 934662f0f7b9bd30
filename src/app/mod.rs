// ==========================================
// 公司运营分析系统 - 应用层
// ==========================================
// 职责: 状态装配 + 工具调用面（命名操作、参数模式、JSON 信封）
// ==========================================

pub mod server;
pub mod state;
pub mod tools;

pub use server::run_stdio_server;
pub use state::AppState;
pub use tools::{dispatch, tool_catalog, ParamSpec, ToolSpec};

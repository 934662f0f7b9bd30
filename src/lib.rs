// ==========================================
// 公司运营分析系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持工具 (CRUD + 聚合报表 + AI 分析)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// Schema 管理 - 建表/索引/种子数据
pub mod schema;

// 聚合引擎层 - 派生统计 (只读)
pub mod engine;

// AI 网关 - 外部文本生成服务
pub mod ai;

// API 层 - 业务接口
pub mod api;

// 应用层 - 工具调用入口
pub mod app;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use api::error::{ApiError, ApiResult};
pub use app::AppState;
pub use config::AppConfig;
pub use domain::{Department, Employee, Expense, PerformanceRating};
pub use repository::{RepositoryError, RepositoryResult};

/// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

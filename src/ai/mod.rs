// ==========================================
// 公司运营分析系统 - AI 分析网关
// ==========================================
// 职责: 组装聚合数据为提示词，转发给外部文本生成服务
// 约束: 外部服务是不透明函数（文本进、文本出），
//       数据范围元信息完全由本地聚合导出，不依赖外部返回
// ==========================================

pub mod gateway;
pub mod gemini;
pub mod prompt;

pub use gateway::{AnalysisGateway, AnalysisReport, DataScope};
pub use gemini::GeminiClient;

use async_trait::async_trait;

/// 外部文本生成服务抽象
///
/// 生产实现是 Gemini HTTP 客户端；测试注入 mock。
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;

    /// 服务商标签（回显在分析结果里）
    fn provider(&self) -> &str;
}

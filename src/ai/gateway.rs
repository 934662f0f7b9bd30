// ==========================================
// 公司运营分析系统 - 分析网关
// ==========================================
// 职责: 聚合 → 提示词 → 外部服务 → 原文返回
// 约束: data_scope 元信息完全来自本地聚合，与外部返回无关
// ==========================================

use crate::ai::prompt::build_analysis_prompt;
use crate::ai::TextGenerator;
use crate::api::error::{ApiError, ApiResult};
use crate::engine::{expense_window_start, AnalyticsEngine};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 分析覆盖的数据范围（本地可复现，不依赖外部服务返回）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataScope {
    pub total_employees: i64,
    pub departments_analyzed: usize,
    /// 费用窗口口径叙述，如 "Last 30 days (2025-02-13 to 2025-03-15)"
    pub expense_period: String,
}

/// 分析结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub query: String,
    pub analysis: String,
    pub data_scope: DataScope,
    pub ai_provider: String,
}

/// 分析网关
///
/// generator 为 None 表示凭据未配置（显式占位符也视同未配置），
/// 此时调用直接返回 ConfigurationError。
pub struct AnalysisGateway {
    engine: Arc<AnalyticsEngine>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl AnalysisGateway {
    pub fn new(engine: Arc<AnalyticsEngine>, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { engine, generator }
    }

    /// AI 分析（当前日期锚点）
    pub async fn analyze(&self, query: &str) -> ApiResult<AnalysisReport> {
        self.analyze_at(query, Local::now().date_naive()).await
    }

    /// AI 分析
    ///
    /// # 返回
    /// - Err(ConfigurationError): 凭据未配置
    /// - Err(UpstreamError): 外部服务调用失败
    pub async fn analyze_at(&self, query: &str, today: NaiveDate) -> ApiResult<AnalysisReport> {
        let generator = self.generator.as_ref().ok_or_else(|| {
            ApiError::ConfigurationError(
                "GEMINI_API_KEY not configured in environment".to_string(),
            )
        })?;

        // 本地聚合（提示词数据与 data_scope 同源）
        let summaries = self.engine.all_department_summaries_at(today)?;
        let overview = self.engine.company_overview_at(today)?;

        let prompt = build_analysis_prompt(&overview, &summaries, query);

        tracing::debug!(
            "forwarding analysis prompt: chars={}, departments={}",
            prompt.len(),
            summaries.len()
        );

        let analysis = generator
            .generate(&prompt)
            .await
            .map_err(|e| ApiError::UpstreamError(format!("AI analysis failed: {}", e)))?;

        Ok(AnalysisReport {
            query: query.to_string(),
            analysis,
            data_scope: DataScope {
                total_employees: overview.total_employees,
                departments_analyzed: summaries.len(),
                expense_period: format!(
                    "Last 30 days ({} to {})",
                    expense_window_start(today),
                    today.format("%Y-%m-%d")
                ),
            },
            ai_provider: generator.provider().to_string(),
        })
    }
}

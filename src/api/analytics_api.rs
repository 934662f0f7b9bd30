// ==========================================
// 公司运营分析系统 - 聚合报表接口
// ==========================================
// 职责: 把聚合引擎的只读统计转换为 API 层错误口径
// ==========================================

use crate::api::error::ApiResult;
use crate::engine::{
    AnalyticsEngine, BurnRateProjection, CompanyOverview, DepartmentComparisonRow,
    DepartmentSummary, RatingDistribution,
};
use std::sync::Arc;

/// 聚合报表接口
pub struct AnalyticsApi {
    engine: Arc<AnalyticsEngine>,
}

impl AnalyticsApi {
    pub fn new(engine: Arc<AnalyticsEngine>) -> Self {
        Self { engine }
    }

    /// 部门综合摘要
    ///
    /// # 返回
    /// - Err(NotFound): 部门不存在
    pub fn department_summary(&self, name: &str) -> ApiResult<DepartmentSummary> {
        Ok(self.engine.department_summary(name)?)
    }

    /// 全部门摘要（单部门失败时跳过该部门）
    pub fn all_department_summaries(&self) -> ApiResult<Vec<DepartmentSummary>> {
        Ok(self.engine.all_department_summaries()?)
    }

    /// 公司总览
    pub fn company_overview(&self) -> ApiResult<CompanyOverview> {
        Ok(self.engine.company_overview()?)
    }

    /// 部门燃烧率投影
    pub fn burn_rate_projection(&self, name: &str) -> ApiResult<BurnRateProjection> {
        Ok(self.engine.burn_rate_projection(name)?)
    }

    /// 部门横向对比（全时段口径）
    pub fn compare_departments(&self) -> ApiResult<Vec<DepartmentComparisonRow>> {
        Ok(self.engine.compare_departments()?)
    }

    /// 全局评分分布
    pub fn rating_distribution(&self) -> ApiResult<RatingDistribution> {
        Ok(self.engine.rating_distribution()?)
    }
}

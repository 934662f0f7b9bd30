// ==========================================
// 公司运营分析系统 - 绩效业务接口
// ==========================================
// 职责: 绩效评分录入
// 红线: 评分越界是 ValidationError，不做静默截断
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::performance::{rating_in_range, RATING_MAX, RATING_MIN};
use crate::domain::NewPerformanceRating;
use crate::repository::{EmployeeRepository, PerformanceRepository};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 新增评分请求
#[derive(Debug, Clone)]
pub struct AddRatingRequest {
    pub employee_name: String,
    pub rating: i32,
    pub month: Option<String>,
    pub comments: Option<String>,
}

/// 新增评分结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingAdded {
    pub message: String,
    pub performance_id: i64,
    pub rating: i32,
    pub month: String,
}

/// 绩效业务接口
pub struct PerformanceApi {
    performance_repo: Arc<PerformanceRepository>,
    employee_repo: Arc<EmployeeRepository>,
}

impl PerformanceApi {
    pub fn new(
        performance_repo: Arc<PerformanceRepository>,
        employee_repo: Arc<EmployeeRepository>,
    ) -> Self {
        Self {
            performance_repo,
            employee_repo,
        }
    }

    /// 录入绩效评分
    ///
    /// # 返回
    /// - Err(ValidationError): rating 不在 [1, 5]
    /// - Err(NotFound): 员工不存在
    pub fn add_performance_rating(&self, request: &AddRatingRequest) -> ApiResult<RatingAdded> {
        if !rating_in_range(request.rating) {
            return Err(ApiError::ValidationError(format!(
                "Rating must be between {} and {}",
                RATING_MIN, RATING_MAX
            )));
        }

        let month = request
            .month
            .clone()
            .unwrap_or_else(|| Local::now().format("%Y-%m").to_string());

        let employee_id = self
            .employee_repo
            .find_id_by_name(&request.employee_name)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Employee '{}' not found", request.employee_name))
            })?;

        let performance_id = self.performance_repo.insert(&NewPerformanceRating {
            employee_id,
            rating: request.rating,
            month: month.clone(),
            comments: request.comments.clone(),
        })?;

        tracing::info!(
            "performance rating added: employee={}, rating={}, month={}",
            request.employee_name,
            request.rating,
            month
        );

        Ok(RatingAdded {
            message: format!(
                "Performance rating added for '{}'",
                request.employee_name
            ),
            performance_id,
            rating: request.rating,
            month,
        })
    }
}

// ==========================================
// 公司运营分析系统 - 绩效领域模型
// ==========================================
// 对齐: schema performance 表
// 红线: rating 必须落在 [1, 5]，越界是校验错误而非静默截断
// ==========================================

use serde::{Deserialize, Serialize};

/// 绩效评分实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceRating {
    pub id: i64,
    pub employee_id: i64,         // FK -> employees.id
    pub rating: i32,              // 1..=5
    pub month: String,            // YYYY-MM，按字符串字典序比较时间窗
    pub comments: Option<String>,
}

/// 待写入的绩效评分
#[derive(Debug, Clone)]
pub struct NewPerformanceRating {
    pub employee_id: i64,
    pub rating: i32,
    pub month: String,
    pub comments: Option<String>,
}

/// 评分合法区间
pub const RATING_MIN: i32 = 1;
pub const RATING_MAX: i32 = 5;

/// 评分是否落在合法区间
pub fn rating_in_range(rating: i32) -> bool {
    (RATING_MIN..=RATING_MAX).contains(&rating)
}

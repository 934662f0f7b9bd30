// ==========================================
// 公司运营分析系统 - 聚合引擎层
// ==========================================
// 职责: 派生统计（部门摘要/公司总览/燃烧率/对比/评分分布）
// 红线: 引擎只读，绝不修改存储层数据
// ==========================================

pub mod comparison;
pub mod summary;

pub use comparison::{DepartmentComparisonRow, RatingBucket, RatingDistribution};
pub use summary::{
    AnalyticsEngine, BurnRateProjection, CompanyOverview, DepartmentSummary, ExpenseCategoryTotal,
    ExpenseWindowStats, PerformanceWindowStats, SalaryStats,
};

use chrono::{Months, NaiveDate};

/// 30天费用窗口的下界（含），YYYY-MM-DD
pub fn expense_window_start(today: NaiveDate) -> String {
    (today - chrono::Duration::days(30))
        .format("%Y-%m-%d")
        .to_string()
}

/// 3个月绩效窗口的月份下界（含），YYYY-MM
///
/// 按日历减法回推 3 个月（而非 90 天近似），与 month 字段的
/// 字典序 >= 比较配合使用。
pub fn rating_month_floor(today: NaiveDate) -> String {
    today
        .checked_sub_months(Months::new(3))
        .unwrap_or(today)
        .format("%Y-%m")
        .to_string()
}

/// 货币金额展示口径: 保留 2 位小数
///
/// 内部累加始终走全精度，只在组装响应时取整。
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 百分比展示口径: 保留 1 位小数
pub fn round_percent(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_window_start() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert_eq!(expense_window_start(today), "2025-02-13");
    }

    #[test]
    fn test_rating_month_floor_calendar_subtraction() {
        // 日历减法: 5月 → 2月，而非 90 天近似
        let today = NaiveDate::from_ymd_opt(2025, 5, 31).unwrap();
        assert_eq!(rating_month_floor(today), "2025-02");

        // 跨年
        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert_eq!(rating_month_floor(today), "2024-10");
    }

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(3.3333333), 3.33);
        assert_eq!(round_currency(4.567), 4.57);
        assert_eq!(round_currency(0.0), 0.0);
    }
}

// ==========================================
// 聚合引擎集成测试
// ==========================================
// 测试目标: 固定日期锚点下验证窗口口径、汇总数值与边界行为
// ==========================================

mod test_helpers;

use company_analytics::engine::AnalyticsEngine;
use company_analytics::logging;
use company_analytics::repository::{RepositoryError, SharedConnection};
use test_helpers::{date, insert_department, insert_employee, insert_expense, insert_rating};

/// 固定锚点: 2025-06-15
/// 费用窗口下界 2025-05-16，绩效月份下界 "2025-03"
fn anchor() -> chrono::NaiveDate {
    date(2025, 6, 15)
}

/// 构造标准测试数据集
///
/// Tech 部门: 两名员工（年薪合计 180000），窗口内费用 500（2 笔），
/// 窗口外费用 999；窗口内评分 4 和 5，窗口外评分 1。
fn seed_tech_fixture(conn: &SharedConnection) -> i64 {
    let tech_id = insert_department(conn, "Tech", "Engineering").expect("insert dept");

    let alice = insert_employee(conn, "EMP0001", "Alice Zhang", tech_id, 120_000.0)
        .expect("insert alice");
    insert_employee(conn, "EMP0002", "Bob Li", tech_id, 60_000.0).expect("insert bob");

    // 窗口内（>= 2025-05-16）
    insert_expense(conn, tech_id, date(2025, 6, 1), 300.0, "Software").expect("expense 1");
    insert_expense(conn, tech_id, date(2025, 5, 16), 200.0, "Software").expect("expense 2");
    // 窗口外（2025-05-15 恰好差一天）
    insert_expense(conn, tech_id, date(2025, 5, 15), 999.0, "Travel").expect("expense 3");

    // 窗口内（month >= "2025-03"）
    insert_rating(conn, alice, 4, "2025-05").expect("rating 1");
    insert_rating(conn, alice, 5, "2025-03").expect("rating 2");
    // 窗口外
    insert_rating(conn, alice, 1, "2025-02").expect("rating 3");

    tech_id
}

#[test]
fn test_department_summary_window_semantics() {
    logging::init_test();

    let (_db, conn) = test_helpers::create_test_db().expect("create test db");
    seed_tech_fixture(&conn);

    let engine = AnalyticsEngine::new(conn);
    let summary = engine
        .department_summary_at("Tech", anchor())
        .expect("summary");

    assert_eq!(summary.department.name, "Tech");
    assert_eq!(summary.employees.count, 2);
    assert_eq!(summary.employees.total_salary_burden, 180_000.0);

    // 2025-05-15 的 999 元在窗口外
    assert_eq!(summary.expenses_last_30_days.total, 500.0);
    assert_eq!(summary.expenses_last_30_days.count, 2);
    assert_eq!(summary.expenses_last_30_days.by_category.len(), 1);
    assert_eq!(summary.expenses_last_30_days.by_category[0].category, "Software");
    assert_eq!(summary.expenses_last_30_days.by_category[0].total, 500.0);

    // "2025-02" 的评分 1 在窗口外，均值 = (4+5)/2
    assert_eq!(summary.performance_last_3_months.rating_count, 2);
    assert_eq!(summary.performance_last_3_months.average_rating, 4.5);
}

#[test]
fn test_department_summary_case_insensitive_lookup() {
    let (_db, conn) = test_helpers::create_test_db().expect("create test db");
    seed_tech_fixture(&conn);

    let engine = AnalyticsEngine::new(conn);
    let summary = engine
        .department_summary_at("tech", anchor())
        .expect("lowercase lookup should hit");
    assert_eq!(summary.department.name, "Tech");
}

#[test]
fn test_department_summary_not_found() {
    let (_db, conn) = test_helpers::create_test_db().expect("create test db");
    let engine = AnalyticsEngine::new(conn);

    let err = engine
        .department_summary_at("Ghost", anchor())
        .expect_err("unknown department must fail");
    assert!(matches!(
        err,
        RepositoryError::NotFound { ref entity, ref key } if entity == "Department" && key == "Ghost"
    ));
}

#[test]
fn test_empty_department_summary_is_all_zero() {
    let (_db, conn) = test_helpers::create_test_db().expect("create test db");
    insert_department(&conn, "Empty", "").expect("insert dept");

    let engine = AnalyticsEngine::new(conn);
    let summary = engine
        .department_summary_at("Empty", anchor())
        .expect("empty department still summarizes");

    assert_eq!(summary.employees.count, 0);
    assert_eq!(summary.employees.total_salary_burden, 0.0);
    assert_eq!(summary.expenses_last_30_days.total, 0.0);
    assert_eq!(summary.expenses_last_30_days.count, 0);
    assert!(summary.expenses_last_30_days.by_category.is_empty());
    assert_eq!(summary.performance_last_3_months.average_rating, 0.0);
    assert_eq!(summary.performance_last_3_months.rating_count, 0);
}

#[test]
fn test_all_department_summaries_ordered_by_name() {
    let (_db, conn) = test_helpers::create_test_db().expect("create test db");
    seed_tech_fixture(&conn);
    insert_department(&conn, "Admin", "").expect("insert dept");

    let engine = AnalyticsEngine::new(conn);
    let summaries = engine
        .all_department_summaries_at(anchor())
        .expect("summaries");

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].department.name, "Admin");
    assert_eq!(summaries[1].department.name, "Tech");
}

#[test]
fn test_company_overview_at_anchor() {
    let (_db, conn) = test_helpers::create_test_db().expect("create test db");
    seed_tech_fixture(&conn);

    let engine = AnalyticsEngine::new(conn);
    let overview = engine.company_overview_at(anchor()).expect("overview");

    assert_eq!(overview.total_employees, 2);
    assert_eq!(overview.total_salary, 180_000.0);
    assert_eq!(overview.total_expenses_30d, 500.0);
}

#[test]
fn test_burn_rate_projection_arithmetic() {
    let (_db, conn) = test_helpers::create_test_db().expect("create test db");
    seed_tech_fixture(&conn);

    let engine = AnalyticsEngine::new(conn);
    let burn = engine
        .burn_rate_projection_at("Tech", anchor())
        .expect("burn rate");

    // 180000 / 12 + 500
    assert_eq!(burn.department, "Tech");
    assert_eq!(burn.monthly_salary, 15_000.0);
    assert_eq!(burn.monthly_expenses, 500.0);
    assert_eq!(burn.monthly_burn, 15_500.0);
    assert_eq!(burn.annual_projection, 186_000.0);
}

#[test]
fn test_compare_departments_uses_all_time_figures() {
    let (_db, conn) = test_helpers::create_test_db().expect("create test db");
    seed_tech_fixture(&conn);
    insert_department(&conn, "Admin", "").expect("insert dept");

    let engine = AnalyticsEngine::new(conn);
    let rows = engine.compare_departments().expect("comparison");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].department, "Admin");
    assert_eq!(rows[0].employee_count, 0);
    assert_eq!(rows[0].average_rating, 0.0);

    // 全时段口径: 三笔费用、三条评分全部计入
    let tech = &rows[1];
    assert_eq!(tech.department, "Tech");
    assert_eq!(tech.employee_count, 2);
    assert_eq!(tech.total_salary, 180_000.0);
    assert_eq!(tech.expense_count, 3);
    assert_eq!(tech.total_expenses, 1_499.0);
    assert_eq!(tech.average_rating, 3.33);
}

#[test]
fn test_rating_distribution_percentages() {
    let (_db, conn) = test_helpers::create_test_db().expect("create test db");
    seed_tech_fixture(&conn);

    let engine = AnalyticsEngine::new(conn);
    let dist = engine.rating_distribution().expect("distribution");

    assert_eq!(dist.total_ratings, 3);
    assert_eq!(dist.average_rating, 3.33);

    // 档位从 5 到 1，含计数为 0 的档位
    assert_eq!(dist.buckets.len(), 5);
    let ratings: Vec<i32> = dist.buckets.iter().map(|b| b.rating).collect();
    assert_eq!(ratings, vec![5, 4, 3, 2, 1]);

    assert_eq!(dist.buckets[0].count, 1); // rating 5
    assert_eq!(dist.buckets[0].percentage, 33.3);
    assert_eq!(dist.buckets[2].count, 0); // rating 3
    assert_eq!(dist.buckets[2].percentage, 0.0);
    assert_eq!(dist.buckets[4].count, 1); // rating 1
    assert_eq!(dist.buckets[4].percentage, 33.3);
}

#[test]
fn test_rating_distribution_empty_table() {
    let (_db, conn) = test_helpers::create_test_db().expect("create test db");
    let engine = AnalyticsEngine::new(conn);

    let dist = engine.rating_distribution().expect("distribution");
    assert_eq!(dist.total_ratings, 0);
    assert_eq!(dist.average_rating, 0.0);
    assert!(dist.buckets.iter().all(|b| b.count == 0 && b.percentage == 0.0));
}

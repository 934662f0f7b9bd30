// ==========================================
// 工具调用面 E2E 测试
// ==========================================
// 测试目标: 从工具名 + JSON 参数到响应信封的完整链路
// ==========================================

mod test_helpers;

use company_analytics::app::{dispatch, tool_catalog};
use serde_json::json;
use test_helpers::create_test_state;

#[tokio::test]
async fn test_add_and_summarize_department_via_tools() {
    let (state, _db) = create_test_state().expect("create state");

    let response = dispatch(
        &state,
        "add_department",
        json!({"name": "Tech", "description": "Engineering"}),
    )
    .await;
    assert_eq!(response["status"], "success");
    assert!(response["department_id"].as_i64().unwrap() > 0);

    let response = dispatch(
        &state,
        "add_employee",
        json!({
            "name": "Alice Zhang",
            "role": "Engineer",
            "department_name": "Tech",
            "salary": 120000.0
        }),
    )
    .await;
    assert_eq!(response["status"], "success");
    assert_eq!(response["employee_number"], "EMP0001");

    let response = dispatch(&state, "get_department_summary", json!({"name": "Tech"})).await;
    assert_eq!(response["status"], "success");
    assert_eq!(response["employees"]["count"], 1);
    assert_eq!(response["employees"]["total_salary_burden"], 120000.0);
}

#[tokio::test]
async fn test_duplicate_department_error_envelope() {
    let (state, _db) = create_test_state().expect("create state");

    dispatch(&state, "add_department", json!({"name": "HR"})).await;
    let response = dispatch(&state, "add_department", json!({"name": "hr"})).await;

    assert_eq!(response["status"], "error");
    assert_eq!(response["code"], "DUPLICATE_KEY");
    assert!(response["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn test_conflict_envelope_carries_dependent_counts() {
    let (state, _db) = create_test_state().expect("create state");

    dispatch(&state, "add_department", json!({"name": "Tech"})).await;
    dispatch(
        &state,
        "add_employee",
        json!({
            "name": "Alice Zhang",
            "role": "Engineer",
            "department_name": "Tech",
            "salary": 100000.0
        }),
    )
    .await;
    dispatch(
        &state,
        "add_expense",
        json!({"amount": 50.0, "category": "Software", "department_name": "Tech"}),
    )
    .await;

    let response = dispatch(&state, "delete_department", json!({"name": "Tech"})).await;
    assert_eq!(response["status"], "error");
    assert_eq!(response["code"], "CONFLICT");
    assert_eq!(response["employees_count"], 1);
    assert_eq!(response["expenses_count"], 1);

    let response = dispatch(
        &state,
        "delete_department",
        json!({"name": "Tech", "force": true}),
    )
    .await;
    assert_eq!(response["status"], "success");
    assert_eq!(response["cascade_deleted"]["employees"], 1);
    assert_eq!(response["cascade_deleted"]["expenses"], 1);
}

#[tokio::test]
async fn test_validation_error_envelopes() {
    let (state, _db) = create_test_state().expect("create state");
    dispatch(&state, "add_department", json!({"name": "Tech"})).await;
    dispatch(
        &state,
        "add_employee",
        json!({
            "name": "Alice Zhang",
            "role": "Engineer",
            "department_name": "Tech",
            "salary": 100000.0
        }),
    )
    .await;

    // 越界评分
    let response = dispatch(
        &state,
        "add_performance",
        json!({"employee_name": "Alice Zhang", "rating": 6}),
    )
    .await;
    assert_eq!(response["status"], "error");
    assert_eq!(response["code"], "VALIDATION_ERROR");

    // 非法日期
    let response = dispatch(
        &state,
        "add_expense",
        json!({
            "amount": 5.0,
            "category": "Misc",
            "department_name": "Tech",
            "date": "06/01/2025"
        }),
    )
    .await;
    assert_eq!(response["status"], "error");
    assert_eq!(response["code"], "VALIDATION_ERROR");

    // 缺参数
    let response = dispatch(&state, "add_employee", json!({"name": "Bob"})).await;
    assert_eq!(response["status"], "error");
    assert_eq!(response["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_tool_and_missing_entity() {
    let (state, _db) = create_test_state().expect("create state");

    let response = dispatch(&state, "no_such_tool", json!({})).await;
    assert_eq!(response["status"], "error");
    assert_eq!(response["code"], "VALIDATION_ERROR");
    assert!(response["message"].as_str().unwrap().contains("no_such_tool"));

    let response = dispatch(&state, "get_burn_rate", json!({"name": "Ghost"})).await;
    assert_eq!(response["status"], "error");
    assert_eq!(response["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_analyze_without_key_is_configuration_error() {
    let (state, _db) = create_test_state().expect("create state");

    let response = dispatch(
        &state,
        "analyze_company_with_ai",
        json!({"query": "How is spending?"}),
    )
    .await;
    assert_eq!(response["status"], "error");
    assert_eq!(response["code"], "CONFIGURATION_ERROR");
}

#[tokio::test]
async fn test_placeholder_api_key_yields_configuration_error() {
    use company_analytics::config::AppConfig;
    use company_analytics::AppState;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // 模板 .env 里的占位符必须被视作未配置凭据
    std::env::set_var("GEMINI_API_KEY", "your_gemini_key_here");
    let mut config = AppConfig::from_env();
    std::env::remove_var("GEMINI_API_KEY");

    assert_eq!(config.gemini_api_key, None);

    let db_file = NamedTempFile::new().expect("temp db");
    let mut seed_file = NamedTempFile::new().expect("temp seed");
    seed_file.write_all(b"[]").expect("write seed");
    seed_file.flush().expect("flush seed");
    config.db_path = db_file.path().to_string_lossy().to_string();
    config.seed_path = Some(seed_file.path().to_path_buf());

    let state = AppState::new(&config).expect("create state");
    let response = dispatch(
        &state,
        "analyze_company_with_ai",
        json!({"query": "How is spending?"}),
    )
    .await;
    assert_eq!(response["status"], "error");
    assert_eq!(response["code"], "CONFIGURATION_ERROR");
    assert!(response["message"]
        .as_str()
        .unwrap()
        .contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn test_list_tools_matches_catalog() {
    let (state, _db) = create_test_state().expect("create state");

    let response = dispatch(&state, "list_tools", json!({})).await;
    assert_eq!(response["status"], "success");

    let tools = response["tools"].as_array().expect("tools array");
    assert_eq!(tools.len(), tool_catalog().len());
    assert!(tools
        .iter()
        .any(|t| t["name"] == "get_rating_distribution"));
}

#[tokio::test]
async fn test_reporting_tools_on_empty_database() {
    let (state, _db) = create_test_state().expect("create state");

    let response = dispatch(&state, "get_company_overview", json!({})).await;
    assert_eq!(response["status"], "success");
    assert_eq!(response["total_employees"], 0);
    assert_eq!(response["total_salary"], 0.0);

    let response = dispatch(&state, "get_all_department_summaries", json!({})).await;
    assert_eq!(response["status"], "success");
    assert_eq!(response["count"], 0);

    let response = dispatch(&state, "compare_departments", json!({})).await;
    assert_eq!(response["status"], "success");
    assert_eq!(response["departments"].as_array().unwrap().len(), 0);

    let response = dispatch(&state, "get_rating_distribution", json!({})).await;
    assert_eq!(response["status"], "success");
    assert_eq!(response["total_ratings"], 0);
}

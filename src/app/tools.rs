// ==========================================
// 公司运营分析系统 - 工具调用面
// ==========================================
// 职责: 把 API 层操作暴露为带参数模式文档的命名工具，
//       统一返回 {"status": "success"|"error", ...} JSON 信封
// 约束: 未知工具名与非法参数一律返回 error 信封，绝不 panic
// ==========================================

use crate::api::error::ApiError;
use crate::app::state::AppState;
use crate::api::employee_api::AddEmployeeRequest;
use crate::api::expense_api::AddExpenseRequest;
use crate::api::performance_api::AddRatingRequest;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ==========================================
// 工具目录（参数模式文档）
// ==========================================

/// 单个参数的模式描述
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub param_type: &'static str,
    pub required: bool,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// 命名工具的模式描述
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

fn required(name: &'static str, param_type: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        param_type,
        required: true,
        description,
        default: None,
    }
}

fn optional(
    name: &'static str,
    param_type: &'static str,
    description: &'static str,
    default: Option<Value>,
) -> ParamSpec {
    ParamSpec {
        name,
        param_type,
        required: false,
        description,
        default,
    }
}

/// 全部工具的模式目录
pub fn tool_catalog() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "add_department",
            description: "Create a new department (name must be unique, case-insensitive)",
            params: vec![
                required("name", "string", "Department name"),
                optional("description", "string", "Department description", Some(json!(""))),
            ],
        },
        ToolSpec {
            name: "add_employee",
            description: "Add a new employee to a department",
            params: vec![
                required("name", "string", "Employee full name"),
                required("role", "string", "Job role/title"),
                required("department_name", "string", "Department the employee belongs to"),
                required("salary", "number", "Annual salary, non-negative"),
                optional(
                    "employee_number",
                    "string",
                    "Unique employee id (e.g. EMP0001); auto-generated when omitted",
                    None,
                ),
                optional("join_date", "string", "Join date YYYY-MM-DD, defaults to today", None),
            ],
        },
        ToolSpec {
            name: "add_expense",
            description: "Record an expense for a department",
            params: vec![
                required("amount", "number", "Expense amount"),
                required("category", "string", "Expense category label"),
                required("department_name", "string", "Department the expense belongs to"),
                optional("date", "string", "Expense date YYYY-MM-DD, defaults to today", None),
                optional("note", "string", "Optional note", None),
            ],
        },
        ToolSpec {
            name: "add_performance",
            description: "Add a performance rating (1-5) for an employee",
            params: vec![
                required("employee_name", "string", "Employee full name"),
                required("rating", "integer", "Rating from 1 (poor) to 5 (excellent)"),
                optional("month", "string", "Month YYYY-MM, defaults to current month", None),
                optional("comments", "string", "Optional comments", None),
            ],
        },
        ToolSpec {
            name: "delete_employee",
            description: "Delete an employee by employee number or name; cascades ratings",
            params: vec![required(
                "identifier",
                "string",
                "Employee number (exact) or employee name (case-insensitive)",
            )],
        },
        ToolSpec {
            name: "delete_expense",
            description: "Delete an expense record by id",
            params: vec![required("id", "integer", "Expense id")],
        },
        ToolSpec {
            name: "delete_department",
            description: "Delete a department; refuses when dependents exist unless force=true",
            params: vec![
                required("name", "string", "Department name"),
                optional(
                    "force",
                    "boolean",
                    "Cascade-delete ratings, employees and expenses",
                    Some(json!(false)),
                ),
            ],
        },
        ToolSpec {
            name: "delete_duplicate_employees",
            description: "Remove duplicate employees (same name + department), keeping the earliest record",
            params: vec![],
        },
        ToolSpec {
            name: "list_employees",
            description: "List employees, optionally filtered by department",
            params: vec![optional("department_name", "string", "Department filter", None)],
        },
        ToolSpec {
            name: "list_expenses",
            description: "List expenses with totals and per-category breakdown",
            params: vec![
                optional("department_name", "string", "Department filter", None),
                optional("start_date", "string", "Start date YYYY-MM-DD (inclusive)", None),
                optional("end_date", "string", "End date YYYY-MM-DD (inclusive)", None),
            ],
        },
        ToolSpec {
            name: "get_department_summary",
            description: "Department summary: headcount, salary, 30-day expenses, 3-month ratings",
            params: vec![required("name", "string", "Department name")],
        },
        ToolSpec {
            name: "get_all_department_summaries",
            description: "Summaries for every department, ordered by name",
            params: vec![],
        },
        ToolSpec {
            name: "get_company_overview",
            description: "Company totals: employees, salary, trailing 30-day expenses",
            params: vec![],
        },
        ToolSpec {
            name: "get_burn_rate",
            description: "Monthly burn rate and annual projection for a department",
            params: vec![required("name", "string", "Department name")],
        },
        ToolSpec {
            name: "compare_departments",
            description: "Side-by-side department comparison (all-time figures)",
            params: vec![],
        },
        ToolSpec {
            name: "get_rating_distribution",
            description: "Count and percentage for each rating value, 5 down to 1",
            params: vec![],
        },
        ToolSpec {
            name: "analyze_company_with_ai",
            description: "AI-powered analysis over aggregated company data",
            params: vec![required("query", "string", "Natural language question")],
        },
        ToolSpec {
            name: "list_tools",
            description: "List every available tool with its argument schema",
            params: vec![],
        },
    ]
}

// ==========================================
// JSON 信封
// ==========================================

/// 成功信封: {"status":"success"} 与载荷字段平铺合并
fn success_envelope<T: Serialize>(payload: &T) -> Value {
    match serde_json::to_value(payload) {
        Ok(Value::Object(mut map)) => {
            map.insert("status".to_string(), json!("success"));
            Value::Object(map)
        }
        Ok(other) => json!({ "status": "success", "result": other }),
        Err(e) => internal_error_envelope(&format!("cannot serialize payload: {}", e)),
    }
}

/// 错误信封: 稳定错误码 + 可读消息 + 可选细节
fn error_envelope(err: &ApiError) -> Value {
    let code = match err {
        ApiError::NotFound(_) => "NOT_FOUND",
        ApiError::DuplicateKey(_) => "DUPLICATE_KEY",
        ApiError::ValidationError(_) => "VALIDATION_ERROR",
        ApiError::Conflict { .. } => "CONFLICT",
        ApiError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        ApiError::UpstreamError(_) => "UPSTREAM_ERROR",
        ApiError::DatabaseError(_) => "DATABASE_ERROR",
        ApiError::InternalError(_) => "INTERNAL_ERROR",
    };

    let mut envelope = json!({
        "status": "error",
        "code": code,
        "message": err.to_string(),
    });

    if let ApiError::Conflict {
        employees_count,
        expenses_count,
        ..
    } = err
    {
        envelope["employees_count"] = json!(employees_count);
        envelope["expenses_count"] = json!(expenses_count);
    }

    envelope
}

fn internal_error_envelope(message: &str) -> Value {
    json!({
        "status": "error",
        "code": "INTERNAL_ERROR",
        "message": message,
    })
}

fn result_envelope<T: Serialize>(result: Result<T, ApiError>) -> Value {
    match result {
        Ok(payload) => success_envelope(&payload),
        Err(e) => error_envelope(&e),
    }
}

// ==========================================
// 参数解析
// ==========================================

#[derive(Debug, Deserialize)]
struct AddDepartmentArgs {
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct AddEmployeeArgs {
    name: String,
    role: String,
    department_name: String,
    salary: f64,
    employee_number: Option<String>,
    join_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddExpenseArgs {
    amount: f64,
    category: String,
    department_name: String,
    date: Option<String>,
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddPerformanceArgs {
    employee_name: String,
    rating: i32,
    month: Option<String>,
    comments: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeleteEmployeeArgs {
    identifier: String,
}

#[derive(Debug, Deserialize)]
struct DeleteExpenseArgs {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct DeleteDepartmentArgs {
    name: String,
    #[serde(default)]
    force: bool,
}

#[derive(Debug, Deserialize)]
struct DepartmentFilterArgs {
    department_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListExpensesArgs {
    department_name: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DepartmentNameArgs {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AnalyzeArgs {
    query: String,
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, Value> {
    serde_json::from_value(args).map_err(|e| {
        error_envelope(&ApiError::ValidationError(format!("Invalid arguments: {}", e)))
    })
}

fn parse_date_arg(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, Value> {
    match value {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                error_envelope(&ApiError::ValidationError(format!(
                    "Invalid {} '{}': expected YYYY-MM-DD",
                    field, raw
                )))
            }),
    }
}

// ==========================================
// 调度器
// ==========================================

/// 分发一次工具调用
///
/// 所有失败路径（未知工具/非法参数/业务错误）都落在 error 信封里。
pub async fn dispatch(state: &AppState, tool: &str, args: Value) -> Value {
    tracing::debug!("dispatching tool call: tool={}", tool);

    match tool {
        "add_department" => match parse_args::<AddDepartmentArgs>(args) {
            Ok(a) => result_envelope(state.department_api.add_department(&a.name, &a.description)),
            Err(e) => e,
        },
        "add_employee" => match parse_args::<AddEmployeeArgs>(args) {
            Ok(a) => {
                let join_date = match parse_date_arg(a.join_date.as_deref(), "join_date") {
                    Ok(d) => d,
                    Err(e) => return e,
                };
                result_envelope(state.employee_api.add_employee(&AddEmployeeRequest {
                    name: a.name,
                    role: a.role,
                    department_name: a.department_name,
                    salary: a.salary,
                    employee_number: a.employee_number,
                    join_date,
                }))
            }
            Err(e) => e,
        },
        "add_expense" => match parse_args::<AddExpenseArgs>(args) {
            Ok(a) => {
                let date = match parse_date_arg(a.date.as_deref(), "date") {
                    Ok(d) => d,
                    Err(e) => return e,
                };
                result_envelope(state.expense_api.add_expense(&AddExpenseRequest {
                    amount: a.amount,
                    category: a.category,
                    department_name: a.department_name,
                    date,
                    note: a.note,
                }))
            }
            Err(e) => e,
        },
        "add_performance" => match parse_args::<AddPerformanceArgs>(args) {
            Ok(a) => result_envelope(state.performance_api.add_performance_rating(
                &AddRatingRequest {
                    employee_name: a.employee_name,
                    rating: a.rating,
                    month: a.month,
                    comments: a.comments,
                },
            )),
            Err(e) => e,
        },
        "delete_employee" => match parse_args::<DeleteEmployeeArgs>(args) {
            Ok(a) => result_envelope(state.employee_api.delete_employee(&a.identifier)),
            Err(e) => e,
        },
        "delete_expense" => match parse_args::<DeleteExpenseArgs>(args) {
            Ok(a) => result_envelope(state.expense_api.delete_expense(a.id)),
            Err(e) => e,
        },
        "delete_department" => match parse_args::<DeleteDepartmentArgs>(args) {
            Ok(a) => result_envelope(state.department_api.delete_department(&a.name, a.force)),
            Err(e) => e,
        },
        "delete_duplicate_employees" => {
            result_envelope(state.employee_api.delete_duplicate_employees())
        }
        "list_employees" => match parse_args::<DepartmentFilterArgs>(args) {
            Ok(a) => result_envelope(
                state
                    .employee_api
                    .list_employees(a.department_name.as_deref()),
            ),
            Err(e) => e,
        },
        "list_expenses" => match parse_args::<ListExpensesArgs>(args) {
            Ok(a) => result_envelope(state.expense_api.list_expenses(
                a.department_name.as_deref(),
                a.start_date.as_deref(),
                a.end_date.as_deref(),
            )),
            Err(e) => e,
        },
        "get_department_summary" => match parse_args::<DepartmentNameArgs>(args) {
            Ok(a) => result_envelope(state.analytics_api.department_summary(&a.name)),
            Err(e) => e,
        },
        "get_all_department_summaries" => {
            match state.analytics_api.all_department_summaries() {
                Ok(summaries) => json!({
                    "status": "success",
                    "count": summaries.len(),
                    "summaries": summaries,
                }),
                Err(e) => error_envelope(&e),
            }
        }
        "get_company_overview" => result_envelope(state.analytics_api.company_overview()),
        "get_burn_rate" => match parse_args::<DepartmentNameArgs>(args) {
            Ok(a) => result_envelope(state.analytics_api.burn_rate_projection(&a.name)),
            Err(e) => e,
        },
        "compare_departments" => match state.analytics_api.compare_departments() {
            Ok(rows) => json!({
                "status": "success",
                "count": rows.len(),
                "departments": rows,
            }),
            Err(e) => error_envelope(&e),
        },
        "get_rating_distribution" => result_envelope(state.analytics_api.rating_distribution()),
        "analyze_company_with_ai" => match parse_args::<AnalyzeArgs>(args) {
            Ok(a) => result_envelope(state.analysis_gateway.analyze(&a.query).await),
            Err(e) => e,
        },
        "list_tools" => json!({
            "status": "success",
            "tools": tool_catalog(),
        }),
        unknown => error_envelope(&ApiError::ValidationError(format!(
            "Unknown tool '{}'",
            unknown
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_are_unique() {
        let catalog = tool_catalog();
        let mut names: Vec<_> = catalog.iter().map(|t| t.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog.len());
    }

    #[test]
    fn test_error_envelope_carries_conflict_counts() {
        let err = ApiError::Conflict {
            message: "blocked".to_string(),
            employees_count: 3,
            expenses_count: 5,
        };
        let envelope = error_envelope(&err);
        assert_eq!(envelope["status"], "error");
        assert_eq!(envelope["code"], "CONFLICT");
        assert_eq!(envelope["employees_count"], 3);
        assert_eq!(envelope["expenses_count"], 5);
    }
}

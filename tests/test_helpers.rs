// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、应用状态装配、测试数据生成
// ==========================================

use company_analytics::config::{AppConfig, DEFAULT_GEMINI_MODEL};
use company_analytics::db::open_sqlite_connection;
use company_analytics::domain::{NewEmployee, NewExpense, NewPerformanceRating};
use company_analytics::repository::SharedConnection;
use company_analytics::schema;
use company_analytics::AppState;
use chrono::NaiveDate;
use rusqlite::params;
use std::error::Error;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema（不写入种子部门）
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - SharedConnection: 已统一 PRAGMA 的共享连接
pub fn create_test_db() -> Result<(NamedTempFile, SharedConnection), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    schema::init_database(&conn)?;

    Ok((temp_file, Arc::new(Mutex::new(conn))))
}

/// 装配干净的测试 AppState（空种子文件，库中没有任何部门）
///
/// # 返回
/// - AppState: 完整装配的应用状态（未配置 AI 凭据）
/// - NamedTempFile: 临时数据库文件（需要保持存活）
pub fn create_test_state() -> Result<(AppState, NamedTempFile), Box<dyn Error>> {
    create_test_state_with(false)
}

/// 同上，可选开启员工编号的事务硬化模式
pub fn create_test_state_with(
    atomic_employee_numbers: bool,
) -> Result<(AppState, NamedTempFile), Box<dyn Error>> {
    let db_file = NamedTempFile::new()?;

    // 空种子数组跳过内置种子，测试自行创建部门
    let mut seed_file = NamedTempFile::new()?;
    seed_file.write_all(b"[]")?;
    seed_file.flush()?;

    let config = AppConfig {
        db_path: db_file.path().to_string_lossy().to_string(),
        seed_path: Some(seed_file.path().to_path_buf()),
        gemini_api_key: None,
        gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
        atomic_employee_numbers,
    };

    let state = AppState::new(&config)?;
    Ok((state, db_file))
}

/// 直接插入部门，返回部门 id
pub fn insert_department(
    conn: &SharedConnection,
    name: &str,
    description: &str,
) -> Result<i64, Box<dyn Error>> {
    let conn = conn.lock().map_err(|e| e.to_string())?;
    conn.execute(
        "INSERT INTO departments (name, description) VALUES (?1, ?2)",
        params![name, description],
    )?;
    Ok(conn.last_insert_rowid())
}

/// 直接插入员工，返回员工 id
pub fn insert_employee(
    conn: &SharedConnection,
    employee_number: &str,
    name: &str,
    department_id: i64,
    salary: f64,
) -> Result<i64, Box<dyn Error>> {
    let employee = NewEmployee {
        employee_number: employee_number.to_string(),
        name: name.to_string(),
        role: "Engineer".to_string(),
        department_id,
        salary,
        join_date: date(2024, 1, 15),
    };
    let conn = conn.lock().map_err(|e| e.to_string())?;
    conn.execute(
        r#"
        INSERT INTO employees (employee_number, name, role, department_id, salary, join_date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            employee.employee_number,
            employee.name,
            employee.role,
            employee.department_id,
            employee.salary,
            employee.join_date,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// 直接插入费用记录
pub fn insert_expense(
    conn: &SharedConnection,
    department_id: i64,
    expense_date: NaiveDate,
    amount: f64,
    category: &str,
) -> Result<i64, Box<dyn Error>> {
    let expense = NewExpense {
        date: expense_date,
        amount,
        category: category.to_string(),
        note: None,
        department_id,
    };
    let conn = conn.lock().map_err(|e| e.to_string())?;
    conn.execute(
        r#"
        INSERT INTO expenses (date, amount, category, note, department_id)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            expense.date,
            expense.amount,
            expense.category,
            expense.note,
            expense.department_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// 直接插入绩效评分
pub fn insert_rating(
    conn: &SharedConnection,
    employee_id: i64,
    rating: i32,
    month: &str,
) -> Result<i64, Box<dyn Error>> {
    let record = NewPerformanceRating {
        employee_id,
        rating,
        month: month.to_string(),
        comments: None,
    };
    let conn = conn.lock().map_err(|e| e.to_string())?;
    conn.execute(
        r#"
        INSERT INTO performance (employee_id, rating, month, comments)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        params![record.employee_id, record.rating, record.month, record.comments],
    )?;
    Ok(conn.last_insert_rowid())
}

/// NaiveDate 简写
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

// ==========================================
// 公司运营分析系统 - Schema 管理
// ==========================================
// 职责: 建表/索引，首次运行时加载部门种子数据
// 约束: 全部 DDL 幂等（IF NOT EXISTS），允许重复启动
// ==========================================

use crate::domain::DepartmentSeed;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::path::Path;

/// 初始化数据库 schema
///
/// 四张表: departments / employees / expenses / performance，
/// 以及窗口聚合所需的四个索引。
pub fn init_database(conn: &Connection) -> RepositoryResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS departments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS employees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_number TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            department_id INTEGER NOT NULL,
            salary REAL NOT NULL,
            join_date TEXT NOT NULL,
            FOREIGN KEY (department_id) REFERENCES departments (id)
        );

        CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            amount REAL NOT NULL,
            category TEXT NOT NULL,
            note TEXT,
            department_id INTEGER NOT NULL,
            FOREIGN KEY (department_id) REFERENCES departments (id)
        );

        CREATE TABLE IF NOT EXISTS performance (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id INTEGER NOT NULL,
            rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            month TEXT NOT NULL,
            comments TEXT,
            FOREIGN KEY (employee_id) REFERENCES employees (id)
        );

        -- 30天/3月窗口聚合依赖的索引
        CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);
        CREATE INDEX IF NOT EXISTS idx_expenses_dept ON expenses(department_id);
        CREATE INDEX IF NOT EXISTS idx_employees_dept ON employees(department_id);
        CREATE INDEX IF NOT EXISTS idx_performance_emp ON performance(employee_id);
        "#,
    )?;
    Ok(())
}

/// 加载部门种子数据
///
/// 仅在 departments 表为空时写入，一次性消费。
///
/// # 返回
/// - Ok(usize): 实际写入的部门数（表非空时为 0）
pub fn seed_departments(conn: &Connection, seeds: &[DepartmentSeed]) -> RepositoryResult<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM departments", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(0);
    }

    let mut inserted = 0;
    for seed in seeds {
        inserted += conn.execute(
            "INSERT INTO departments (name, description) VALUES (?1, ?2)",
            params![seed.name, seed.description],
        )?;
    }

    tracing::info!("seeded {} departments", inserted);
    Ok(inserted)
}

/// 从 JSON 文件读取部门种子列表
///
/// 文件格式: `[{"name": "...", "description": "..."}, ...]`
pub fn load_seed_file(path: &Path) -> RepositoryResult<Vec<DepartmentSeed>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        RepositoryError::ValidationError(format!(
            "cannot read seed file {}: {}",
            path.display(),
            e
        ))
    })?;
    let seeds: Vec<DepartmentSeed> = serde_json::from_str(&content).map_err(|e| {
        RepositoryError::ValidationError(format!(
            "invalid seed file {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(seeds)
}

/// 内置的默认部门种子
pub fn default_seeds() -> Vec<DepartmentSeed> {
    [
        ("Admin", "Administration and office management"),
        ("HR", "Human resources and recruitment"),
        ("Tech", "Software engineering and infrastructure"),
        ("BPO", "Business process outsourcing operations"),
    ]
    .into_iter()
    .map(|(name, description)| DepartmentSeed {
        name: name.to_string(),
        description: description.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::configure_sqlite_connection;

    fn open_test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        conn
    }

    #[test]
    fn test_init_is_idempotent() {
        let conn = open_test_conn();
        init_database(&conn).unwrap();
        init_database(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN \
                 ('departments','employees','expenses','performance')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 4);
    }

    #[test]
    fn test_seed_only_when_empty() {
        let conn = open_test_conn();
        init_database(&conn).unwrap();

        let seeds = default_seeds();
        assert_eq!(seed_departments(&conn, &seeds).unwrap(), 4);
        // 第二次加载必须是 no-op
        assert_eq!(seed_departments(&conn, &seeds).unwrap(), 0);
    }

    #[test]
    fn test_rating_check_constraint() {
        let conn = open_test_conn();
        init_database(&conn).unwrap();
        seed_departments(&conn, &default_seeds()).unwrap();

        conn.execute(
            "INSERT INTO employees (employee_number, name, role, department_id, salary, join_date) \
             VALUES ('EMP0001', 'Alice', 'Engineer', 3, 90000.0, '2024-01-01')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO performance (employee_id, rating, month) VALUES (1, 6, '2024-05')",
            [],
        );
        assert!(result.is_err());
    }
}

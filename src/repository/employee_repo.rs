// ==========================================
// 公司运营分析系统 - 员工数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 员工编号的生成策略在 API 层，仓储只提供计数与写入原语
// ==========================================

use crate::domain::{DuplicateEmployee, Employee, EmployeeListing, NewEmployee};
use crate::repository::error::RepositoryResult;
use crate::repository::{lock_conn, SharedConnection};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};

/// 员工仓储
/// 职责: 管理 employees 表的 CRUD 操作
pub struct EmployeeRepository {
    conn: SharedConnection,
}

impl EmployeeRepository {
    /// 从共享连接创建仓储实例
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// 插入新员工
    ///
    /// # 返回
    /// - Ok(i64): 新记录 id
    /// - Err(UniqueConstraintViolation): employee_number 冲突
    pub fn insert(&self, employee: &NewEmployee) -> RepositoryResult<i64> {
        let conn = lock_conn(&self.conn)?;
        Self::insert_on(&conn, employee)
    }

    /// 在给定连接上插入（硬化模式下与计数同事务使用）
    pub fn insert_on(conn: &Connection, employee: &NewEmployee) -> RepositoryResult<i64> {
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

    /// 员工总数（编号序列 EMP{count+1:04} 的基数）
    pub fn count_all(&self) -> RepositoryResult<i64> {
        let conn = lock_conn(&self.conn)?;
        Self::count_all_on(&conn)
    }

    /// 在给定连接上计数
    pub fn count_all_on(conn: &Connection) -> RepositoryResult<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 共享连接句柄（硬化模式下 API 层需要在单个事务内完成计数 + 插入）
    pub fn shared_connection(&self) -> SharedConnection {
        self.conn.clone()
    }

    /// 按标识查询员工: employee_number 精确匹配，或姓名大小写不敏感匹配
    pub fn find_by_identifier(&self, identifier: &str) -> RepositoryResult<Option<Employee>> {
        let conn = lock_conn(&self.conn)?;
        let employee = conn
            .query_row(
                r#"
                SELECT id, employee_number, name, role, department_id, salary, join_date
                FROM employees
                WHERE employee_number = ?1 OR LOWER(name) = LOWER(?1)
                "#,
                params![identifier],
                Self::map_employee_row,
            )
            .optional()?;
        Ok(employee)
    }

    /// 按姓名查询员工 id（大小写不敏感）
    pub fn find_id_by_name(&self, name: &str) -> RepositoryResult<Option<i64>> {
        let conn = lock_conn(&self.conn)?;
        let id = conn
            .query_row(
                "SELECT id FROM employees WHERE LOWER(name) = LOWER(?1)",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// 员工列表投影（联接部门名称）
    ///
    /// # 参数
    /// - department_id: Some 时按部门过滤（部门内按姓名排序），
    ///   None 时返回全公司（按部门名、姓名排序）
    pub fn list(&self, department_id: Option<i64>) -> RepositoryResult<Vec<EmployeeListing>> {
        let conn = lock_conn(&self.conn)?;

        let map_row = |row: &rusqlite::Row<'_>| {
            Ok(EmployeeListing {
                id: row.get(0)?,
                employee_number: row.get(1)?,
                name: row.get(2)?,
                role: row.get(3)?,
                department: row.get(4)?,
                salary: row.get(5)?,
                join_date: row.get(6)?,
            })
        };

        let listings = match department_id {
            Some(dept_id) => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT e.id, e.employee_number, e.name, e.role, d.name, e.salary, e.join_date
                    FROM employees e
                    JOIN departments d ON e.department_id = d.id
                    WHERE e.department_id = ?1
                    ORDER BY e.name
                    "#,
                )?;
                let rows = stmt
                    .query_map(params![dept_id], map_row)?
                    .collect::<SqliteResult<Vec<EmployeeListing>>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT e.id, e.employee_number, e.name, e.role, d.name, e.salary, e.join_date
                    FROM employees e
                    JOIN departments d ON e.department_id = d.id
                    ORDER BY d.name, e.name
                    "#,
                )?;
                let rows = stmt
                    .query_map([], map_row)?
                    .collect::<SqliteResult<Vec<EmployeeListing>>>()?;
                rows
            }
        };

        Ok(listings)
    }

    /// 部门下员工数量
    pub fn count_by_department(&self, department_id: i64) -> RepositoryResult<i64> {
        let conn = lock_conn(&self.conn)?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM employees WHERE department_id = ?1",
            params![department_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 在给定连接上按 id 删除员工（级联事务内使用）
    pub fn delete_on(conn: &Connection, id: i64) -> RepositoryResult<usize> {
        let affected = conn.execute("DELETE FROM employees WHERE id = ?1", params![id])?;
        Ok(affected)
    }

    /// 在给定连接上删除部门下全部员工（级联删除的第二步）
    pub fn delete_by_department_on(
        conn: &Connection,
        department_id: i64,
    ) -> RepositoryResult<usize> {
        let affected = conn.execute(
            "DELETE FROM employees WHERE department_id = ?1",
            params![department_id],
        )?;
        Ok(affected)
    }

    /// 查询重复员工记录
    ///
    /// 重复定义: (姓名, 部门) 完全相同；每组中 id 最小的记录视为原始记录不返回，
    /// 其余记录按姓名、id 排序返回。
    pub fn find_duplicates(&self) -> RepositoryResult<Vec<DuplicateEmployee>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            r#"
            SELECT e1.id, e1.employee_number, e1.name, d.name, e1.join_date
            FROM employees e1
            JOIN departments d ON e1.department_id = d.id
            WHERE EXISTS (
                SELECT 1 FROM employees e2
                WHERE e1.name = e2.name
                  AND e1.department_id = e2.department_id
                  AND e1.id > e2.id
            )
            ORDER BY e1.name, e1.id
            "#,
        )?;

        let duplicates = stmt
            .query_map([], |row| {
                Ok(DuplicateEmployee {
                    id: row.get(0)?,
                    employee_number: row.get(1)?,
                    name: row.get(2)?,
                    department: row.get(3)?,
                    join_date: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<DuplicateEmployee>>>()?;

        Ok(duplicates)
    }

    fn map_employee_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Employee> {
        Ok(Employee {
            id: row.get(0)?,
            employee_number: row.get(1)?,
            name: row.get(2)?,
            role: row.get(3)?,
            department_id: row.get(4)?,
            salary: row.get(5)?,
            join_date: row.get(6)?,
        })
    }
}

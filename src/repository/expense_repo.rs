// ==========================================
// 公司运营分析系统 - 费用数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::{ExpenseListing, NewExpense};
use crate::repository::error::RepositoryResult;
use crate::repository::{lock_conn, SharedConnection};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result as SqliteResult};

/// 费用筛选条件（部门 id 已由 API 层解析）
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub department_id: Option<i64>,
    pub start_date: Option<String>, // YYYY-MM-DD，含下界
    pub end_date: Option<String>,   // YYYY-MM-DD，含上界
}

/// 费用仓储
/// 职责: 管理 expenses 表的 CRUD 操作
pub struct ExpenseRepository {
    conn: SharedConnection,
}

impl ExpenseRepository {
    /// 从共享连接创建仓储实例
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// 插入新费用记录
    pub fn insert(&self, expense: &NewExpense) -> RepositoryResult<i64> {
        let conn = lock_conn(&self.conn)?;
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

    /// 按 id 查询费用投影（删除前取回记录详情）
    pub fn find_listing(&self, id: i64) -> RepositoryResult<Option<ExpenseListing>> {
        let conn = lock_conn(&self.conn)?;
        let listing = conn
            .query_row(
                r#"
                SELECT e.id, e.date, e.amount, e.category, e.note, d.name
                FROM expenses e
                JOIN departments d ON e.department_id = d.id
                WHERE e.id = ?1
                "#,
                params![id],
                Self::map_listing_row,
            )
            .optional()?;
        Ok(listing)
    }

    /// 按条件查询费用列表（日期倒序）
    ///
    /// 筛选子句按条件动态拼接，参数始终走占位符。
    pub fn list_filtered(&self, filter: &ExpenseFilter) -> RepositoryResult<Vec<ExpenseListing>> {
        let conn = lock_conn(&self.conn)?;

        let mut sql = String::from(
            r#"
            SELECT e.id, e.date, e.amount, e.category, e.note, d.name
            FROM expenses e
            JOIN departments d ON e.department_id = d.id
            WHERE 1=1
            "#,
        );
        let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(dept_id) = filter.department_id {
            params.push(Box::new(dept_id));
            sql.push_str(&format!(" AND e.department_id = ?{}", params.len()));
        }
        if let Some(start) = &filter.start_date {
            params.push(Box::new(start.clone()));
            sql.push_str(&format!(" AND e.date >= ?{}", params.len()));
        }
        if let Some(end) = &filter.end_date {
            params.push(Box::new(end.clone()));
            sql.push_str(&format!(" AND e.date <= ?{}", params.len()));
        }
        sql.push_str(" ORDER BY e.date DESC");

        let mut stmt = conn.prepare(&sql)?;
        let listings = stmt
            .query_map(
                params_from_iter(params.iter().map(|p| p.as_ref())),
                Self::map_listing_row,
            )?
            .collect::<SqliteResult<Vec<ExpenseListing>>>()?;

        Ok(listings)
    }

    /// 部门下费用记录数量
    pub fn count_by_department(&self, department_id: i64) -> RepositoryResult<i64> {
        let conn = lock_conn(&self.conn)?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM expenses WHERE department_id = ?1",
            params![department_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 按 id 删除费用记录
    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = lock_conn(&self.conn)?;
        let affected = conn.execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
        Ok(affected)
    }

    /// 在给定连接上删除部门下全部费用（级联删除的第三步）
    pub fn delete_by_department_on(
        conn: &Connection,
        department_id: i64,
    ) -> RepositoryResult<usize> {
        let affected = conn.execute(
            "DELETE FROM expenses WHERE department_id = ?1",
            params![department_id],
        )?;
        Ok(affected)
    }

    fn map_listing_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExpenseListing> {
        Ok(ExpenseListing {
            id: row.get(0)?,
            date: row.get(1)?,
            amount: row.get(2)?,
            category: row.get(3)?,
            note: row.get(4)?,
            department: row.get(5)?,
        })
    }
}

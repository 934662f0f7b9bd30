// ==========================================
// 公司运营分析系统 - 绩效数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::NewPerformanceRating;
use crate::repository::error::RepositoryResult;
use crate::repository::{lock_conn, SharedConnection};
use rusqlite::{params, Connection};

/// 绩效仓储
/// 职责: 管理 performance 表的 CRUD 操作
pub struct PerformanceRepository {
    conn: SharedConnection,
}

impl PerformanceRepository {
    /// 从共享连接创建仓储实例
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// 插入绩效评分
    ///
    /// 评分区间由 API 层校验；表上的 CHECK 约束是最后防线。
    pub fn insert(&self, rating: &NewPerformanceRating) -> RepositoryResult<i64> {
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            r#"
            INSERT INTO performance (employee_id, rating, month, comments)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                rating.employee_id,
                rating.rating,
                rating.month,
                rating.comments,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 在给定连接上删除员工名下全部评分（级联事务内使用）
    pub fn delete_by_employee_on(conn: &Connection, employee_id: i64) -> RepositoryResult<usize> {
        let affected = conn.execute(
            "DELETE FROM performance WHERE employee_id = ?1",
            params![employee_id],
        )?;
        Ok(affected)
    }

    /// 在给定连接上删除部门下全部员工的评分（级联删除的第一步）
    pub fn delete_by_department_on(
        conn: &Connection,
        department_id: i64,
    ) -> RepositoryResult<usize> {
        let affected = conn.execute(
            r#"
            DELETE FROM performance
            WHERE employee_id IN (SELECT id FROM employees WHERE department_id = ?1)
            "#,
            params![department_id],
        )?;
        Ok(affected)
    }
}

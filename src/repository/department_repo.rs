// ==========================================
// 公司运营分析系统 - 部门数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::repository::error::RepositoryResult;
use crate::repository::{lock_conn, SharedConnection};
use rusqlite::{params, Connection, OptionalExtension};

/// 部门仓储
/// 职责: 管理 departments 表的 CRUD 操作
pub struct DepartmentRepository {
    conn: SharedConnection,
}

impl DepartmentRepository {
    /// 从共享连接创建仓储实例
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// 插入新部门
    ///
    /// # 返回
    /// - Ok(i64): 新记录 id
    /// - Err(UniqueConstraintViolation): 名称已存在
    pub fn insert(&self, name: &str, description: &str) -> RepositoryResult<i64> {
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            "INSERT INTO departments (name, description) VALUES (?1, ?2)",
            params![name, description],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 按名称查询部门 id（大小写不敏感）
    pub fn find_id_by_name(&self, name: &str) -> RepositoryResult<Option<i64>> {
        let conn = lock_conn(&self.conn)?;
        let id = conn
            .query_row(
                "SELECT id FROM departments WHERE LOWER(name) = LOWER(?1)",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// 共享连接句柄（级联删除需要在单个事务内完成多步删除）
    pub fn shared_connection(&self) -> SharedConnection {
        self.conn.clone()
    }

    /// 按 id 删除部门
    ///
    /// # 返回
    /// - Ok(usize): 删除的记录数（0 或 1）
    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = lock_conn(&self.conn)?;
        Self::delete_on(&conn, id)
    }

    /// 在给定连接上按 id 删除部门（级联事务的最后一步）
    pub fn delete_on(conn: &Connection, id: i64) -> RepositoryResult<usize> {
        let affected = conn.execute("DELETE FROM departments WHERE id = ?1", params![id])?;
        Ok(affected)
    }
}

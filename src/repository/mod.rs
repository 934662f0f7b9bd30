// ==========================================
// 公司运营分析系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口，屏蔽数据库细节
// 约束: 所有查询使用参数化，防止 SQL 注入
// ==========================================

pub mod department_repo;
pub mod employee_repo;
pub mod error;
pub mod expense_repo;
pub mod performance_repo;

// 重导出核心仓储
pub use department_repo::DepartmentRepository;
pub use employee_repo::EmployeeRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use expense_repo::ExpenseRepository;
pub use performance_repo::PerformanceRepository;

use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

/// 共享数据库连接句柄
///
/// 每个仓储/引擎实例持有同一个句柄，按调用粒度加锁获取连接，
/// 不存在跨调用事务（PRAGMA 在 db 模块打开连接时统一设置）。
pub type SharedConnection = Arc<Mutex<Connection>>;

/// 获取数据库连接（锁失败归为 LockError）
pub(crate) fn lock_conn(conn: &SharedConnection) -> RepositoryResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| RepositoryError::LockError(e.to_string()))
}

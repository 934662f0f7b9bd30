// ==========================================
// 公司运营分析系统 - API 层
// ==========================================
// 职责: 业务规则（校验/引用完整性/级联/编号生成），
//       组装仓储原语为对外操作，统一错误口径
// ==========================================

pub mod analytics_api;
pub mod department_api;
pub mod employee_api;
pub mod error;
pub mod expense_api;
pub mod performance_api;

pub use analytics_api::AnalyticsApi;
pub use department_api::{CascadeCounts, DepartmentApi};
pub use employee_api::{EmployeeApi, NumberPolicy};
pub use error::{ApiError, ApiResult};
pub use expense_api::ExpenseApi;
pub use performance_api::PerformanceApi;

use rusqlite::Connection;

/// 在 IMMEDIATE 事务内执行多步写入
///
/// 调用方已持有连接锁；成功 COMMIT，失败 ROLLBACK 并原样上抛。
/// 多步删除/计数+插入必须走这里，单条语句不需要。
pub(crate) fn run_in_immediate_txn<T>(
    conn: &Connection,
    op: impl FnOnce() -> ApiResult<T>,
) -> ApiResult<T> {
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| ApiError::DatabaseError(format!("cannot begin transaction: {}", e)))?;

    let result = op();

    match &result {
        Ok(_) => {
            conn.execute_batch("COMMIT").map_err(|e| {
                ApiError::DatabaseError(format!("cannot commit transaction: {}", e))
            })?;
        }
        Err(_) => {
            // 回滚失败不覆盖原始错误
            let _ = conn.execute_batch("ROLLBACK");
        }
    }
    result
}

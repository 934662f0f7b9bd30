// ==========================================
// 公司运营分析系统 - 部门业务接口
// ==========================================
// 职责: 部门的新增与删除，含强制级联删除
// 级联顺序（红线）: 评分 → 员工 → 费用 → 部门
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::run_in_immediate_txn;
use crate::repository::{
    lock_conn, DepartmentRepository, EmployeeRepository, ExpenseRepository,
    PerformanceRepository, RepositoryError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 新增部门结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentAdded {
    pub message: String,
    pub department_id: i64,
}

/// 级联删除计数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeCounts {
    pub employees: i64,
    pub expenses: i64,
    pub performance_records: i64,
}

/// 删除部门结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentDeleted {
    pub message: String,
    pub deleted_department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cascade_deleted: Option<CascadeCounts>,
}

/// 部门业务接口
///
/// 级联删除走 PerformanceRepository 等仓储的事务内原语，
/// 不持有绩效仓储实例。
pub struct DepartmentApi {
    department_repo: Arc<DepartmentRepository>,
    employee_repo: Arc<EmployeeRepository>,
    expense_repo: Arc<ExpenseRepository>,
}

impl DepartmentApi {
    pub fn new(
        department_repo: Arc<DepartmentRepository>,
        employee_repo: Arc<EmployeeRepository>,
        expense_repo: Arc<ExpenseRepository>,
    ) -> Self {
        Self {
            department_repo,
            employee_repo,
            expense_repo,
        }
    }

    /// 新增部门
    ///
    /// # 返回
    /// - Err(DuplicateKey): 部门名已存在（大小写不敏感）
    pub fn add_department(&self, name: &str, description: &str) -> ApiResult<DepartmentAdded> {
        if name.trim().is_empty() {
            return Err(ApiError::ValidationError(
                "Department name must not be empty".to_string(),
            ));
        }

        // UNIQUE 约束只覆盖精确匹配，大小写不敏感的唯一性在此显式校验
        if self.department_repo.find_id_by_name(name)?.is_some() {
            return Err(ApiError::DuplicateKey(format!(
                "Department '{}' already exists",
                name
            )));
        }

        let department_id = match self.department_repo.insert(name, description) {
            Ok(id) => id,
            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                return Err(ApiError::DuplicateKey(format!(
                    "Department '{}' already exists",
                    name
                )));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!("department added: name={}, id={}", name, department_id);

        Ok(DepartmentAdded {
            message: format!("Department '{}' added successfully", name),
            department_id,
        })
    }

    /// 删除部门
    ///
    /// # 参数
    /// - force: false 时有依赖记录即拒绝（Conflict 携带依赖计数）；
    ///   true 时按 评分 → 员工 → 费用 → 部门 顺序级联删除并上报计数
    pub fn delete_department(&self, name: &str, force: bool) -> ApiResult<DepartmentDeleted> {
        let dept_id = self
            .department_repo
            .find_id_by_name(name)?
            .ok_or_else(|| ApiError::NotFound(format!("Department '{}' not found", name)))?;

        let employee_count = self.employee_repo.count_by_department(dept_id)?;
        let expense_count = self.expense_repo.count_by_department(dept_id)?;

        if (employee_count > 0 || expense_count > 0) && !force {
            return Err(ApiError::Conflict {
                message: format!(
                    "Cannot delete department '{}': it has {} employees and {} expenses. \
                     Use force=true to delete anyway.",
                    name, employee_count, expense_count
                ),
                employees_count: employee_count,
                expenses_count: expense_count,
            });
        }

        // 级联四步在同一个事务内完成，中途失败整体回滚
        let cascade_deleted = if force {
            let shared = self.department_repo.shared_connection();
            let conn = lock_conn(&shared)?;

            let counts = run_in_immediate_txn(&conn, || {
                let performance_records =
                    PerformanceRepository::delete_by_department_on(&conn, dept_id)? as i64;
                let employees =
                    EmployeeRepository::delete_by_department_on(&conn, dept_id)? as i64;
                let expenses = ExpenseRepository::delete_by_department_on(&conn, dept_id)? as i64;
                DepartmentRepository::delete_on(&conn, dept_id)?;
                Ok(CascadeCounts {
                    employees,
                    expenses,
                    performance_records,
                })
            })?;
            Some(counts)
        } else {
            self.department_repo.delete(dept_id)?;
            None
        };

        tracing::info!(
            "department deleted: name={}, force={}, employees={}, expenses={}",
            name,
            force,
            employee_count,
            expense_count
        );

        Ok(DepartmentDeleted {
            message: format!("Department '{}' deleted successfully", name),
            deleted_department: name.to_string(),
            cascade_deleted,
        })
    }
}

// ==========================================
// 公司运营分析系统 - 员工业务接口
// ==========================================
// 职责: 员工的新增/查询/删除、编号生成、重复记录清理
// 红线: 删除员工必须先级联删除其绩效记录并上报计数
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::run_in_immediate_txn;
use crate::domain::{DuplicateEmployee, EmployeeListing, NewEmployee};
use crate::repository::{
    lock_conn, DepartmentRepository, EmployeeRepository, PerformanceRepository, RepositoryError,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 员工编号生成策略
///
/// - BestEffort: 与原系统一致的"计数后插入"，无事务保护。并发创建时
///   两个调用可能读到同一计数并生成相同编号（其一会撞 UNIQUE 约束）。
///   这是记录在案的已知弱点，默认保留。
/// - Atomic: 计数与插入在同一个 IMMEDIATE 事务内完成，消除上述竞争。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberPolicy {
    BestEffort,
    Atomic,
}

/// 新增员工请求
#[derive(Debug, Clone)]
pub struct AddEmployeeRequest {
    pub name: String,
    pub role: String,
    pub department_name: String,
    pub salary: f64,
    pub employee_number: Option<String>,
    pub join_date: Option<NaiveDate>,
}

/// 新增员工结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeAdded {
    pub message: String,
    pub employee_id: i64,
    pub employee_number: String,
}

/// 员工列表结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeList {
    pub count: usize,
    pub department: String,
    pub employees: Vec<EmployeeListing>,
}

/// 被删除员工的标识字段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedEmployee {
    pub employee_number: String,
    pub name: String,
    pub role: String,
}

/// 删除员工结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeDeleted {
    pub message: String,
    pub deleted_employee: DeletedEmployee,
    pub performance_records_deleted: i64,
}

/// 重复员工清理结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicatesDeleted {
    pub message: String,
    pub duplicates_deleted: usize,
    pub deleted_employees: Vec<DuplicateEmployee>,
}

/// 员工业务接口
///
/// 绩效评分的级联删除通过 PerformanceRepository 的事务内原语完成，
/// 不持有仓储实例。
pub struct EmployeeApi {
    employee_repo: Arc<EmployeeRepository>,
    department_repo: Arc<DepartmentRepository>,
    number_policy: NumberPolicy,
}

impl EmployeeApi {
    pub fn new(
        employee_repo: Arc<EmployeeRepository>,
        department_repo: Arc<DepartmentRepository>,
        number_policy: NumberPolicy,
    ) -> Self {
        Self {
            employee_repo,
            department_repo,
            number_policy,
        }
    }

    /// 新增员工
    ///
    /// # 返回
    /// - Err(NotFound): 部门不存在
    /// - Err(DuplicateKey): 员工编号冲突
    /// - Err(ValidationError): 薪资为负
    pub fn add_employee(&self, request: &AddEmployeeRequest) -> ApiResult<EmployeeAdded> {
        if request.salary < 0.0 {
            return Err(ApiError::ValidationError(
                "Salary must be non-negative".to_string(),
            ));
        }

        let dept_id = self
            .department_repo
            .find_id_by_name(&request.department_name)?
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "Department '{}' not found",
                    request.department_name
                ))
            })?;

        let join_date = request
            .join_date
            .unwrap_or_else(|| Local::now().date_naive());

        let (employee_number, employee_id) = match &request.employee_number {
            Some(number) => {
                let new_employee = NewEmployee {
                    employee_number: number.clone(),
                    name: request.name.clone(),
                    role: request.role.clone(),
                    department_id: dept_id,
                    salary: request.salary,
                    join_date,
                };
                (number.clone(), self.insert_mapped(&new_employee)?)
            }
            None => self.insert_with_generated_number(request, dept_id, join_date)?,
        };

        tracing::info!(
            "employee added: name={}, number={}, department={}",
            request.name,
            employee_number,
            request.department_name
        );

        Ok(EmployeeAdded {
            message: format!(
                "Employee '{}' (#{}) added successfully to {}",
                request.name, employee_number, request.department_name
            ),
            employee_id,
            employee_number,
        })
    }

    /// 员工列表
    ///
    /// # 参数
    /// - department_name: Some 时按部门过滤；部门不存在返回 NotFound
    pub fn list_employees(&self, department_name: Option<&str>) -> ApiResult<EmployeeList> {
        let dept_id = match department_name {
            Some(name) => Some(self.department_repo.find_id_by_name(name)?.ok_or_else(
                || ApiError::NotFound(format!("Department '{}' not found", name)),
            )?),
            None => None,
        };

        let employees = self.employee_repo.list(dept_id)?;

        Ok(EmployeeList {
            count: employees.len(),
            department: department_name.unwrap_or("All").to_string(),
            employees,
        })
    }

    /// 删除员工（级联删除其绩效记录）
    ///
    /// # 参数
    /// - identifier: employee_number 精确匹配，或姓名大小写不敏感匹配
    pub fn delete_employee(&self, identifier: &str) -> ApiResult<EmployeeDeleted> {
        let employee = self
            .employee_repo
            .find_by_identifier(identifier)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Employee '{}' not found", identifier))
            })?;

        // 评分删除与员工删除同事务
        let shared = self.employee_repo.shared_connection();
        let performance_records_deleted = {
            let conn = lock_conn(&shared)?;
            run_in_immediate_txn(&conn, || {
                let ratings = PerformanceRepository::delete_by_employee_on(&conn, employee.id)?;
                EmployeeRepository::delete_on(&conn, employee.id)?;
                Ok(ratings as i64)
            })?
        };

        tracing::info!(
            "employee deleted: number={}, ratings_removed={}",
            employee.employee_number,
            performance_records_deleted
        );

        Ok(EmployeeDeleted {
            message: format!(
                "Employee '{}' ({}) deleted successfully",
                employee.name, employee.employee_number
            ),
            deleted_employee: DeletedEmployee {
                employee_number: employee.employee_number,
                name: employee.name,
                role: employee.role,
            },
            performance_records_deleted,
        })
    }

    /// 清理重复员工记录
    ///
    /// 幂等: 无重复时返回零计数成功。每组 (姓名, 部门) 保留 id 最小的
    /// 记录，其余连同各自的绩效记录一并删除。
    pub fn delete_duplicate_employees(&self) -> ApiResult<DuplicatesDeleted> {
        let duplicates = self.employee_repo.find_duplicates()?;

        if duplicates.is_empty() {
            return Ok(DuplicatesDeleted {
                message: "No duplicate employees found".to_string(),
                duplicates_deleted: 0,
                deleted_employees: Vec::new(),
            });
        }

        // 整批清理在同一个事务内完成，中途失败整体回滚
        let shared = self.employee_repo.shared_connection();
        {
            let conn = lock_conn(&shared)?;
            run_in_immediate_txn(&conn, || {
                for duplicate in &duplicates {
                    PerformanceRepository::delete_by_employee_on(&conn, duplicate.id)?;
                    EmployeeRepository::delete_on(&conn, duplicate.id)?;
                }
                Ok(())
            })?;
        }

        tracing::info!("duplicate employees removed: count={}", duplicates.len());

        Ok(DuplicatesDeleted {
            message: format!("Deleted {} duplicate employees", duplicates.len()),
            duplicates_deleted: duplicates.len(),
            deleted_employees: duplicates,
        })
    }

    /// 生成编号并插入
    ///
    /// BestEffort 策略按"读计数 → 插入"两步走（保留原系统的竞态语义）；
    /// Atomic 策略把两步收进一个 IMMEDIATE 事务。
    fn insert_with_generated_number(
        &self,
        request: &AddEmployeeRequest,
        dept_id: i64,
        join_date: NaiveDate,
    ) -> ApiResult<(String, i64)> {
        match self.number_policy {
            NumberPolicy::BestEffort => {
                let count = self.employee_repo.count_all()?;
                let number = format_employee_number(count + 1);
                let new_employee = NewEmployee {
                    employee_number: number.clone(),
                    name: request.name.clone(),
                    role: request.role.clone(),
                    department_id: dept_id,
                    salary: request.salary,
                    join_date,
                };
                let id = self.insert_mapped(&new_employee)?;
                Ok((number, id))
            }
            NumberPolicy::Atomic => {
                let shared = self.employee_repo.shared_connection();
                let conn = lock_conn(&shared)?;

                run_in_immediate_txn(&conn, || {
                    let count = EmployeeRepository::count_all_on(&conn)?;
                    let number = format_employee_number(count + 1);
                    let new_employee = NewEmployee {
                        employee_number: number.clone(),
                        name: request.name.clone(),
                        role: request.role.clone(),
                        department_id: dept_id,
                        salary: request.salary,
                        join_date,
                    };
                    let id = EmployeeRepository::insert_on(&conn, &new_employee)
                        .map_err(|e| self.map_insert_error(e, &number))?;
                    Ok((number, id))
                })
            }
        }
    }

    fn insert_mapped(&self, new_employee: &NewEmployee) -> ApiResult<i64> {
        self.employee_repo
            .insert(new_employee)
            .map_err(|e| self.map_insert_error(e, &new_employee.employee_number))
    }

    fn map_insert_error(&self, err: RepositoryError, number: &str) -> ApiError {
        match err {
            RepositoryError::UniqueConstraintViolation(_) => ApiError::DuplicateKey(format!(
                "Employee number '{}' already exists",
                number
            )),
            other => other.into(),
        }
    }
}

/// 员工编号格式: EMP + 4位零填充序号
pub fn format_employee_number(sequence: i64) -> String {
    format!("EMP{:04}", sequence)
}

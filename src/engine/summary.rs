// ==========================================
// 公司运营分析系统 - 部门摘要引擎
// ==========================================
// 职责: 部门摘要 / 公司总览 / 燃烧率投影
// 红线: 引擎只读
// 窗口口径:
// - 费用: 当前日期回推 30 天（含下界）
// - 绩效: 当前月份按日历回推 3 个月，month 字段字典序比较
// ==========================================

use crate::domain::Department;
use crate::engine::{expense_window_start, rating_month_floor, round_currency};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{lock_conn, SharedConnection};
use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

// ==========================================
// 派生统计结构
// ==========================================

/// 部门员工口径: 人数 + 年薪总负担
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryStats {
    pub count: i64,
    pub total_salary_burden: f64,
}

/// 30天费用窗口统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseWindowStats {
    pub total: f64,
    pub count: i64,
    /// 分类汇总，按金额降序
    pub by_category: Vec<ExpenseCategoryTotal>,
}

/// 单分类费用合计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCategoryTotal {
    pub category: String,
    pub total: f64,
}

/// 3个月绩效窗口统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceWindowStats {
    pub average_rating: f64,
    pub rating_count: i64,
}

/// 部门综合摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentSummary {
    pub department: Department,
    pub employees: SalaryStats,
    pub expenses_last_30_days: ExpenseWindowStats,
    pub performance_last_3_months: PerformanceWindowStats,
}

/// 公司总览
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyOverview {
    pub total_employees: i64,
    pub total_salary: f64,
    pub total_expenses_30d: f64,
}

/// 燃烧率投影
///
/// monthly_burn = 年薪总额 / 12 + 近30天费用合计
/// annual_projection = monthly_burn × 12
///
/// 30天窗口只是"月度费用"的代理口径，不是日历月截断。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurnRateProjection {
    pub department: String,
    pub monthly_salary: f64,
    pub monthly_expenses: f64,
    pub monthly_burn: f64,
    pub annual_projection: f64,
}

// ==========================================
// AnalyticsEngine - 聚合引擎
// ==========================================

/// 聚合引擎
///
/// 持有共享连接句柄，全部查询只读。时间锚点通过 `*_at` 变体注入，
/// 无后缀方法取当前壁钟日期。
pub struct AnalyticsEngine {
    conn: SharedConnection,
}

impl AnalyticsEngine {
    /// 从共享连接创建引擎实例
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// 部门综合摘要（当前日期锚点）
    pub fn department_summary(&self, name: &str) -> RepositoryResult<DepartmentSummary> {
        self.department_summary_at(name, Local::now().date_naive())
    }

    /// 部门综合摘要
    ///
    /// # 返回
    /// - Err(NotFound): 部门不存在
    /// - Ok(DepartmentSummary): 无员工/无费用/无评分时各项统计为 0，不报错
    pub fn department_summary_at(
        &self,
        name: &str,
        today: NaiveDate,
    ) -> RepositoryResult<DepartmentSummary> {
        let conn = lock_conn(&self.conn)?;

        let department = Self::find_department(&conn, name)?.ok_or_else(|| {
            RepositoryError::NotFound {
                entity: "Department".to_string(),
                key: name.to_string(),
            }
        })?;

        // 员工人数 + 年薪总额
        let employees = conn.query_row(
            r#"
            SELECT COUNT(*), COALESCE(SUM(salary), 0)
            FROM employees
            WHERE department_id = ?1
            "#,
            params![department.id],
            |row| {
                Ok(SalaryStats {
                    count: row.get(0)?,
                    total_salary_burden: row.get(1)?,
                })
            },
        )?;

        // 近30天费用统计
        let window_start = expense_window_start(today);
        let (expense_total, expense_count) = conn.query_row(
            r#"
            SELECT COALESCE(SUM(amount), 0), COUNT(*)
            FROM expenses
            WHERE department_id = ?1 AND date >= ?2
            "#,
            params![department.id, window_start],
            |row| Ok((row.get::<_, f64>(0)?, row.get::<_, i64>(1)?)),
        )?;

        // 分类汇总，金额降序
        let mut stmt = conn.prepare(
            r#"
            SELECT category, SUM(amount) AS total
            FROM expenses
            WHERE department_id = ?1 AND date >= ?2
            GROUP BY category
            ORDER BY total DESC
            "#,
        )?;
        let by_category = stmt
            .query_map(params![department.id, window_start], |row| {
                Ok(ExpenseCategoryTotal {
                    category: row.get(0)?,
                    total: round_currency(row.get(1)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<ExpenseCategoryTotal>>>()?;

        // 近3个月绩效统计（月份字典序比较）
        let month_floor = rating_month_floor(today);
        let (avg_rating, rating_count) = conn.query_row(
            r#"
            SELECT AVG(p.rating), COUNT(p.id)
            FROM performance p
            JOIN employees e ON p.employee_id = e.id
            WHERE e.department_id = ?1 AND p.month >= ?2
            "#,
            params![department.id, month_floor],
            |row| Ok((row.get::<_, Option<f64>>(0)?, row.get::<_, i64>(1)?)),
        )?;

        Ok(DepartmentSummary {
            department,
            employees: SalaryStats {
                count: employees.count,
                total_salary_burden: round_currency(employees.total_salary_burden),
            },
            expenses_last_30_days: ExpenseWindowStats {
                total: round_currency(expense_total),
                count: expense_count,
                by_category,
            },
            performance_last_3_months: PerformanceWindowStats {
                average_rating: round_currency(avg_rating.unwrap_or(0.0)),
                rating_count,
            },
        })
    }

    /// 全部门摘要（按部门名称排序，当前日期锚点）
    pub fn all_department_summaries(&self) -> RepositoryResult<Vec<DepartmentSummary>> {
        self.all_department_summaries_at(Local::now().date_naive())
    }

    /// 全部门摘要
    ///
    /// best-effort 口径: 单个部门摘要失败时记录告警并跳过该部门，
    /// 不作为整体失败上抛（直接调用单部门摘要时仍独立报错）。
    pub fn all_department_summaries_at(
        &self,
        today: NaiveDate,
    ) -> RepositoryResult<Vec<DepartmentSummary>> {
        let names = {
            let conn = lock_conn(&self.conn)?;
            let mut stmt = conn.prepare("SELECT name FROM departments ORDER BY name")?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            rows
        };

        let mut summaries = Vec::with_capacity(names.len());
        for name in names {
            match self.department_summary_at(&name, today) {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    tracing::warn!("skipping department summary: name={}, error={}", name, e);
                }
            }
        }
        Ok(summaries)
    }

    /// 公司总览（当前日期锚点）
    pub fn company_overview(&self) -> RepositoryResult<CompanyOverview> {
        self.company_overview_at(Local::now().date_naive())
    }

    /// 公司总览: 员工总数 / 年薪总额 / 近30天费用总额
    pub fn company_overview_at(&self, today: NaiveDate) -> RepositoryResult<CompanyOverview> {
        let conn = lock_conn(&self.conn)?;

        let (total_employees, total_salary) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(salary), 0) FROM employees",
            [],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?)),
        )?;

        let window_start = expense_window_start(today);
        let total_expenses_30d: f64 = conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE date >= ?1",
            params![window_start],
            |row| row.get(0),
        )?;

        Ok(CompanyOverview {
            total_employees,
            total_salary: round_currency(total_salary),
            total_expenses_30d: round_currency(total_expenses_30d),
        })
    }

    /// 燃烧率投影（当前日期锚点）
    pub fn burn_rate_projection(&self, name: &str) -> RepositoryResult<BurnRateProjection> {
        self.burn_rate_projection_at(name, Local::now().date_naive())
    }

    /// 部门燃烧率投影
    ///
    /// # 返回
    /// - Err(NotFound): 部门不存在
    pub fn burn_rate_projection_at(
        &self,
        name: &str,
        today: NaiveDate,
    ) -> RepositoryResult<BurnRateProjection> {
        let conn = lock_conn(&self.conn)?;

        let department = Self::find_department(&conn, name)?.ok_or_else(|| {
            RepositoryError::NotFound {
                entity: "Department".to_string(),
                key: name.to_string(),
            }
        })?;

        let total_salary: f64 = conn.query_row(
            "SELECT COALESCE(SUM(salary), 0) FROM employees WHERE department_id = ?1",
            params![department.id],
            |row| row.get(0),
        )?;

        let window_start = expense_window_start(today);
        let monthly_expenses: f64 = conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE department_id = ?1 AND date >= ?2",
            params![department.id, window_start],
            |row| row.get(0),
        )?;

        let monthly_salary = total_salary / 12.0;
        let monthly_burn = monthly_salary + monthly_expenses;

        Ok(BurnRateProjection {
            department: department.name,
            monthly_salary: round_currency(monthly_salary),
            monthly_expenses: round_currency(monthly_expenses),
            monthly_burn: round_currency(monthly_burn),
            annual_projection: round_currency(monthly_burn * 12.0),
        })
    }

    /// 共享连接句柄（comparison 模块复用）
    pub(crate) fn shared_connection(&self) -> &SharedConnection {
        &self.conn
    }

    fn find_department(conn: &Connection, name: &str) -> RepositoryResult<Option<Department>> {
        let dept = conn
            .query_row(
                "SELECT id, name, description FROM departments WHERE LOWER(name) = LOWER(?1)",
                params![name],
                |row| {
                    Ok(Department {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    })
                },
            )
            .optional()?;
        Ok(dept)
    }
}

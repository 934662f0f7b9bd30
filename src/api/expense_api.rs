// ==========================================
// 公司运营分析系统 - 费用业务接口
// ==========================================
// 职责: 费用的新增/筛选查询/删除，列表附带分类汇总
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{ExpenseListing, NewExpense};
use crate::engine::round_currency;
use crate::repository::expense_repo::ExpenseFilter;
use crate::repository::{DepartmentRepository, ExpenseRepository};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// 新增费用请求
#[derive(Debug, Clone)]
pub struct AddExpenseRequest {
    pub amount: f64,
    pub category: String,
    pub department_name: String,
    pub date: Option<NaiveDate>,
    pub note: Option<String>,
}

/// 新增费用结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseAdded {
    pub message: String,
    pub expense_id: i64,
    pub amount: f64,
    pub category: String,
}

/// 查询的日期范围回显
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// 费用列表结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseList {
    pub count: usize,
    pub total_amount: f64,
    pub department: String,
    pub date_range: DateRange,
    /// 分类 → 金额合计（无序映射）
    pub category_breakdown: HashMap<String, f64>,
    pub expenses: Vec<ExpenseListing>,
}

/// 删除费用结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseDeleted {
    pub message: String,
    pub deleted_expense: ExpenseListing,
}

/// 费用业务接口
pub struct ExpenseApi {
    expense_repo: Arc<ExpenseRepository>,
    department_repo: Arc<DepartmentRepository>,
}

impl ExpenseApi {
    pub fn new(
        expense_repo: Arc<ExpenseRepository>,
        department_repo: Arc<DepartmentRepository>,
    ) -> Self {
        Self {
            expense_repo,
            department_repo,
        }
    }

    /// 新增费用记录
    ///
    /// # 返回
    /// - Err(NotFound): 部门不存在
    pub fn add_expense(&self, request: &AddExpenseRequest) -> ApiResult<ExpenseAdded> {
        let dept_id = self
            .department_repo
            .find_id_by_name(&request.department_name)?
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "Department '{}' not found",
                    request.department_name
                ))
            })?;

        let date = request.date.unwrap_or_else(|| Local::now().date_naive());

        let expense_id = self.expense_repo.insert(&NewExpense {
            date,
            amount: request.amount,
            category: request.category.clone(),
            note: request.note.clone(),
            department_id: dept_id,
        })?;

        tracing::info!(
            "expense added: id={}, amount={}, department={}",
            expense_id,
            request.amount,
            request.department_name
        );

        Ok(ExpenseAdded {
            message: format!("Expense added successfully to {}", request.department_name),
            expense_id,
            amount: request.amount,
            category: request.category.clone(),
        })
    }

    /// 费用列表（可按部门/日期区间筛选）
    ///
    /// 返回记录明细、总金额、分类汇总与回显的筛选口径。
    /// 金额累加走全精度，只在结果组装时取 2 位小数。
    pub fn list_expenses(
        &self,
        department_name: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> ApiResult<ExpenseList> {
        let dept_id = match department_name {
            Some(name) => Some(self.department_repo.find_id_by_name(name)?.ok_or_else(
                || ApiError::NotFound(format!("Department '{}' not found", name)),
            )?),
            None => None,
        };

        let filter = ExpenseFilter {
            department_id: dept_id,
            start_date: parse_date_filter(start_date)?,
            end_date: parse_date_filter(end_date)?,
        };

        let expenses = self.expense_repo.list_filtered(&filter)?;

        let total: f64 = expenses.iter().map(|e| e.amount).sum();
        let mut category_breakdown: HashMap<String, f64> = HashMap::new();
        for expense in &expenses {
            *category_breakdown
                .entry(expense.category.clone())
                .or_insert(0.0) += expense.amount;
        }
        for amount in category_breakdown.values_mut() {
            *amount = round_currency(*amount);
        }

        Ok(ExpenseList {
            count: expenses.len(),
            total_amount: round_currency(total),
            department: department_name.unwrap_or("All").to_string(),
            date_range: DateRange {
                start: start_date.unwrap_or("Beginning").to_string(),
                end: end_date.unwrap_or("Present").to_string(),
            },
            category_breakdown,
            expenses,
        })
    }

    /// 按 id 删除费用记录
    pub fn delete_expense(&self, expense_id: i64) -> ApiResult<ExpenseDeleted> {
        let deleted_expense = self
            .expense_repo
            .find_listing(expense_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Expense ID {} not found", expense_id)))?;

        self.expense_repo.delete(expense_id)?;

        tracing::info!("expense deleted: id={}", expense_id);

        Ok(ExpenseDeleted {
            message: "Expense deleted successfully".to_string(),
            deleted_expense,
        })
    }
}

/// 校验日期筛选参数（YYYY-MM-DD）
fn parse_date_filter(value: Option<&str>) -> ApiResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(raw) => {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                ApiError::ValidationError(format!(
                    "Invalid date '{}': expected YYYY-MM-DD",
                    raw
                ))
            })?;
            Ok(Some(raw.to_string()))
        }
    }
}

// ==========================================
// 公司运营分析系统 - 费用领域模型
// ==========================================
// 对齐: schema expenses 表
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 费用实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,         // 自由文本分类标签
    pub note: Option<String>,
    pub department_id: i64,       // FK -> departments.id
}

/// 待写入的费用记录
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,
    pub note: Option<String>,
    pub department_id: i64,
}

/// 费用列表投影（联接部门名称）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseListing {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,
    pub note: Option<String>,
    pub department: String,
}

// ==========================================
// 公司运营分析系统 - 员工领域模型
// ==========================================
// 对齐: schema employees 表
// 红线: employee_number 全局唯一（对外可见标识）
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 员工实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,                  // 代理主键
    pub employee_number: String,  // 对外标识（如 EMP0001），全局唯一
    pub name: String,
    pub role: String,
    pub department_id: i64,       // FK -> departments.id
    pub salary: f64,              // 年薪，非负
    pub join_date: NaiveDate,
}

/// 待写入的员工记录（id 由数据库分配）
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub employee_number: String,
    pub name: String,
    pub role: String,
    pub department_id: i64,
    pub salary: f64,
    pub join_date: NaiveDate,
}

/// 员工列表投影（联接部门名称）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeListing {
    pub id: i64,
    pub employee_number: String,
    pub name: String,
    pub role: String,
    pub department: String,
    pub salary: f64,
    pub join_date: NaiveDate,
}

/// 重复员工记录（同名 + 同部门，保留最小 id）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateEmployee {
    pub id: i64,
    pub employee_number: String,
    pub name: String,
    pub department: String,
    pub join_date: NaiveDate,
}

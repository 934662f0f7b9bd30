// ==========================================
// 公司运营分析系统 - 领域层
// ==========================================
// 职责: 定义四类核心实体及其投影类型
// 约束: 领域类型只承载数据，不含数据访问逻辑
// ==========================================

pub mod department;
pub mod employee;
pub mod expense;
pub mod performance;

// 重导出核心实体
pub use department::{Department, DepartmentSeed};
pub use employee::{DuplicateEmployee, Employee, EmployeeListing, NewEmployee};
pub use expense::{Expense, ExpenseListing, NewExpense};
pub use performance::{NewPerformanceRating, PerformanceRating};

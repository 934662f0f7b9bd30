// ==========================================
// 公司运营分析系统 - 部门领域模型
// ==========================================
// 对齐: schema departments 表
// 红线: 部门名称全局唯一（大小写不敏感比较）
// ==========================================

use serde::{Deserialize, Serialize};

/// 部门实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,           // 代理主键
    pub name: String,      // 部门名称（唯一，忽略大小写）
    pub description: String,
}

/// 部门种子记录
///
/// 来源: config/departments.json（仅在 departments 表为空时消费一次）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentSeed {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

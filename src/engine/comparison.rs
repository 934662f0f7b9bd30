// ==========================================
// 公司运营分析系统 - 部门对比与评分分布
// ==========================================
// 职责: 跨部门横向对比、全局评分分布
// 口径说明: 对比视图的平均评分是全时段口径，与部门摘要的
// 3个月窗口口径刻意不同，两者并存（已向业务方标记为待澄清的不一致）。
// ==========================================

use crate::engine::summary::AnalyticsEngine;
use crate::engine::{round_currency, round_percent};
use crate::repository::error::RepositoryResult;
use crate::repository::lock_conn;
use rusqlite::params;
use serde::{Deserialize, Serialize};

/// 部门对比行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentComparisonRow {
    pub department: String,
    pub employee_count: i64,
    pub total_salary: f64,
    pub expense_count: i64,
    pub total_expenses: f64,
    /// 全时段平均评分；无评分时为 0
    pub average_rating: f64,
}

/// 单个评分档位的计数与占比
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingBucket {
    pub rating: i32,
    pub count: i64,
    /// 占全部评分的百分比（1 位小数）；总数为 0 时为 0
    pub percentage: f64,
}

/// 全局评分分布（5 → 1）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingDistribution {
    pub total_ratings: i64,
    pub average_rating: f64,
    pub buckets: Vec<RatingBucket>,
}

impl AnalyticsEngine {
    /// 部门横向对比
    ///
    /// 每部门一行: 员工数 / 年薪总额 / 费用笔数 / 费用总额 / 全时段平均评分。
    /// 标量子查询逐项聚合，避免多路 LEFT JOIN 的行数膨胀。
    pub fn compare_departments(&self) -> RepositoryResult<Vec<DepartmentComparisonRow>> {
        let conn = lock_conn(self.shared_connection())?;

        let mut stmt = conn.prepare(
            r#"
            SELECT
                d.name,
                (SELECT COUNT(*) FROM employees e WHERE e.department_id = d.id),
                (SELECT COALESCE(SUM(e.salary), 0) FROM employees e WHERE e.department_id = d.id),
                (SELECT COUNT(*) FROM expenses x WHERE x.department_id = d.id),
                (SELECT COALESCE(SUM(x.amount), 0) FROM expenses x WHERE x.department_id = d.id),
                (SELECT COALESCE(AVG(p.rating), 0)
                 FROM performance p
                 JOIN employees e ON p.employee_id = e.id
                 WHERE e.department_id = d.id)
            FROM departments d
            ORDER BY d.name
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(DepartmentComparisonRow {
                    department: row.get(0)?,
                    employee_count: row.get(1)?,
                    total_salary: round_currency(row.get(2)?),
                    expense_count: row.get(3)?,
                    total_expenses: round_currency(row.get(4)?),
                    average_rating: round_currency(row.get(5)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<DepartmentComparisonRow>>>()?;

        Ok(rows)
    }

    /// 全局评分分布
    ///
    /// 五个整数档位逐一输出（含计数为 0 的档位），从 5 到 1 排列。
    /// 百分比分母是全部评分数，分母为 0 时直接给 0，不触发除零。
    pub fn rating_distribution(&self) -> RepositoryResult<RatingDistribution> {
        let conn = lock_conn(self.shared_connection())?;

        let (total_ratings, average_rating) = conn.query_row(
            "SELECT COUNT(*), AVG(rating) FROM performance",
            [],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Option<f64>>(1)?)),
        )?;

        let mut buckets = Vec::with_capacity(5);
        for rating in (1..=5).rev() {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM performance WHERE rating = ?1",
                params![rating],
                |row| row.get(0),
            )?;
            let percentage = if total_ratings > 0 {
                round_percent(count as f64 / total_ratings as f64 * 100.0)
            } else {
                0.0
            };
            buckets.push(RatingBucket {
                rating,
                count,
                percentage,
            });
        }

        Ok(RatingDistribution {
            total_ratings,
            average_rating: round_currency(average_rating.unwrap_or(0.0)),
            buckets,
        })
    }
}

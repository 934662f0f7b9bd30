// ==========================================
// 公司运营分析系统 - 分析提示词模板
// ==========================================
// 职责: 把公司总览 + 全部门摘要 + 用户问题渲染为固定模板
// ==========================================

use crate::engine::{CompanyOverview, DepartmentSummary};

/// 渲染分析提示词
///
/// 模板固定；部门摘要以 JSON 形式内嵌，用户问题按字面量插入。
pub fn build_analysis_prompt(
    overview: &CompanyOverview,
    summaries: &[DepartmentSummary],
    query: &str,
) -> String {
    let summaries_json =
        serde_json::to_string_pretty(summaries).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"
You are an expert company analytics assistant analyzing a company's departments.

COMPANY OVERVIEW:
- Total Employees: {total_employees}
- Total Salary Burden: ${total_salary:.2}
- Total Expenses (Last 30 Days): ${total_expenses:.2}

DEPARTMENT SUMMARIES:
{summaries_json}

USER QUERY: "{query}"

Please provide:
1. A direct answer to the user's question
2. Key insights and patterns you observe in the data
3. Specific recommendations based on the data
4. Any concerns or red flags worth noting

Format your response as a clear, structured analysis that is both data-driven and actionable.
"#,
        total_employees = overview.total_employees,
        total_salary = overview.total_salary,
        total_expenses = overview.total_expenses_30d,
        summaries_json = summaries_json,
        query = query,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_query_and_figures() {
        let overview = CompanyOverview {
            total_employees: 7,
            total_salary: 630000.0,
            total_expenses_30d: 1234.56,
        };
        let prompt = build_analysis_prompt(&overview, &[], "which department spends most?");

        assert!(prompt.contains("Total Employees: 7"));
        assert!(prompt.contains("$1234.56"));
        assert!(prompt.contains(r#"USER QUERY: "which department spends most?""#));
    }
}

// ==========================================
// 公司运营分析系统 - 配置层
// ==========================================
// 职责: 汇总环境变量与默认值为运行配置
// 依赖: dotenvy 在入口处加载 .env，此处只读环境
// ==========================================

use std::path::PathBuf;

/// 显式占位符 key 视同未配置，不会被当成真实凭据发出去
pub const API_KEY_PLACEHOLDER: &str = "your_gemini_key_here";

/// 默认 Gemini 模型
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// 运行配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 数据库文件路径
    pub db_path: String,

    /// 部门种子文件路径（缺省时使用内置种子）
    pub seed_path: Option<PathBuf>,

    /// Gemini API key；None 表示未配置（含占位符值）
    pub gemini_api_key: Option<String>,

    /// Gemini 模型名
    pub gemini_model: String,

    /// 员工编号生成是否走事务硬化模式（默认保留原系统的 best-effort 语义）
    pub atomic_employee_numbers: bool,
}

impl AppConfig {
    /// 从环境变量构建配置
    ///
    /// # 环境变量
    /// - COMPANY_DB_PATH: 数据库路径（缺省走用户数据目录）
    /// - COMPANY_SEED_PATH: 部门种子 JSON 路径
    /// - GEMINI_API_KEY: 外部分析服务凭据
    /// - GEMINI_MODEL: 模型名（默认 gemini-2.5-flash）
    /// - COMPANY_ATOMIC_EMPLOYEE_NUMBERS: "1"/"true" 开启编号硬化模式
    pub fn from_env() -> Self {
        let db_path = non_empty_env("COMPANY_DB_PATH").unwrap_or_else(default_db_path);
        let seed_path = non_empty_env("COMPANY_SEED_PATH").map(PathBuf::from);
        let gemini_api_key = normalize_api_key(non_empty_env("GEMINI_API_KEY"));
        let gemini_model =
            non_empty_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let atomic_employee_numbers = non_empty_env("COMPANY_ATOMIC_EMPLOYEE_NUMBERS")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            db_path,
            seed_path,
            gemini_api_key,
            gemini_model,
            atomic_employee_numbers,
        }
    }
}

/// 获取默认数据库路径
///
/// 优先用户数据目录（user data dir/company-analytics/company.db），
/// 目录不可用时回退为当前目录下的 ./company.db。
pub fn default_db_path() -> String {
    let mut path = PathBuf::from("./company.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("company-analytics");
        // best-effort: 建目录失败时走当前目录回退
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("company.db");
        }
    }

    path.to_string_lossy().to_string()
}

/// 占位符 key 归一化为未配置
///
/// 模板 .env 里的字面量 `your_gemini_key_here` 绝不能被当成真实凭据
/// 发往外部服务，在配置入口处直接归零。
fn normalize_api_key(value: Option<String>) -> Option<String> {
    value.filter(|k| k != API_KEY_PLACEHOLDER)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_path_not_empty() {
        let path = default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with("company.db"));
    }

    #[test]
    fn test_placeholder_api_key_is_treated_as_unset() {
        assert_eq!(
            normalize_api_key(Some(API_KEY_PLACEHOLDER.to_string())),
            None
        );
        assert_eq!(normalize_api_key(None), None);
        assert_eq!(
            normalize_api_key(Some("AIzaSy-real-key".to_string())),
            Some("AIzaSy-real-key".to_string())
        );
    }
}

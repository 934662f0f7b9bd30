// ==========================================
// 公司运营分析系统 - JSON-lines 标准输入输出服务
// ==========================================
// 职责: 逐行读取 {"tool": "...", "args": {...}} 请求，
//       分发给工具调度器，逐行写回 JSON 响应
// 约束: stdout 只输出响应 JSON，日志一律走 stderr
// ==========================================

use crate::app::state::AppState;
use crate::app::tools::dispatch;
use anyhow::Context;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// 一次工具调用请求
#[derive(Debug, Deserialize)]
struct ToolRequest {
    tool: String,
    #[serde(default = "empty_args")]
    args: Value,
}

fn empty_args() -> Value {
    json!({})
}

/// 解析并处理单行请求
async fn handle_line(state: &AppState, line: &str) -> Value {
    match serde_json::from_str::<ToolRequest>(line) {
        Ok(request) => dispatch(state, &request.tool, request.args).await,
        Err(e) => json!({
            "status": "error",
            "code": "VALIDATION_ERROR",
            "message": format!("Invalid request: {}", e),
        }),
    }
}

/// 以 JSON-lines 协议在标准输入输出上提供服务，直到输入流关闭
pub async fn run_stdio_server(state: AppState) -> anyhow::Result<()> {
    tracing::info!("stdio server started, waiting for tool calls");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = handle_line(&state, trimmed).await;
        let mut encoded =
            serde_json::to_vec(&response).context("failed to encode response")?;
        encoded.push(b'\n');
        stdout
            .write_all(&encoded)
            .await
            .context("failed to write response")?;
        stdout.flush().await.context("failed to flush stdout")?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use tempfile::NamedTempFile;

    fn test_state() -> (AppState, NamedTempFile) {
        let db_file = NamedTempFile::new().expect("create temp db");
        let config = AppConfig {
            db_path: db_file.path().to_string_lossy().to_string(),
            seed_path: None,
            gemini_api_key: None,
            gemini_model: crate::config::DEFAULT_GEMINI_MODEL.to_string(),
            atomic_employee_numbers: false,
        };
        let state = AppState::new(&config).expect("build app state");
        (state, db_file)
    }

    #[tokio::test]
    async fn test_handle_line_rejects_malformed_json() {
        let (state, _db) = test_state();
        let response = handle_line(&state, "not json at all").await;
        assert_eq!(response["status"], "error");
        assert_eq!(response["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_handle_line_dispatches_tool() {
        let (state, _db) = test_state();
        let response = handle_line(&state, r#"{"tool":"get_company_overview"}"#).await;
        assert_eq!(response["status"], "success");
        assert_eq!(response["total_employees"], 0);
    }

    #[tokio::test]
    async fn test_handle_line_unknown_tool() {
        let (state, _db) = test_state();
        let response = handle_line(&state, r#"{"tool":"no_such_tool","args":{}}"#).await;
        assert_eq!(response["status"], "error");
        assert_eq!(response["code"], "VALIDATION_ERROR");
    }
}

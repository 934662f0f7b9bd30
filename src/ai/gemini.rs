// ==========================================
// 公司运营分析系统 - Gemini 客户端
// ==========================================
// 协议: Generative Language API generateContent
// 约束: 网关层已保证 api_key 非空；本层只负责 HTTP 调用与解码
// ==========================================

use crate::ai::TextGenerator;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// 请求超时（秒）
///
/// 外部分析调用是系统里唯一的高延迟操作；超时在客户端内兜底，
/// 更细粒度的取消由调用方基础设施负责。
const REQUEST_TIMEOUT_SECS: u64 = 60;

// ===== 请求/响应报文 =====

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

/// Gemini 文本生成客户端
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// 创建客户端
    ///
    /// # 参数
    /// - api_key: 已通过配置层校验的有效 key
    /// - model: 模型名（如 gemini-2.5-flash）
    pub fn new(api_key: String, model: String) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http_client,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_ENDPOINT, self.model, self.api_key
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("request timed out after {}s", REQUEST_TIMEOUT_SECS)
                } else if e.is_connect() {
                    anyhow::anyhow!("cannot connect to Gemini API")
                } else {
                    anyhow::anyhow!("failed to send request: {}", e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Gemini API error {}: {}", status, body));
        }

        let generate_response: GenerateResponse = response
            .json()
            .await
            .context("failed to parse Gemini response")?;

        let text = generate_response
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(anyhow::anyhow!("Gemini returned an empty response"));
        }

        Ok(text)
    }

    fn provider(&self) -> &str {
        "GEMINI"
    }
}

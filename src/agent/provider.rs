use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::config::Config;

// ── Conversation message types ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

// ── Anthropic-compatible API wire types ───────────────────────────────────────

#[derive(Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<ApiMessage>,
}

#[derive(Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ApiContent>,
}

#[derive(Deserialize)]
struct ApiContent {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

/// Endpoint and model settings for one backend instance.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

impl ProviderSettings {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.require_api_key()?.to_string(),
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
        })
    }
}

// ── HTTP client builder ───────────────────────────────────────────────────────

pub fn build_http_client(cfg: &Config) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();

    if let Some(proxy_url) = cfg.proxy.as_deref() {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
    }

    if let Some(ms) = cfg.timeout_ms {
        builder = builder
            .timeout(Duration::from_millis(ms))
            .connect_timeout(Duration::from_secs(10));
    }

    builder.build().map_err(Into::into)
}

// ── LLM call ─────────────────────────────────────────────────────────────────

/// Send the conversation to the model and return its text response.
pub async fn chat(
    client: &reqwest::Client,
    settings: &ProviderSettings,
    messages: &[Message],
) -> Result<String> {
    let body = build_request(settings, messages);
    tracing::debug!(model = %body.model, messages = body.messages.len(), "sending model request");

    let resp = client
        .post(format!("{}/v1/messages", settings.base_url))
        .header("x-api-key", &settings.api_key)
        .header("anthropic-version", "2023-06-01")
        .json(&body)
        .send()
        .await
        .context("HTTP request failed")?;

    parse_response(resp).await
}

fn build_request(settings: &ProviderSettings, messages: &[Message]) -> ApiRequest {
    let system = messages
        .iter()
        .find(|m| m.role == Role::System)
        .map(|m| m.content.clone())
        .unwrap_or_default();

    let api_messages: Vec<ApiMessage> = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| ApiMessage {
            role: "user",
            content: m.content.clone(),
        })
        .collect();

    ApiRequest {
        model: settings.model.clone(),
        max_tokens: settings.max_tokens,
        system,
        messages: api_messages,
    }
}

async fn parse_response(resp: reqwest::Response) -> Result<String> {
    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        return Err(anyhow!("API error {status}: {text}"));
    }

    let parsed: ApiResponse = resp.json().await.context("failed to parse API response")?;
    Ok(join_text_content(&parsed.content))
}

fn join_text_content(content: &[ApiContent]) -> String {
    content
        .iter()
        .filter(|b| b.kind == "text")
        .filter_map(|b| b.text.as_deref())
        .collect::<Vec<_>>()
        .join("")
}

#[cfg(test)]
mod tests {
    use super::{ApiResponse, Message, ProviderSettings, build_request, join_text_content};
    use crate::config::Config;

    fn settings() -> ProviderSettings {
        ProviderSettings {
            base_url: "http://localhost".into(),
            api_key: "k".into(),
            model: "m".into(),
            max_tokens: 128,
        }
    }

    #[test]
    fn system_message_is_lifted_out_of_the_list() {
        let body = build_request(
            &settings(),
            &[Message::system("sys"), Message::user("hi"), Message::user("again")],
        );
        assert_eq!(body.system, "sys");
        assert_eq!(body.messages.len(), 2);
        assert!(body.messages.iter().all(|m| m.role == "user"));
        assert_eq!(body.messages[1].content, "again");
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["max_tokens"], 128);
    }

    #[test]
    fn only_text_blocks_are_joined() {
        let raw = r#"{"content":[{"type":"text","text":"a"},{"type":"tool_use"},{"type":"text","text":"b"}]}"#;
        let parsed: ApiResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(join_text_content(&parsed.content), "ab");
    }

    #[test]
    fn settings_require_api_key() {
        let mut cfg = Config::default();
        assert!(ProviderSettings::from_config(&cfg).is_err());
        cfg.api_key = Some("key".into());
        cfg.base_url = "https://example.test/".into();
        let s = ProviderSettings::from_config(&cfg).expect("settings");
        assert_eq!(s.base_url, "https://example.test");
    }
}

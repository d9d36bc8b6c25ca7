//! OpenAI-compatible chat completion client
//!
//! The API key is always passed in by the caller; this module never reads
//! environment variables or configuration files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::LlmError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 1800;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// API credential; never printed in debug output
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for blank keys
    pub fn new(key: impl AsRef<str>) -> Option<Self> {
        let key = key.as_ref().trim();
        (!key.is_empty()).then(|| Self(key.to_string()))
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

pub struct ChatClient {
    api_key: ApiKey,
    settings: ChatSettings,
    client: reqwest::Client,
}

impl ChatClient {
    /// Create a client; fails with [`LlmError::MissingApiKey`] when no key is given
    pub fn new(api_key: Option<ApiKey>, settings: ChatSettings) -> Result<Self, LlmError> {
        let api_key = api_key.ok_or(LlmError::MissingApiKey)?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            settings,
            client,
        })
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Send a single user message and return the model's reply text
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'));
        let body = build_request(&self.settings, prompt);

        info!(model = %self.settings.model, prompt_chars = prompt.len(), "requesting completion");

        let res = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = res.json().await?;
        let text = extract_text(parsed)?;
        debug!(chars = text.len(), "completion received");
        Ok(text)
    }
}

fn build_request<'a>(settings: &'a ChatSettings, prompt: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model: &settings.model,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    }
}

fn extract_text(response: ChatResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(LlmError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_blank_key_is_missing() {
        assert!(ApiKey::new("   ").is_none());
        assert!(matches!(
            ChatClient::new(None, ChatSettings::default()),
            Err(LlmError::MissingApiKey)
        ));
    }

    #[test]
    fn test_key_is_redacted() {
        let key = ApiKey::new(" sk-secret ").unwrap();
        assert_eq!(key.expose(), "sk-secret");
        assert_eq!(format!("{key:?}"), "ApiKey(***)");
    }

    #[test]
    fn test_request_body() {
        let settings = ChatSettings::default();
        let body = serde_json::to_value(build_request(&settings, "hello")).unwrap();

        assert_eq!(body["model"], json!("gpt-4o-mini"));
        assert_eq!(body["max_tokens"], json!(1800));
        assert_eq!(body["messages"], json!([{"role": "user", "content": "hello"}]));
        assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_extract_text() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "Scope:\n• item"}}]
        }))
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "Scope:\n• item");
    }

    #[test]
    fn test_extract_text_empty() {
        let response: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(extract_text(response), Err(LlmError::EmptyResponse)));

        let response: ChatResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert!(matches!(extract_text(response), Err(LlmError::EmptyResponse)));
    }
}

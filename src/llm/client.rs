//! Blocking client for OpenAI-compatible chat-completions endpoints.

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub const API_KEY_ENV: &str = "TEMPOGRAPH_LLM_API_KEY";
pub const FALLBACK_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "TEMPOGRAPH_LLM_BASE_URL";
pub const MODEL_ENV: &str = "TEMPOGRAPH_LLM_MODEL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl ClientSettings {
    /// `None` when no API key is configured.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let api_key = non_empty(API_KEY_ENV).or_else(|| non_empty(FALLBACK_API_KEY_ENV))?;
        Some(Self {
            api_key,
            base_url: non_empty(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: non_empty(MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
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
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatClient {
    client: Client,
    settings: ClientSettings,
}

impl ChatClient {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    /// One system + user exchange; returns the first choice's text.
    pub fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String> {
        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.1,
            max_tokens,
        };

        log::debug!("POST {} (model {})", self.chat_url(), self.settings.model);
        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .context("Request to enhancement service failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("Enhancement service returned {}: {}", status, body);
        }

        let parsed: ChatResponse = response
            .json()
            .context("Malformed chat-completions response")?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("Chat-completions response had no content")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_missing_key_disables_client() {
        assert_eq!(ClientSettings::from_lookup(lookup(&[])), None);
        assert_eq!(
            ClientSettings::from_lookup(lookup(&[(API_KEY_ENV, "  ")])),
            None
        );
    }

    #[test]
    fn test_fallback_key_and_defaults() {
        let settings =
            ClientSettings::from_lookup(lookup(&[(FALLBACK_API_KEY_ENV, "sk-test")])).unwrap();
        assert_eq!(settings.api_key, "sk-test");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_overrides() {
        let settings = ClientSettings::from_lookup(lookup(&[
            (API_KEY_ENV, "primary"),
            (FALLBACK_API_KEY_ENV, "fallback"),
            (BASE_URL_ENV, "http://localhost:11434/v1/"),
            (MODEL_ENV, "llama3"),
        ]))
        .unwrap();
        assert_eq!(settings.api_key, "primary");
        assert_eq!(settings.model, "llama3");

        let client = ChatClient::new(settings).unwrap();
        assert_eq!(client.chat_url(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.1,
            max_tokens: 256,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 256);
    }
}

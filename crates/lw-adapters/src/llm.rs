// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The LLM chat-completion contract consumed by the `LLMChat` node.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// One turn of chat history handed to the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// The adapter's reply. `usage`/`raw` are provider-specific and kept as
/// opaque JSON rather than modeled per-provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

/// Coarse classification of `LlmError`, used where call sites need to
/// switch on failure category without matching every variant (HTTP
/// status mapping, metrics labels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    Timeout,
    Unavailable,
    Protocol,
    Auth,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm call timed out after {0:?}")]
    Timeout(Duration),
    #[error("llm adapter unavailable: {0}")]
    Unavailable(String),
    #[error("llm protocol error: {0}")]
    Protocol(String),
    #[error("llm auth error: {0}")]
    Auth(String),
}

impl LlmError {
    pub fn kind(&self) -> LlmErrorKind {
        match self {
            LlmError::Timeout(_) => LlmErrorKind::Timeout,
            LlmError::Unavailable(_) => LlmErrorKind::Unavailable,
            LlmError::Protocol(_) => LlmErrorKind::Protocol,
            LlmError::Auth(_) => LlmErrorKind::Auth,
        }
    }
}

/// Adapter for chat-completion calls against a configured model alias.
#[async_trait]
pub trait LlmAdapter: Send + Sync + 'static {
    async fn chat(
        &self,
        model_alias: &str,
        messages: Vec<ChatMessage>,
        timeout: Option<Duration>,
    ) -> Result<ChatReply, LlmError>;
}

/// How a `model_alias` maps onto a concrete provider endpoint: base URL,
/// the style of auth header to send, and the credential value itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRoute {
    pub base_url: String,
    pub endpoint_path: String,
    pub auth_style: AuthStyle,
    pub auth_value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStyle {
    Bearer,
    GoogApiKeyHeader,
    QueryParam,
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Production adapter. Resolves `model_alias` through a configured route
/// table and speaks plain JSON chat-completion over `reqwest`.
pub struct HttpLlmAdapter {
    client: reqwest::Client,
    routes: HashMap<String, ModelRoute>,
}

impl HttpLlmAdapter {
    pub fn new(client: reqwest::Client, routes: HashMap<String, ModelRoute>) -> Self {
        Self { client, routes }
    }

    fn route(&self, model_alias: &str) -> Result<&ModelRoute, LlmError> {
        self.routes
            .get(model_alias)
            .ok_or_else(|| LlmError::Protocol(format!("no route configured for model alias {model_alias:?}")))
    }
}

#[async_trait]
impl LlmAdapter for HttpLlmAdapter {
    async fn chat(
        &self,
        model_alias: &str,
        messages: Vec<ChatMessage>,
        timeout: Option<Duration>,
    ) -> Result<ChatReply, LlmError> {
        let route = self.route(model_alias)?;
        let url = format!("{}{}", route.base_url, route.endpoint_path);
        let mut req = self.client.post(&url).timeout(timeout.unwrap_or(DEFAULT_TIMEOUT));
        req = match route.auth_style {
            AuthStyle::Bearer => req.bearer_auth(&route.auth_value),
            AuthStyle::GoogApiKeyHeader => req.header("x-goog-api-key", &route.auth_value),
            AuthStyle::QueryParam => req.query(&[("key", &route.auth_value)]),
        };

        let body = serde_json::json!({ "model": model_alias, "messages": messages });
        let resp = req.json(&body).send().await.map_err(|err| {
            if err.is_timeout() {
                LlmError::Timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            } else if err.is_connect() {
                LlmError::Unavailable(err.to_string())
            } else {
                LlmError::Protocol(err.to_string())
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(LlmError::Auth(format!("status {status}")));
        }
        if status.is_server_error() {
            return Err(LlmError::Unavailable(format!("status {status}")));
        }
        if !status.is_success() {
            return Err(LlmError::Protocol(format!("status {status}")));
        }

        let raw: serde_json::Value = resp
            .json()
            .await
            .map_err(|err| LlmError::Protocol(format!("invalid response body: {err}")))?;

        let text = raw
            .get("text")
            .or_else(|| raw.pointer("/choices/0/message/content"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| LlmError::Protocol("response carried no text field".to_string()))?
            .to_string();
        let usage = raw.get("usage").cloned();

        Ok(ChatReply {
            text,
            usage,
            raw: Some(raw),
        })
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Scripted or recording fake for node and pipeline tests.
    pub struct FakeLlmAdapter {
        reply: String,
        fail_with: Option<Arc<dyn Fn() -> LlmError + Send + Sync>>,
        calls: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    }

    impl Default for FakeLlmAdapter {
        fn default() -> Self {
            Self {
                reply: "a story reply".to_string(),
                fail_with: None,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl FakeLlmAdapter {
        /// A fake that always replies with `reply`.
        pub fn scripted(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                ..Self::default()
            }
        }

        /// A fake that always fails, e.g. to exercise the `unavailable`
        /// fallback path in `LLMChat`.
        pub fn failing(err: impl Fn() -> LlmError + Send + Sync + 'static) -> Self {
            Self {
                fail_with: Some(Arc::new(err)),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<(String, Vec<ChatMessage>)> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl LlmAdapter for FakeLlmAdapter {
        async fn chat(
            &self,
            model_alias: &str,
            messages: Vec<ChatMessage>,
            _timeout: Option<Duration>,
        ) -> Result<ChatReply, LlmError> {
            self.calls.lock().push((model_alias.to_string(), messages));
            if let Some(make_err) = &self.fail_with {
                return Err(make_err());
            }
            Ok(ChatReply {
                text: self.reply.clone(),
                usage: None,
                raw: None,
            })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeLlmAdapter;

#[cfg(test)]
#[path = "llm_tests.rs"]
mod tests;

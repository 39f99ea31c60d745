//! One request, one response against the chat-completions endpoint.
//!
//! [`CompletionClient`] builds the wire request from the conversation and the
//! current [`RequestConfig`], hands it to a [`CompletionTransport`] and decodes
//! the reply. Nothing here retries; every failure is terminal for the turn.

use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use tracing::{debug, warn};

use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::core::config::RequestConfig;
use crate::core::constants::{API_KEY_ENV, COMPLETIONS_ENDPOINT};
use crate::core::message::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingCredential,
    Transport,
    ApiError,
    MalformedResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// Neither an override nor a built-in credential is available.
    MissingCredential,
    /// Connection, timeout or undecodable body.
    Transport(String),
    /// The provider answered with an `error` object.
    Api {
        message: String,
        status: Option<u16>,
        error_type: Option<String>,
        code: Option<String>,
    },
    /// Valid JSON without a usable choice.
    MalformedResponse,
}

impl CompletionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompletionError::MissingCredential => ErrorKind::MissingCredential,
            CompletionError::Transport(_) => ErrorKind::Transport,
            CompletionError::Api { .. } => ErrorKind::ApiError,
            CompletionError::MalformedResponse => ErrorKind::MalformedResponse,
        }
    }
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::MissingCredential => write!(
                f,
                "No API key configured. Run `deekseep auth` or set {API_KEY_ENV}."
            ),
            CompletionError::Transport(message) => write!(f, "Network error: {message}"),
            CompletionError::Api { message, .. } => f.write_str(message),
            CompletionError::MalformedResponse => {
                f.write_str("No valid choice or message found in response")
            }
        }
    }
}

impl Error for CompletionError {}

/// Status code and body of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Performs the single HTTP exchange for a request.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn send(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<RawResponse, CompletionError>;
}

/// [`CompletionTransport`] over `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: completions_url(base_url),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn completions_url(base_url: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), COMPLETIONS_ENDPOINT)
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn send(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<RawResponse, CompletionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {api_key}"))
            .json(request)
            .send()
            .await
            .map_err(|err| CompletionError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| CompletionError::Transport(err.to_string()))?;

        Ok(RawResponse { status, body })
    }
}

/// Wire request for `messages` under `config`. A non-empty system prompt is
/// always prepended, even when `messages` already starts with one.
pub fn build_request(messages: &[ChatMessage], config: &RequestConfig) -> ChatRequest {
    let mut api_messages = Vec::with_capacity(messages.len() + 1);
    if let Some(prompt) = config
        .system_prompt
        .as_deref()
        .filter(|prompt| !prompt.is_empty())
    {
        api_messages.push(ChatMessage::new(Role::System, prompt));
    }
    api_messages.extend_from_slice(messages);

    ChatRequest {
        model: config.api_model_id.clone(),
        messages: api_messages,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

/// Interpret a response body. An `error` object wins over any choices; only
/// the first choice is ever used.
pub fn decode_response(raw: &RawResponse) -> Result<String, CompletionError> {
    let response: ChatResponse = serde_json::from_str(&raw.body).map_err(|err| {
        warn!(status = raw.status, "failed to decode completion response: {err}");
        CompletionError::Transport(format!(
            "could not decode response (HTTP {}): {err}",
            raw.status
        ))
    })?;

    if let Some(error) = response.error {
        warn!(
            status = raw.status,
            error_type = error.kind.as_deref().unwrap_or("N/A"),
            "API error: {}",
            error.message
        );
        let code = error.code_string();
        return Err(CompletionError::Api {
            message: error.message,
            status: Some(raw.status),
            error_type: error.kind,
            code,
        });
    }

    response
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or(CompletionError::MalformedResponse)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

pub struct CompletionClient {
    transport: Box<dyn CompletionTransport>,
    default_credential: Option<String>,
}

impl CompletionClient {
    pub fn new(
        transport: impl CompletionTransport + 'static,
        default_credential: Option<String>,
    ) -> Self {
        Self {
            transport: Box::new(transport),
            default_credential,
        }
    }

    /// Uses the `DEEPSEEK_API_KEY` environment variable as the built-in
    /// credential.
    pub fn from_env(transport: impl CompletionTransport + 'static) -> Self {
        Self::new(transport, std::env::var(API_KEY_ENV).ok())
    }

    /// Override first, then the built-in default. Blank values count as absent.
    pub fn resolve_credential(&self, config: &RequestConfig) -> Result<String, CompletionError> {
        non_blank(config.credential_override.as_deref())
            .or_else(|| non_blank(self.default_credential.as_deref()))
            .map(str::to_string)
            .ok_or(CompletionError::MissingCredential)
    }

    /// Send `messages` and return the first choice's content.
    ///
    /// The whole exchange is bounded by `config.timeout`; expiry is reported
    /// as a transport failure.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        config: &RequestConfig,
    ) -> Result<String, CompletionError> {
        let api_key = self.resolve_credential(config)?;
        let request = build_request(messages, config);
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            temperature = request.temperature,
            max_tokens = request.max_tokens,
            "sending completion request"
        );

        let raw = tokio::time::timeout(config.timeout, self.transport.send(&api_key, &request))
            .await
            .map_err(|_| {
                CompletionError::Transport(format!(
                    "request timed out after {}s",
                    config.timeout.as_secs_f64()
                ))
            })??;

        debug!(status = raw.status, bytes = raw.body.len(), "received completion response");
        decode_response(&raw)
    }
}

#[cfg(test)]
mod tests;

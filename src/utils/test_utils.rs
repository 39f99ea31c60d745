use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::api::ChatRequest;
use crate::core::completion::{CompletionError, CompletionTransport, RawResponse};
use crate::core::config::RequestConfig;

/// What a [`ScriptedTransport`] saw, shared with the test after the transport
/// has been moved into a client.
#[derive(Clone, Default)]
pub struct TransportProbe {
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
}

impl TransportProbe {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(api_key, request body)` for every call, in order.
    pub fn requests(&self) -> Vec<(String, serde_json::Value)> {
        self.requests.lock().unwrap().clone()
    }
}

/// Transport that replays canned responses instead of touching the network.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse, CompletionError>>>,
    probe: TransportProbe,
    gate: Option<Arc<Notify>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(RawResponse {
            status,
            body: body.into(),
        }));
        self
    }

    pub fn reply(self, content: &str) -> Self {
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        });
        self.respond(200, body.to_string())
    }

    pub fn fail(self, error: CompletionError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Hold every response until the gate is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn probe(&self) -> TransportProbe {
        self.probe.clone()
    }
}

#[async_trait]
impl CompletionTransport for ScriptedTransport {
    async fn send(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<RawResponse, CompletionError> {
        self.probe.calls.fetch_add(1, Ordering::SeqCst);
        let body = serde_json::to_value(request).unwrap();
        self.probe
            .requests
            .lock()
            .unwrap()
            .push((api_key.to_string(), body));

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::Transport("no scripted response".into())))
    }
}

pub fn test_request_config() -> RequestConfig {
    RequestConfig {
        credential_override: Some("test-key".to_string()),
        system_prompt: Some("Be brief.".to_string()),
        ..RequestConfig::default()
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::completion::CompletionClient;
use crate::core::config::SettingsProvider;
use crate::core::message::{Role, Turn};
use crate::core::transcript::Transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Nothing left after trimming whitespace.
    Empty,
    /// Another submission is still waiting for its reply.
    Busy,
    /// The controller was abandoned.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was appended and no request was made.
    Ignored(RejectReason),
    Replied(Turn),
    /// The assistant turn carries the error text.
    Failed(Turn),
    /// The controller was abandoned while the request was in flight. The user
    /// turn stays; no assistant turn is added.
    Abandoned,
}

/// Clears the in-flight flag however the submission ends, including when the
/// submit future is dropped mid-request.
struct SendingGuard<'a>(&'a AtomicBool);

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs user submissions through the completion client, one at a time.
///
/// The in-flight flag is taken with a compare-and-swap, so a second `submit`
/// racing the first is rejected rather than queued. Failures never escape:
/// they become an assistant turn starting with `Error: `.
pub struct TurnController {
    client: CompletionClient,
    settings: Box<dyn SettingsProvider>,
    transcript: Mutex<Transcript>,
    sending: AtomicBool,
    cancel: CancellationToken,
}

impl TurnController {
    pub fn new(client: CompletionClient, settings: impl SettingsProvider + 'static) -> Self {
        Self {
            client,
            settings: Box::new(settings),
            transcript: Mutex::new(Transcript::new()),
            sending: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    fn lock_transcript(&self) -> MutexGuard<'_, Transcript> {
        self.transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Snapshot of the conversation so far.
    pub fn transcript(&self) -> Vec<Turn> {
        self.lock_transcript().turns().to_vec()
    }

    /// Receive every turn appended from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Turn> {
        self.lock_transcript().subscribe()
    }

    /// Stop waiting on any in-flight request and refuse further submissions.
    pub fn abandon(&self) {
        self.cancel.cancel();
    }

    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let prompt = text.trim();
        if prompt.is_empty() {
            return SubmitOutcome::Ignored(RejectReason::Empty);
        }
        if self.is_closed() {
            return SubmitOutcome::Ignored(RejectReason::Closed);
        }
        if self
            .sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("submission rejected: request already in flight");
            return SubmitOutcome::Ignored(RejectReason::Busy);
        }
        let _guard = SendingGuard(&self.sending);

        let messages = {
            let mut transcript = self.lock_transcript();
            transcript.append(Role::User, prompt);
            transcript.to_api_messages()
        };

        let result = match self.settings.request_config() {
            Ok(config) => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        debug!("in-flight request abandoned");
                        return SubmitOutcome::Abandoned;
                    }
                    result = self.client.complete(&messages, &config) => {
                        result.map_err(|err| {
                            warn!(kind = ?err.kind(), "completion failed: {err}");
                            err.to_string()
                        })
                    }
                }
            }
            Err(err) => {
                warn!("could not read settings: {err}");
                Err(err.to_string())
            }
        };

        let mut transcript = self.lock_transcript();
        match result {
            Ok(content) => SubmitOutcome::Replied(transcript.append(Role::Assistant, content)),
            Err(message) => {
                SubmitOutcome::Failed(transcript.append(Role::Assistant, format!("Error: {message}")))
            }
        }
    }
}

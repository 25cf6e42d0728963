//! The chat widget: input handling, submission and transcript upkeep.
//!
//! A widget is driven from one task. Requests run on spawned tokio tasks,
//! but their results are only applied to the transcript by the widget
//! itself (`next_reply`, `settle`, `run`), so the transcript is never
//! touched concurrently.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::{FutureExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};

use crate::client::{AskBackend, ClientError};
use crate::transcript::{SubmissionId, Transcript, TranscriptEntry, ERROR_MARKER};
use crate::view::{render_lines, ChatView, MountError, WidgetLayout};

/// Key events delivered to the input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Char(char),
    Backspace,
    Enter,
}

/// What happens when a question is submitted while another is unanswered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPolicy {
    /// The input is disabled until the answer arrives.
    #[default]
    Serial,
    /// Questions may overlap; answers are appended in resolution order.
    Concurrent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Idle,
    AwaitingResponse,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("question is empty")]
    EmptyInput,
    #[error("still waiting for the previous answer")]
    Busy,
    /// Requests are spawned as tokio tasks, so submitting needs a runtime.
    #[error("no tokio runtime to send the question on")]
    NoRuntime,
}

#[derive(Debug, Clone, Default)]
pub struct WidgetOptions {
    pub layout: WidgetLayout,
    pub policy: SubmissionPolicy,
}

type Reply = (SubmissionId, Result<String, ClientError>);

/// A mounted chat widget. Dropping it (or calling [`ChatWidget::unmount`])
/// aborts in-flight requests and releases the view.
///
/// Questions are sent on the tokio runtime current at submission time;
/// submitting outside one fails with [`SubmitError::NoRuntime`].
pub struct ChatWidget<V: ChatView> {
    view: V,
    backend: Arc<dyn AskBackend>,
    layout: WidgetLayout,
    policy: SubmissionPolicy,
    transcript: Transcript,
    input: String,
    in_flight: JoinSet<Reply>,
    next_submission: SubmissionId,
}

impl<V: ChatView> ChatWidget<V> {
    /// Mount header, transcript area and input field into `view`, replacing
    /// its previous contents.
    pub fn initialize(
        mut view: V,
        backend: Arc<dyn AskBackend>,
        options: WidgetOptions,
    ) -> Result<Self, MountError> {
        view.mount(&options.layout)?;
        view.render(&[]);
        view.set_input("");
        view.set_input_enabled(true);
        tracing::debug!(policy = ?options.policy, "chat widget mounted");

        Ok(Self {
            view,
            backend,
            layout: options.layout,
            policy: options.policy,
            transcript: Transcript::new(),
            input: String::new(),
            in_flight: JoinSet::new(),
            next_submission: 1,
        })
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Current value of the input field.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn layout(&self) -> &WidgetLayout {
        &self.layout
    }

    pub fn policy(&self) -> SubmissionPolicy {
        self.policy
    }

    pub fn state(&self) -> WidgetState {
        if self.in_flight.is_empty() {
            WidgetState::Idle
        } else {
            WidgetState::AwaitingResponse
        }
    }

    /// Number of submitted questions still waiting for an answer.
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether the input field currently takes keystrokes.
    pub fn accepts_input(&self) -> bool {
        match self.policy {
            SubmissionPolicy::Serial => self.in_flight.is_empty(),
            SubmissionPolicy::Concurrent => true,
        }
    }

    /// Replace the input field's value. Ignored while the input is disabled.
    pub fn set_input(&mut self, value: &str) {
        if !self.accepts_input() {
            return;
        }
        self.input.clear();
        self.input.push_str(value);
        self.view.set_input(&self.input);
    }

    /// Feed one key to the input field. Only `Enter` submits; it returns the
    /// outcome of that submission.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Result<SubmissionId, SubmitError>> {
        match key {
            KeyEvent::Enter => {
                let question = self.input.clone();
                Some(self.submit_question(&question))
            }
            _ if !self.accepts_input() => None,
            KeyEvent::Char(c) => {
                self.input.push(c);
                self.view.set_input(&self.input);
                None
            }
            KeyEvent::Backspace => {
                self.input.pop();
                self.view.set_input(&self.input);
                None
            }
        }
    }

    /// Echo `text` into the transcript, clear the input and send the
    /// question. The answer is appended later by [`ChatWidget::next_reply`].
    ///
    /// The transcript shows the trimmed text; the request carries `text` as
    /// typed.
    pub fn submit_question(&mut self, text: &str) -> Result<SubmissionId, SubmitError> {
        let echoed = text.trim();
        if echoed.is_empty() {
            return Err(SubmitError::EmptyInput);
        }
        if !self.accepts_input() {
            return Err(SubmitError::Busy);
        }
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| SubmitError::NoRuntime)?;

        let id = self.next_submission;
        self.next_submission += 1;
        self.transcript.push_user(id, echoed.to_string());
        self.input.clear();
        self.view.set_input("");

        let backend = Arc::clone(&self.backend);
        let question = text.to_string();
        let request = async move {
            let result = AssertUnwindSafe(backend.ask(&question))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(ClientError::Backend("backend panicked".into())));
            (id, result)
        };
        self.in_flight.spawn_on(request, &runtime);

        if self.policy == SubmissionPolicy::Serial {
            self.view.set_input_enabled(false);
        }
        self.refresh();
        tracing::info!(submission = id, pending = self.in_flight.len(), "question submitted");
        Ok(id)
    }

    /// Wait for the next outstanding request to resolve and append its Bot
    /// entry. Returns `None` once nothing is in flight.
    pub async fn next_reply(&mut self) -> Option<TranscriptEntry> {
        while let Some(joined) = self.in_flight.join_next().await {
            if let Some(entry) = self.apply_reply(joined) {
                return Some(entry);
            }
        }
        None
    }

    /// Wait for every outstanding request.
    pub async fn settle(&mut self) {
        while self.next_reply().await.is_some() {}
    }

    /// Event loop: apply key events and request completions as they happen.
    /// Returns once `events` ends and every reply has arrived.
    pub async fn run<S>(&mut self, events: S)
    where
        S: Stream<Item = KeyEvent>,
    {
        tokio::pin!(events);
        loop {
            let awaiting = !self.in_flight.is_empty();
            let listening = self.accepts_input();
            tokio::select! {
                Some(joined) = self.in_flight.join_next(), if awaiting => {
                    self.apply_reply(joined);
                }
                event = events.next(), if listening => match event {
                    Some(key) => {
                        if let Some(Err(e)) = self.handle_key(key) {
                            tracing::debug!(error = %e, "submission rejected");
                        }
                    }
                    None => break,
                },
                else => break,
            }
        }
        self.settle().await;
    }

    /// Consume the widget, releasing the view, and hand back the transcript.
    pub fn unmount(mut self) -> Transcript {
        std::mem::take(&mut self.transcript)
    }

    fn apply_reply(&mut self, joined: Result<Reply, JoinError>) -> Option<TranscriptEntry> {
        let (id, result) = match joined {
            Ok(reply) => reply,
            Err(e) => {
                // Only reachable through abort, which happens on unmount.
                tracing::debug!(error = %e, "request task did not complete");
                return None;
            }
        };

        let (text, is_error) = match result {
            Ok(answer) => (answer, false),
            Err(e) => {
                tracing::warn!(submission = id, error = %e, "question failed");
                (ERROR_MARKER.to_string(), true)
            }
        };
        let entry = self.transcript.push_bot(id, text, is_error).cloned();
        if entry.is_none() {
            tracing::error!(submission = id, "reply for unknown or answered submission");
        }

        if self.in_flight.is_empty() {
            self.view.set_input_enabled(true);
        }
        self.refresh();
        entry
    }

    fn refresh(&mut self) {
        let lines = render_lines(&self.layout, self.transcript.entries());
        self.view.render(&lines);
    }
}

impl<V: ChatView> Drop for ChatWidget<V> {
    fn drop(&mut self) {
        self.in_flight.abort_all();
        self.view.unmount();
        tracing::debug!("chat widget unmounted");
    }
}

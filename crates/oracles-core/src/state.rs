//! UI-agnostic session state and the lifecycle of a single chat turn.
//!
//! A [`Session`] has exactly one owner (the UI event loop). Each step of a
//! turn is a plain method on it: [`Session::begin_submit`] moves the session
//! from idle to sending, and [`Session::settle`] moves it back, either
//! appending the assistant's answer or recording an error.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::{ChatClient, ChatResponse};
use crate::error::ChatError;

/// One message in the conversation. Never edited once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The author of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Sending,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    turns: Vec<ChatTurn>,
    draft: String,
    loading: bool,
    error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> TurnPhase {
        if self.loading {
            TurnPhase::Sending
        } else {
            TurnPhase::Idle
        }
    }

    /// True when the draft has visible text and nothing is in flight.
    pub fn can_submit(&self) -> bool {
        !self.loading && !self.draft.trim().is_empty()
    }

    /// Start a turn: clear the error and the draft, append the user turn and
    /// raise the loading flag. Returns the trimmed query to send, or `None`
    /// (leaving the session untouched) when the draft is blank or a request
    /// is already outstanding.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.loading {
            debug!("submit ignored: request already in flight");
            return None;
        }

        let content = self.draft.trim().to_string();
        if content.is_empty() {
            return None;
        }

        self.error = None;
        self.draft.clear();
        self.turns.push(ChatTurn::user(content.clone()));
        self.loading = true;

        info!(turns = self.turns.len(), "turn submitted");
        Some(content)
    }

    pub fn settle_success(&mut self, response: ChatResponse) {
        self.turns.push(ChatTurn::assistant(response.answer()));
        self.loading = false;
        info!(turns = self.turns.len(), "turn settled with reply");
    }

    /// Record a failure. The user turn stays; no assistant turn is added.
    pub fn settle_error(&mut self, err: &ChatError) {
        self.error = Some(err.user_message());
        self.loading = false;
        info!(error = %err, "turn settled with error");
    }

    pub fn settle(&mut self, result: Result<ChatResponse, ChatError>) {
        match result {
            Ok(response) => self.settle_success(response),
            Err(err) => self.settle_error(&err),
        }
    }

    /// Run a whole turn against `client`. Returns false when nothing was sent.
    pub async fn submit(&mut self, client: &ChatClient) -> bool {
        let Some(query) = self.begin_submit() else {
            return false;
        };
        let result = client.send(&query).await;
        self.settle(result);
        true
    }
}

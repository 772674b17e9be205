use thiserror::Error;

/// Shown when a failure carries no message of its own.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Everything that can end a chat turn without an assistant reply.
///
/// The `Display` output is what the user sees in the error line, so HTTP
/// failures render the backend's body verbatim when there is one.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{}", http_message(.status, .body))]
    Http { status: u16, body: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    /// The background request task panicked or was aborted.
    #[error("{0}")]
    Task(String),
}

impl ChatError {
    /// Message for the error line; never empty.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            message
        }
    }
}

fn http_message(status: &u16, body: &str) -> String {
    if body.is_empty() {
        format!("Request failed with {}", status)
    } else {
        body.to_string()
    }
}

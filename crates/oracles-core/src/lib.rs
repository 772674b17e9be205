pub mod client;
pub mod config;
pub mod error;
pub mod state;

// Re-export main types for convenience
pub use client::{ChatClient, ChatRequest, ChatResponse, CHAT_PATH, NO_RESPONSE};
pub use config::Config;
pub use error::ChatError;
pub use state::{ChatRole, ChatTurn, Session, TurnPhase};

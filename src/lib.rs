//! Telegram Mass Sender Library
//!
//! This library provides tools to:
//! - Load target groups and message candidates from plain-text files
//! - Shuffle and split the groups between concurrent workers every cycle
//! - Send a randomly chosen message to each group with randomized pauses
//! - Repeat for a fixed number of cycles or until stopped
//! - Expose Prometheus metrics for sends and cycles

pub mod chat;
pub mod commands;
pub mod config;
pub mod error;
pub mod metrics;
pub mod sender;
pub mod session;

// Re-export common types
pub use chat::TelegramChatClient;
pub use config::Config;
pub use error::{Error, Result};
pub use sender::{ChatClient, CycleCount, Orchestrator, RunConfig, RunStats};
pub use session::{check_session_exists, get_client, SessionLock};

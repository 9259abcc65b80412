//! Studydesk Assistant Service
//!
//! A conversational assistant that serves educational resource links by
//! subject code. Lookups are metered: every user gets a small free quota,
//! after which a paid subscription (activated by an admin approving a
//! payment reference) unlocks unlimited searches. A small HTTP surface
//! exposes health and usage counters for uptime monitors.

pub mod approvals;
pub mod catalog;
pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod gate;
pub mod routes;
pub mod state;
pub mod store;

pub use channel::{ConsoleChannel, MessageId, MessagingChannel};
pub use config::Config;
pub use error::BotError;
pub use state::AppState;
pub use store::{InMemoryStore, SqliteStore, Store, UserId};

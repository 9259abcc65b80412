//! Common test utilities for assistant integration tests

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use studydesk_bot::{
    catalog, AppState, Config, InMemoryStore, MessageId, MessagingChannel, UserId,
};
use studydesk_core::{Link, ResourceKind, SubjectCode, Unit};

pub const ADMIN: UserId = UserId(1);
pub const STUDENT: UserId = UserId(42);

/// One outbound message as its recipient currently sees it
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub to: UserId,
    pub id: MessageId,
    pub text: String,
    pub edits: u32,
}

/// Mock channel that records every message and applies edits in place
#[derive(Clone)]
pub struct RecordingChannel {
    pub messages: Arc<RwLock<Vec<SentMessage>>>,
    next_id: Arc<AtomicU64>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Current texts addressed to one user, oldest first
    pub fn texts_to(&self, user: UserId) -> Vec<String> {
        self.messages
            .read()
            .unwrap()
            .iter()
            .filter(|message| message.to == user)
            .map(|message| message.text.clone())
            .collect()
    }

    /// The newest message addressed to one user, as it currently reads
    pub fn last_text_to(&self, user: UserId) -> String {
        self.texts_to(user).pop().expect("no messages for user")
    }

    /// How many distinct messages went to one user (edits don't count)
    pub fn sent_count_to(&self, user: UserId) -> usize {
        self.texts_to(user).len()
    }
}

impl Default for RecordingChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl MessagingChannel for RecordingChannel {
    fn send(&self, to: UserId, text: &str) -> Result<MessageId, String> {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.messages.write().unwrap().push(SentMessage {
            to,
            id,
            text: text.to_string(),
            edits: 0,
        });
        Ok(id)
    }

    fn edit(&self, to: UserId, message: MessageId, text: &str) -> Result<(), String> {
        let mut messages = self.messages.write().unwrap();
        let found = messages
            .iter_mut()
            .find(|m| m.to == to && m.id == message)
            .ok_or_else(|| format!("no message {} for user {}", message, to))?;
        found.text = text.to_string();
        found.edits += 1;
        Ok(())
    }
}

/// The state type every integration test drives
pub type TestState = Arc<AppState<InMemoryStore, RecordingChannel>>;

/// Assistant wired to an in-memory store and a recording channel.
/// User 1 is the configured admin.
pub fn test_state() -> (TestState, RecordingChannel) {
    let channel = RecordingChannel::new();
    let config = Config {
        admin_id: ADMIN.0,
        ..Config::default()
    };
    let state = Arc::new(AppState::new(InMemoryStore::new(), channel.clone(), config));
    (state, channel)
}

/// Store one resource link directly, bypassing the conversation
pub fn seed_resource(
    state: &AppState<InMemoryStore, RecordingChannel>,
    code: &str,
    name: &str,
    unit: i64,
    kind: ResourceKind,
    link: &str,
) {
    let code = SubjectCode::parse(code).expect("bad code in test seed");
    let unit = Unit::new(unit).expect("bad unit in test seed");
    let link = Link::parse(link).expect("bad link in test seed");
    catalog::upsert(&state.store, &code, name, unit, kind, link).expect("seed failed");
}

/// Advance the paused clock far enough for any loading animation to finish
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
}

//! Shared application state

use std::collections::HashMap;
use std::sync::Mutex;

use crate::channel::MessagingChannel;
use crate::config::Config;
use crate::engine::flows::Flow;
use crate::store::{Store, UserId};

/// Application state shared across the dispatcher and the status routes
pub struct AppState<S, C> {
    /// Persistent storage for users, resources, and payments
    pub store: S,

    /// Outbound messaging channel
    pub channel: C,

    /// Runtime configuration
    pub config: Config,

    /// Per-user conversational state
    pub sessions: Sessions,
}

impl<S, C> AppState<S, C>
where
    S: Store,
    C: MessagingChannel,
{
    pub fn new(store: S, channel: C, config: Config) -> Self {
        Self {
            store,
            channel,
            config,
            sessions: Sessions::new(),
        }
    }

    /// Whether the given user is the configured administrator
    pub fn is_admin(&self, user: UserId) -> bool {
        user.0 == self.config.admin_id
    }
}

/// In-memory table of active conversational flows, one per user
#[derive(Default)]
pub struct Sessions {
    flows: Mutex<HashMap<UserId, Flow>>,
}

impl Sessions {
    pub fn new() -> Self {
        Self {
            flows: Mutex::new(HashMap::new()),
        }
    }

    /// Remove and return the user's active flow, if any
    pub fn take(&self, user: UserId) -> Option<Flow> {
        self.flows.lock().unwrap().remove(&user)
    }

    /// Replace the user's active flow
    pub fn set(&self, user: UserId, flow: Flow) {
        self.flows.lock().unwrap().insert(user, flow);
    }

    /// Drop the user's active flow
    pub fn clear(&self, user: UserId) {
        self.flows.lock().unwrap().remove(&user);
    }
}

//! Messaging channel abstractions

pub mod console;

pub use console::ConsoleChannel;

use crate::store::UserId;

/// Identifier of a delivered message, used to edit it in place later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait for delivering chat messages to users
pub trait MessagingChannel: Send + Sync {
    /// Send a text message to a user, returning the id of the delivered message
    fn send(&self, to: UserId, text: &str) -> Result<MessageId, String>;

    /// Replace the text of a previously delivered message
    fn edit(&self, to: UserId, message: MessageId, text: &str) -> Result<(), String>;
}

/// Allow using Box<dyn MessagingChannel> as a MessagingChannel
impl MessagingChannel for Box<dyn MessagingChannel> {
    fn send(&self, to: UserId, text: &str) -> Result<MessageId, String> {
        (**self).send(to, text)
    }

    fn edit(&self, to: UserId, message: MessageId, text: &str) -> Result<(), String> {
        (**self).edit(to, message, text)
    }
}

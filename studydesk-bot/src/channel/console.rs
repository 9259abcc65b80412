//! Console-based messaging channel for development

use std::sync::atomic::{AtomicU64, Ordering};

use super::{MessageId, MessagingChannel};
use crate::store::UserId;

/// Messaging channel that prints to the console (for development)
pub struct ConsoleChannel {
    next_id: AtomicU64,
}

impl ConsoleChannel {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for ConsoleChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl MessagingChannel for ConsoleChannel {
    fn send(&self, to: UserId, text: &str) -> Result<MessageId, String> {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::Relaxed));

        println!();
        println!("========================================");
        println!("  TO USER: {} (message {})", to, id);
        println!("{}", text);
        println!("========================================");
        println!();

        tracing::info!(user = %to, message = %id, "Message sent");

        Ok(id)
    }

    fn edit(&self, to: UserId, message: MessageId, text: &str) -> Result<(), String> {
        println!();
        println!("========================================");
        println!("  TO USER: {} (edit of message {})", to, message);
        println!("{}", text);
        println!("========================================");
        println!();

        tracing::info!(user = %to, message = %message, "Message edited");

        Ok(())
    }
}

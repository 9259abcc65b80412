//! Storage abstractions for the assistant

pub mod memory;
pub mod models;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use models::*;
pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};
use studydesk_core::{SubjectCode, Unit};

use crate::error::BotError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, BotError>;

/// Trait over the four record collections the assistant keeps: users,
/// resource rows, payment requests, and subject access counters
pub trait Store: Send + Sync {
    /// Create a user record with zeroed counters if none exists yet
    fn ensure_user(&self, user: UserId) -> StoreResult<()>;

    /// Get a user by id
    fn get_user(&self, user: UserId) -> StoreResult<Option<UserRecord>>;

    /// Add one to a user's free-search counter
    fn increment_search_count(&self, user: UserId) -> StoreResult<()>;

    /// Turn the subscription flag on with the given expiry
    fn set_subscription(&self, user: UserId, expires_at: DateTime<Utc>) -> StoreResult<()>;

    /// Clear the subscription flag and expiry together
    fn clear_subscription(&self, user: UserId) -> StoreResult<()>;

    /// Get one (subject, unit) row
    fn get_resource(&self, code: &SubjectCode, unit: Unit) -> StoreResult<Option<ResourceRow>>;

    /// All rows for a subject, ascending by unit
    fn list_resources(&self, code: &SubjectCode) -> StoreResult<Vec<ResourceRow>>;

    /// Insert or replace one (subject, unit) row
    fn put_resource(&self, row: &ResourceRow) -> StoreResult<()>;

    /// Delete one (subject, unit) row
    fn delete_resource(&self, code: &SubjectCode, unit: Unit) -> StoreResult<()>;

    /// Delete every row for a subject, returning how many went away
    fn delete_subject(&self, code: &SubjectCode) -> StoreResult<u64>;

    /// Record a new pending payment request; duplicate reference ids are
    /// rejected
    fn create_payment_request(&self, request: PaymentRequest) -> StoreResult<()>;

    /// Find a pending request by reference, optionally scoped to a requester
    fn find_pending_payment(
        &self,
        reference: &str,
        requester: Option<UserId>,
    ) -> StoreResult<Option<PaymentRequest>>;

    /// Flip a request from pending to verified
    fn mark_payment_verified(&self, reference: &str) -> StoreResult<()>;

    /// Pending requests, newest first
    fn pending_payments(&self) -> StoreResult<Vec<PaymentRequest>>;

    /// Whether any of the user's requests ever reached verified
    fn has_verified_payment(&self, user: UserId) -> StoreResult<bool>;

    /// Count one successful delivery for a subject
    fn increment_subject_access(&self, code: &SubjectCode) -> StoreResult<()>;

    /// The subject with the highest access count
    fn most_accessed_subject(&self) -> StoreResult<Option<(SubjectCode, u64)>>;

    /// One-shot usage numbers for reporting
    fn usage_stats(&self) -> StoreResult<UsageStats>;
}

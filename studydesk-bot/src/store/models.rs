//! Data models for assistant storage

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use studydesk_core::{SubjectCode, Unit, UnitLinks};

/// Unique user identifier (one per messaging-channel account)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user account with its quota and subscription state
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    /// Free lookups consumed so far
    pub search_count: u32,
    pub subscribed: bool,
    /// Present iff `subscribed` was true at write time
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One stored (subject, unit) row with its three optional link slots
#[derive(Debug, Clone)]
pub struct ResourceRow {
    pub code: SubjectCode,
    pub name: String,
    pub unit: Unit,
    pub links: UnitLinks,
}

impl ResourceRow {
    /// True when no link slot is filled; such rows never persist
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Verification status of a payment request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Verified,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Verified => "verified",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "verified" => Some(PaymentStatus::Verified),
            _ => None,
        }
    }
}

/// A payment-verification request
///
/// Requests are kept forever as an audit trail; only the status moves,
/// pending to verified, exactly once.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    /// Opaque token supplied by the user, unique across all requests
    pub reference: String,
    pub user: UserId,
    pub status: PaymentStatus,
    pub submitted_at: DateTime<Utc>,
}

/// Usage numbers reported by `/stats`, `/admin`, and the status surface
#[derive(Debug, Clone, Serialize)]
pub struct UsageStats {
    pub total_users: u64,
    pub active_subscribers: u64,
    pub verified_payments: u64,
    pub pending_payments: u64,
    pub resource_rows: u64,
    pub subject_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_accessed: Option<MostAccessed>,
}

/// The subject with the highest delivery count
#[derive(Debug, Clone, Serialize)]
pub struct MostAccessed {
    pub code: String,
    pub count: u64,
}

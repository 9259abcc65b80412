//! Access gate for lookups
//!
//! Decides whether a user may perform a lookup: active subscribers are
//! unlimited, everyone else gets a fixed number of free searches.

use chrono::{DateTime, Utc};

use crate::store::{Store, StoreResult, UserId};

/// Number of free searches before a subscription is required
pub const FREE_SEARCH_QUOTA: u32 = 4;

/// Outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted {
        subscribed: bool,
        searches_used: u32,
    },
    Denied(DenialReason),
}

/// Why a lookup was denied; changes the copy shown, not the decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Free quota used up and the user never had a verified payment
    QuotaExhausted,
    /// A verified payment exists, so a subscription lapsed at some point
    SubscriptionLapsed,
}

/// Current subscription expiry for a user, if actively subscribed.
///
/// Reading an expired subscription clears the flag and expiry in the store,
/// so a later grant or verification starts clean.
pub fn subscription_expiry<S: Store>(
    store: &S,
    user: UserId,
) -> StoreResult<Option<DateTime<Utc>>> {
    let record = match store.get_user(user)? {
        Some(record) => record,
        None => return Ok(None),
    };

    match (record.subscribed, record.subscription_expires_at) {
        (true, Some(expiry)) if expiry > Utc::now() => Ok(Some(expiry)),
        (true, _) => {
            store.clear_subscription(user)?;
            Ok(None)
        }
        _ => Ok(None),
    }
}

/// Decide whether a user may perform a lookup right now
pub fn check<S: Store>(store: &S, user: UserId) -> StoreResult<Access> {
    let subscribed = subscription_expiry(store, user)?.is_some();
    let searches_used = store
        .get_user(user)?
        .map(|record| record.search_count)
        .unwrap_or(0);

    if subscribed {
        return Ok(Access::Granted {
            subscribed: true,
            searches_used,
        });
    }

    if searches_used < FREE_SEARCH_QUOTA {
        return Ok(Access::Granted {
            subscribed: false,
            searches_used,
        });
    }

    let reason = if store.has_verified_payment(user)? {
        DenialReason::SubscriptionLapsed
    } else {
        DenialReason::QuotaExhausted
    };

    Ok(Access::Denied(reason))
}

/// Consume one unit of free-search quota
pub fn record_search<S: Store>(store: &S, user: UserId) -> StoreResult<()> {
    store.increment_search_count(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, PaymentRequest, PaymentStatus};

    #[test]
    fn test_fresh_user_is_granted() {
        let store = InMemoryStore::new();
        store.ensure_user(UserId(1)).unwrap();

        let access = check(&store, UserId(1)).unwrap();
        assert_eq!(
            access,
            Access::Granted {
                subscribed: false,
                searches_used: 0
            }
        );
    }

    #[test]
    fn test_quota_boundary() {
        let store = InMemoryStore::new();
        store.ensure_user(UserId(1)).unwrap();

        for _ in 0..FREE_SEARCH_QUOTA - 1 {
            record_search(&store, UserId(1)).unwrap();
        }
        assert!(matches!(
            check(&store, UserId(1)).unwrap(),
            Access::Granted {
                subscribed: false,
                searches_used: 3
            }
        ));

        record_search(&store, UserId(1)).unwrap();
        assert_eq!(
            check(&store, UserId(1)).unwrap(),
            Access::Denied(DenialReason::QuotaExhausted)
        );
    }

    #[test]
    fn test_subscriber_is_unlimited() {
        let store = InMemoryStore::new();
        store.ensure_user(UserId(1)).unwrap();
        for _ in 0..FREE_SEARCH_QUOTA {
            record_search(&store, UserId(1)).unwrap();
        }
        store
            .set_subscription(UserId(1), Utc::now() + chrono::Duration::days(7))
            .unwrap();

        assert!(matches!(
            check(&store, UserId(1)).unwrap(),
            Access::Granted {
                subscribed: true,
                ..
            }
        ));
    }

    #[test]
    fn test_expired_subscription_clears_on_read() {
        let store = InMemoryStore::new();
        store.ensure_user(UserId(1)).unwrap();
        store
            .set_subscription(UserId(1), Utc::now() - chrono::Duration::hours(1))
            .unwrap();

        assert!(subscription_expiry(&store, UserId(1)).unwrap().is_none());

        let record = store.get_user(UserId(1)).unwrap().unwrap();
        assert!(!record.subscribed);
        assert!(record.subscription_expires_at.is_none());

        // A second read behaves identically
        assert!(subscription_expiry(&store, UserId(1)).unwrap().is_none());
    }

    #[test]
    fn test_lapsed_subscriber_denial_reason() {
        let store = InMemoryStore::new();
        store.ensure_user(UserId(1)).unwrap();
        for _ in 0..FREE_SEARCH_QUOTA {
            record_search(&store, UserId(1)).unwrap();
        }
        store
            .create_payment_request(PaymentRequest {
                reference: "TXN1".to_string(),
                user: UserId(1),
                status: PaymentStatus::Pending,
                submitted_at: Utc::now(),
            })
            .unwrap();
        store.mark_payment_verified("TXN1").unwrap();
        store
            .set_subscription(UserId(1), Utc::now() - chrono::Duration::hours(1))
            .unwrap();

        assert_eq!(
            check(&store, UserId(1)).unwrap(),
            Access::Denied(DenialReason::SubscriptionLapsed)
        );
    }
}

//! Admin approval pipeline for off-band payments
//!
//! Users self-report a payment reference; the admin approves it by reference
//! id, which grants a time-boxed subscription. References are audit records
//! and move from pending to verified exactly once.

use chrono::{Duration, Utc};

use crate::store::{PaymentRequest, PaymentStatus, Store, StoreResult, UserId};

/// Subscription length granted per verified payment or direct grant
pub const SUBSCRIPTION_DAYS: i64 = 7;

/// Record a user-submitted payment reference as pending.
///
/// Also ensures the requester's user record exists, so a later approval
/// always has a row to flip. A duplicate reference is rejected by the store.
pub fn submit<S: Store>(store: &S, user: UserId, reference: &str) -> StoreResult<()> {
    store.ensure_user(user)?;
    store.create_payment_request(PaymentRequest {
        reference: reference.to_string(),
        user,
        status: PaymentStatus::Pending,
        submitted_at: Utc::now(),
    })
}

/// Approve a pending request by reference id.
///
/// With `expected_user` set, only that user's request matches. Returns the
/// requester id for notification; None means no pending request matched
/// (unknown reference, already verified, or wrong user) and nothing changed.
pub fn approve<S: Store>(
    store: &S,
    reference: &str,
    expected_user: Option<UserId>,
) -> StoreResult<Option<UserId>> {
    let request = match store.find_pending_payment(reference, expected_user)? {
        Some(request) => request,
        None => return Ok(None),
    };

    store.mark_payment_verified(reference)?;
    store.ensure_user(request.user)?;
    store.set_subscription(request.user, Utc::now() + Duration::days(SUBSCRIPTION_DAYS))?;

    Ok(Some(request.user))
}

/// Grant a subscription directly, bypassing the request queue.
///
/// Creates the user record if this id has never interacted before.
pub fn grant<S: Store>(store: &S, user: UserId) -> StoreResult<()> {
    store.ensure_user(user)?;
    store.set_subscription(user, Utc::now() + Duration::days(SUBSCRIPTION_DAYS))
}

/// Pending requests, newest first, for admin review
pub fn pending<S: Store>(store: &S) -> StoreResult<Vec<PaymentRequest>> {
    store.pending_payments()
}

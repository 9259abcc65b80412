//! In-memory storage implementation

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use studydesk_core::{SubjectCode, Unit};

use super::{
    MostAccessed, PaymentRequest, PaymentStatus, ResourceRow, Store, StoreResult, UsageStats,
    UserId, UserRecord,
};
use crate::error::BotError;

/// In-memory store backing tests and ephemeral runs
pub struct InMemoryStore {
    users: RwLock<HashMap<UserId, UserRecord>>,
    resources: RwLock<HashMap<(SubjectCode, Unit), ResourceRow>>,
    payments: RwLock<HashMap<String, PaymentRequest>>,
    access_counts: RwLock<HashMap<SubjectCode, u64>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            resources: RwLock::new(HashMap::new()),
            payments: RwLock::new(HashMap::new()),
            access_counts: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for InMemoryStore {
    fn ensure_user(&self, user: UserId) -> StoreResult<()> {
        self.users.write().unwrap().entry(user).or_insert_with(|| UserRecord {
            id: user,
            search_count: 0,
            subscribed: false,
            subscription_expires_at: None,
            created_at: Utc::now(),
        });
        Ok(())
    }

    fn get_user(&self, user: UserId) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.read().unwrap().get(&user).cloned())
    }

    fn increment_search_count(&self, user: UserId) -> StoreResult<()> {
        let mut users = self.users.write().unwrap();
        if let Some(record) = users.get_mut(&user) {
            record.search_count += 1;
            Ok(())
        } else {
            Err(BotError::UserNotFound)
        }
    }

    fn set_subscription(&self, user: UserId, expires_at: DateTime<Utc>) -> StoreResult<()> {
        let mut users = self.users.write().unwrap();
        if let Some(record) = users.get_mut(&user) {
            record.subscribed = true;
            record.subscription_expires_at = Some(expires_at);
            Ok(())
        } else {
            Err(BotError::UserNotFound)
        }
    }

    fn clear_subscription(&self, user: UserId) -> StoreResult<()> {
        let mut users = self.users.write().unwrap();
        if let Some(record) = users.get_mut(&user) {
            record.subscribed = false;
            record.subscription_expires_at = None;
            Ok(())
        } else {
            Err(BotError::UserNotFound)
        }
    }

    fn get_resource(&self, code: &SubjectCode, unit: Unit) -> StoreResult<Option<ResourceRow>> {
        let resources = self.resources.read().unwrap();
        Ok(resources.get(&(code.clone(), unit)).cloned())
    }

    fn list_resources(&self, code: &SubjectCode) -> StoreResult<Vec<ResourceRow>> {
        let resources = self.resources.read().unwrap();
        let mut rows: Vec<ResourceRow> = resources
            .values()
            .filter(|row| &row.code == code)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.unit);
        Ok(rows)
    }

    fn put_resource(&self, row: &ResourceRow) -> StoreResult<()> {
        self.resources
            .write()
            .unwrap()
            .insert((row.code.clone(), row.unit), row.clone());
        Ok(())
    }

    fn delete_resource(&self, code: &SubjectCode, unit: Unit) -> StoreResult<()> {
        self.resources.write().unwrap().remove(&(code.clone(), unit));
        Ok(())
    }

    fn delete_subject(&self, code: &SubjectCode) -> StoreResult<u64> {
        let mut resources = self.resources.write().unwrap();
        let before = resources.len();
        resources.retain(|(c, _), _| c != code);
        Ok((before - resources.len()) as u64)
    }

    fn create_payment_request(&self, request: PaymentRequest) -> StoreResult<()> {
        let mut payments = self.payments.write().unwrap();
        if payments.contains_key(&request.reference) {
            return Err(BotError::DuplicateReference(request.reference));
        }
        payments.insert(request.reference.clone(), request);
        Ok(())
    }

    fn find_pending_payment(
        &self,
        reference: &str,
        requester: Option<UserId>,
    ) -> StoreResult<Option<PaymentRequest>> {
        let payments = self.payments.read().unwrap();
        Ok(payments
            .get(reference)
            .filter(|req| req.status == PaymentStatus::Pending)
            .filter(|req| requester.map_or(true, |user| req.user == user))
            .cloned())
    }

    fn mark_payment_verified(&self, reference: &str) -> StoreResult<()> {
        let mut payments = self.payments.write().unwrap();
        if let Some(request) = payments.get_mut(reference) {
            request.status = PaymentStatus::Verified;
            Ok(())
        } else {
            Err(BotError::ReferenceNotFound)
        }
    }

    fn pending_payments(&self) -> StoreResult<Vec<PaymentRequest>> {
        let payments = self.payments.read().unwrap();
        let mut pending: Vec<PaymentRequest> = payments
            .values()
            .filter(|req| req.status == PaymentStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|req| Reverse(req.submitted_at));
        Ok(pending)
    }

    fn has_verified_payment(&self, user: UserId) -> StoreResult<bool> {
        let payments = self.payments.read().unwrap();
        Ok(payments
            .values()
            .any(|req| req.user == user && req.status == PaymentStatus::Verified))
    }

    fn increment_subject_access(&self, code: &SubjectCode) -> StoreResult<()> {
        let mut counts = self.access_counts.write().unwrap();
        *counts.entry(code.clone()).or_insert(0) += 1;
        Ok(())
    }

    fn most_accessed_subject(&self) -> StoreResult<Option<(SubjectCode, u64)>> {
        let counts = self.access_counts.read().unwrap();
        // Ties break toward the alphabetically first code, same as the SQL
        // backend's ordering
        Ok(counts
            .iter()
            .max_by_key(|(code, count)| (**count, Reverse(*code)))
            .map(|(code, count)| (code.clone(), *count)))
    }

    fn usage_stats(&self) -> StoreResult<UsageStats> {
        let users = self.users.read().unwrap();
        let resources = self.resources.read().unwrap();
        let payments = self.payments.read().unwrap();

        let now = Utc::now();
        let active_subscribers = users
            .values()
            .filter(|u| u.subscribed && u.subscription_expires_at.is_some_and(|exp| exp > now))
            .count() as u64;

        let subjects: HashSet<&SubjectCode> = resources.keys().map(|(code, _)| code).collect();

        Ok(UsageStats {
            total_users: users.len() as u64,
            active_subscribers,
            verified_payments: payments
                .values()
                .filter(|req| req.status == PaymentStatus::Verified)
                .count() as u64,
            pending_payments: payments
                .values()
                .filter(|req| req.status == PaymentStatus::Pending)
                .count() as u64,
            resource_rows: resources.len() as u64,
            subject_count: subjects.len() as u64,
            most_accessed: self
                .most_accessed_subject()?
                .map(|(code, count)| MostAccessed {
                    code: code.as_str().to_string(),
                    count,
                }),
        })
    }
}

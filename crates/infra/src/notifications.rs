//! Expiry notifications.
//!
//! The notifier only produces "license about to expire" facts and hands them
//! to a [`NotificationSink`]; how they reach people (mail, chat, ...) is the
//! sink's business.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use licensedesk_core::LicenseId;
use licensedesk_inventory::{License, User, days_remaining};

use crate::medium::PersistenceMedium;
use crate::store::{EntityStore, StoreResult};

pub const DEFAULT_NOTICE_WINDOW_DAYS: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryNotice {
    pub license_id: LicenseId,
    pub name: String,
    pub vendor: String,
    pub expiry_date: NaiveDate,
    pub days_remaining: i64,
    /// Emails of the users currently holding the license.
    pub recipients: Vec<String>,
}

/// Notices for every license expiring within `window_days` (inclusive), soonest first.
pub fn expiry_notices(
    licenses: &[License],
    users: &[User],
    now: DateTime<Utc>,
    window_days: i64,
) -> Vec<ExpiryNotice> {
    let mut notices: Vec<ExpiryNotice> = licenses
        .iter()
        .filter_map(|license| {
            let days = days_remaining(license.expiry_date, now);
            if !(0..=window_days).contains(&days) {
                return None;
            }
            let recipients = users
                .iter()
                .filter(|u| u.holds(&license.id))
                .map(|u| u.email.clone())
                .collect();
            Some(ExpiryNotice {
                license_id: license.id.clone(),
                name: license.name.clone(),
                vendor: license.vendor.clone(),
                expiry_date: license.expiry_date,
                days_remaining: days,
                recipients,
            })
        })
        .collect();
    notices.sort_by_key(|n| n.expiry_date);
    notices
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("notification delivery failed: {0}")]
pub struct SinkError(pub String);

/// Destination for expiry notices.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notice: &ExpiryNotice) -> Result<(), SinkError>;
}

impl<S> NotificationSink for Arc<S>
where
    S: NotificationSink + ?Sized,
{
    fn deliver(&self, notice: &ExpiryNotice) -> Result<(), SinkError> {
        (**self).deliver(notice)
    }
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySink {
    inner: Mutex<Vec<ExpiryNotice>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<ExpiryNotice> {
        self.inner
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for InMemorySink {
    fn deliver(&self, notice: &ExpiryNotice) -> Result<(), SinkError> {
        self.inner
            .lock()
            .map_err(|_| SinkError("lock poisoned".to_string()))?
            .push(notice.clone());
        Ok(())
    }
}

/// Sink that emits each notice as a structured log event.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&self, notice: &ExpiryNotice) -> Result<(), SinkError> {
        info!(
            license_id = %notice.license_id,
            license = %notice.name,
            vendor = %notice.vendor,
            expiry_date = %notice.expiry_date,
            days_remaining = notice.days_remaining,
            recipients = ?notice.recipients,
            "license expiring soon"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub delivered: usize,
    pub failed: usize,
    pub notices: Vec<ExpiryNotice>,
}

pub struct ExpiryNotifier<M> {
    store: Arc<EntityStore<M>>,
    window_days: i64,
}

impl<M> ExpiryNotifier<M>
where
    M: PersistenceMedium,
{
    pub fn new(store: Arc<EntityStore<M>>) -> Self {
        Self {
            store,
            window_days: DEFAULT_NOTICE_WINDOW_DAYS,
        }
    }

    pub fn with_window_days(mut self, days: i64) -> Self {
        self.window_days = days;
        self
    }

    pub fn scan(&self, now: DateTime<Utc>) -> StoreResult<Vec<ExpiryNotice>> {
        let licenses = self.store.read_all_licenses()?;
        let users = self.store.read_all_users()?;
        Ok(expiry_notices(&licenses, &users, now, self.window_days))
    }

    /// Scan and hand every notice to `sink`. A failed delivery is counted and
    /// the batch continues.
    pub fn dispatch(&self, sink: &dyn NotificationSink, now: DateTime<Utc>) -> StoreResult<DispatchSummary> {
        let notices = self.scan(now)?;
        let mut summary = DispatchSummary::default();

        for notice in &notices {
            match sink.deliver(notice) {
                Ok(()) => summary.delivered += 1,
                Err(e) => {
                    warn!(license_id = %notice.license_id, error = %e, "expiry notice not delivered");
                    summary.failed += 1;
                }
            }
        }

        info!(
            delivered = summary.delivered,
            failed = summary.failed,
            "expiry notices dispatched"
        );
        summary.notices = notices;
        Ok(summary)
    }
}

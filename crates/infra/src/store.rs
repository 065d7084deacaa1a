//! Entity store: the sole holder of the license and user collections.
//!
//! Every mutation is a read-modify-write of a whole collection snapshot; there
//! are no partial updates. Reads of a key that was never written seed it from
//! the built-in dataset first.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use licensedesk_core::{DocumentId, LicenseId, UserId, position_of};
use licensedesk_inventory::seed::{seed_licenses, seed_users};
use licensedesk_inventory::{License, User};

use crate::medium::{MediumError, PersistenceMedium};

pub const LICENSES_KEY: &str = "licenses";
pub const USERS_KEY: &str = "users";

/// Payloads longer than this are replaced before the first write attempt.
pub const DEFAULT_MAX_PAYLOAD_CHARS: usize = 1024 * 1024;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Even with every document payload degraded, the snapshot does not fit.
    #[error("snapshot of {required} chars exceeds storage capacity of {capacity} chars")]
    CapacityExceeded { required: usize, capacity: usize },

    #[error("persistence unavailable: {0}")]
    Unavailable(String),

    #[error("persisted '{key}' snapshot is corrupt: {reason}")]
    Corrupt { key: &'static str, reason: String },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(String),
}

impl From<MediumError> for StoreError {
    fn from(value: MediumError) -> Self {
        match value {
            MediumError::CapacityExceeded { required, capacity } => {
                StoreError::CapacityExceeded { required, capacity }
            }
            MediumError::Unavailable(msg) => StoreError::Unavailable(msg),
        }
    }
}

/// A document whose payload was swapped for a size marker during a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DegradedDocument {
    pub license_id: LicenseId,
    pub document_id: DocumentId,
    pub document_name: String,
    pub original_len: usize,
}

/// Outcome of a license snapshot write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteReport {
    pub chars_written: usize,
    pub degraded: Vec<DegradedDocument>,
}

impl WriteReport {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

pub struct EntityStore<M> {
    medium: M,
    max_payload_chars: usize,
}

impl<M> EntityStore<M>
where
    M: PersistenceMedium,
{
    pub fn new(medium: M) -> Self {
        Self {
            medium,
            max_payload_chars: DEFAULT_MAX_PAYLOAD_CHARS,
        }
    }

    pub fn with_max_payload_chars(mut self, max: usize) -> Self {
        self.max_payload_chars = max;
        self
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    // ── Licenses ────────────────────────────────────────────────────────────

    pub fn read_all_licenses(&self) -> StoreResult<Vec<License>> {
        if let Some(licenses) = self.read_snapshot(LICENSES_KEY)? {
            return Ok(licenses);
        }

        let seed = seed_licenses();
        info!(count = seed.len(), "no license snapshot found; seeding built-in dataset");
        self.write_all_licenses(&seed)?;
        Ok(seed)
    }

    /// Persist the full license collection.
    ///
    /// Oversized document payloads are replaced with placeholders instead of
    /// failing the write; each replacement is listed in the returned report.
    pub fn write_all_licenses(&self, licenses: &[License]) -> StoreResult<WriteReport> {
        let mut snapshot = licenses.to_vec();
        let mut degraded = Vec::new();

        for license in &mut snapshot {
            let license_id = license.id.clone();
            for doc in license.documents.iter_mut() {
                if doc.payload_len().is_some_and(|len| len > self.max_payload_chars) {
                    record_degradation(&license_id, doc, &mut degraded);
                }
            }
        }

        loop {
            let json = serde_json::to_string(&snapshot)
                .map_err(|e| StoreError::Serialize(e.to_string()))?;
            let chars_written = json.len();

            match self.medium.set(LICENSES_KEY, json) {
                Ok(()) => {
                    if !degraded.is_empty() {
                        warn!(
                            degraded = degraded.len(),
                            "some document payloads were too large to persist and were replaced"
                        );
                    }
                    debug!(chars = chars_written, licenses = snapshot.len(), "license snapshot written");
                    return Ok(WriteReport {
                        chars_written,
                        degraded,
                    });
                }
                Err(MediumError::CapacityExceeded { required, capacity }) => {
                    let Some((li, di)) = largest_payload(&snapshot) else {
                        error!(required, capacity, "license snapshot exceeds storage capacity");
                        return Err(StoreError::CapacityExceeded { required, capacity });
                    };
                    let license_id = snapshot[li].id.clone();
                    record_degradation(&license_id, &mut snapshot[li].documents[di], &mut degraded);
                }
                Err(e) => {
                    error!(error = %e, "failed to write license snapshot");
                    return Err(e.into());
                }
            }
        }
    }

    /// Prepend a license (newest first).
    pub fn add_license(&self, license: License) -> StoreResult<WriteReport> {
        let mut licenses = self.read_all_licenses()?;
        licenses.insert(0, license);
        self.write_all_licenses(&licenses)
    }

    /// Replace the license with the same id; `false` when it does not exist.
    pub fn update_license(&self, license: License) -> StoreResult<bool> {
        let mut licenses = self.read_all_licenses()?;
        let Some(index) = position_of(&licenses, &license.id) else {
            debug!(license_id = %license.id, "update of unknown license ignored");
            return Ok(false);
        };
        licenses[index] = license;
        self.write_all_licenses(&licenses)?;
        Ok(true)
    }

    pub fn delete_license(&self, id: &LicenseId) -> StoreResult<bool> {
        let mut licenses = self.read_all_licenses()?;
        let before = licenses.len();
        licenses.retain(|l| &l.id != id);
        if licenses.len() == before {
            debug!(license_id = %id, "delete of unknown license ignored");
            return Ok(false);
        }
        self.write_all_licenses(&licenses)?;
        Ok(true)
    }

    // ── Users ───────────────────────────────────────────────────────────────

    pub fn read_all_users(&self) -> StoreResult<Vec<User>> {
        if let Some(users) = self.read_snapshot(USERS_KEY)? {
            return Ok(users);
        }

        let seed = seed_users();
        info!(count = seed.len(), "no user snapshot found; seeding built-in dataset");
        self.write_all_users(&seed)?;
        Ok(seed)
    }

    pub fn write_all_users(&self, users: &[User]) -> StoreResult<()> {
        let json = serde_json::to_string(users).map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.medium.set(USERS_KEY, json).map_err(|e| {
            error!(error = %e, "failed to write user snapshot");
            StoreError::from(e)
        })
    }

    pub fn add_user(&self, user: User) -> StoreResult<()> {
        let mut users = self.read_all_users()?;
        users.push(user);
        self.write_all_users(&users)
    }

    pub fn update_user(&self, user: User) -> StoreResult<bool> {
        let mut users = self.read_all_users()?;
        let Some(index) = position_of(&users, &user.id) else {
            debug!(user_id = %user.id, "update of unknown user ignored");
            return Ok(false);
        };
        users[index] = user;
        self.write_all_users(&users)?;
        Ok(true)
    }

    pub fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        let mut users = self.read_all_users()?;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            debug!(user_id = %id, "delete of unknown user ignored");
            return Ok(false);
        }
        self.write_all_users(&users)?;
        Ok(true)
    }

    fn read_snapshot<T: DeserializeOwned>(&self, key: &'static str) -> StoreResult<Option<Vec<T>>> {
        let Some(raw) = self.medium.get(key)? else {
            return Ok(None);
        };
        let items = serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            key,
            reason: e.to_string(),
        })?;
        Ok(Some(items))
    }
}

fn record_degradation(
    license_id: &LicenseId,
    doc: &mut licensedesk_inventory::Document,
    degraded: &mut Vec<DegradedDocument>,
) {
    if let Some(original_len) = doc.degrade_payload() {
        warn!(
            license_id = %license_id,
            document = %doc.name,
            original_len,
            "document payload replaced with placeholder"
        );
        degraded.push(DegradedDocument {
            license_id: license_id.clone(),
            document_id: doc.id.clone(),
            document_name: doc.name.clone(),
            original_len,
        });
    }
}

/// Position of the largest remaining real payload (first wins on ties).
fn largest_payload(licenses: &[License]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, usize)> = None;
    for (li, license) in licenses.iter().enumerate() {
        for (di, doc) in license.documents.iter().enumerate() {
            if let Some(len) = doc.payload_len() {
                if best.is_none_or(|(_, _, b)| len > b) {
                    best = Some((li, di, len));
                }
            }
        }
    }
    best.map(|(li, di, _)| (li, di))
}

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use licensedesk_core::{DocumentId, DomainError, DomainResult, Entity, LicenseId};

use crate::document::Document;
use crate::status::LicenseStatus;

/// Commercial model of a license.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LicenseType {
    Subscription,
    Perpetual,
    #[serde(rename = "User-based")]
    UserBased,
    #[serde(rename = "Device-based")]
    DeviceBased,
}

impl LicenseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseType::Subscription => "Subscription",
            LicenseType::Perpetual => "Perpetual",
            LicenseType::UserBased => "User-based",
            LicenseType::DeviceBased => "Device-based",
        }
    }
}

/// A tracked software license.
///
/// `used_seats` and `status` are derived: they are only written at creation
/// (provisional values) and by seat reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub id: LicenseId,
    pub name: String,
    pub vendor: String,
    #[serde(rename = "type")]
    pub license_type: LicenseType,
    /// Seat capacity.
    pub seats: u32,
    used_seats: u32,
    /// Annual cost.
    pub cost: f64,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    status: LicenseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<NaiveDate>,
    pub department: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<Document>,
}

impl Entity for License {
    type Id = LicenseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a license.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLicense {
    pub name: String,
    pub vendor: String,
    #[serde(rename = "type")]
    pub license_type: LicenseType,
    pub seats: u32,
    pub cost: f64,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    pub department: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial edit of the user-editable attributes of a license.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseEdit {
    pub name: Option<String>,
    pub vendor: Option<String>,
    #[serde(rename = "type")]
    pub license_type: Option<LicenseType>,
    pub seats: Option<u32>,
    pub cost: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub last_used: Option<NaiveDate>,
    pub department: Option<String>,
    pub tags: Option<Vec<String>>,
}

fn normalize_tags(tags: impl IntoIterator<Item = String>) -> BTreeSet<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

impl License {
    /// Create a license from user input.
    ///
    /// Used seats start at zero and status is provisionally `active` until the
    /// next reconciliation. Dates default to `today` and one year after start.
    pub fn create(id: LicenseId, input: NewLicense, today: NaiveDate) -> DomainResult<Self> {
        let start_date = input.start_date.unwrap_or(today);
        let expiry_date = input
            .expiry_date
            .unwrap_or_else(|| start_date + Duration::days(365));

        let license = Self {
            id,
            name: input.name.trim().to_string(),
            vendor: input.vendor.trim().to_string(),
            license_type: input.license_type,
            seats: input.seats,
            used_seats: 0,
            cost: input.cost,
            start_date,
            expiry_date,
            status: LicenseStatus::Active,
            last_used: None,
            department: input.department.trim().to_string(),
            tags: normalize_tags(input.tags),
            documents: Vec::new(),
        };
        license.validate()?;
        Ok(license)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.vendor.trim().is_empty() {
            return Err(DomainError::validation("vendor cannot be empty"));
        }
        if self.department.trim().is_empty() {
            return Err(DomainError::validation("department cannot be empty"));
        }
        if !(self.cost.is_finite() && self.cost >= 0.0) {
            return Err(DomainError::validation("cost must be a finite non-negative number"));
        }
        if self.expiry_date < self.start_date {
            return Err(DomainError::validation("expiry date cannot precede start date"));
        }
        Ok(())
    }

    /// Apply an edit; on validation failure the license is left unchanged.
    pub fn apply_edit(&mut self, edit: LicenseEdit) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(name) = edit.name {
            next.name = name.trim().to_string();
        }
        if let Some(vendor) = edit.vendor {
            next.vendor = vendor.trim().to_string();
        }
        if let Some(t) = edit.license_type {
            next.license_type = t;
        }
        if let Some(seats) = edit.seats {
            next.seats = seats;
        }
        if let Some(cost) = edit.cost {
            next.cost = cost;
        }
        if let Some(start) = edit.start_date {
            next.start_date = start;
        }
        if let Some(expiry) = edit.expiry_date {
            next.expiry_date = expiry;
        }
        if let Some(last_used) = edit.last_used {
            next.last_used = Some(last_used);
        }
        if let Some(department) = edit.department {
            next.department = department.trim().to_string();
        }
        if let Some(tags) = edit.tags {
            next.tags = normalize_tags(tags);
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn used_seats(&self) -> u32 {
        self.used_seats
    }

    pub fn status(&self) -> LicenseStatus {
        self.status
    }

    pub fn available_seats(&self) -> u32 {
        self.seats.saturating_sub(self.used_seats)
    }

    /// More seats assigned than purchased (tolerated, but worth flagging).
    pub fn is_over_allocated(&self) -> bool {
        self.used_seats > self.seats
    }

    pub(crate) fn set_derived(&mut self, used_seats: u32, status: LicenseStatus) {
        self.used_seats = used_seats;
        self.status = status;
    }

    pub fn document(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| &d.id == id)
    }

    /// Remove a document; returns whether one was removed.
    pub fn remove_document(&mut self, id: &DocumentId) -> bool {
        let before = self.documents.len();
        self.documents.retain(|d| &d.id != id);
        self.documents.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn new_license() -> NewLicense {
        NewLicense {
            name: " Jira ".to_string(),
            vendor: "Atlassian".to_string(),
            license_type: LicenseType::UserBased,
            seats: 10,
            cost: 1200.0,
            start_date: None,
            expiry_date: None,
            department: "Engineering".to_string(),
            tags: vec!["pm".to_string(), " ".to_string(), "pm".to_string()],
        }
    }

    #[test]
    fn create_initializes_derived_fields_and_defaults() {
        let license = License::create(LicenseId::new("l1"), new_license(), today()).unwrap();
        assert_eq!(license.name, "Jira");
        assert_eq!(license.used_seats(), 0);
        assert_eq!(license.status(), LicenseStatus::Active);
        assert_eq!(license.start_date, today());
        assert_eq!(license.expiry_date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(license.tags.len(), 1);
    }

    #[test]
    fn create_rejects_blank_vendor_and_negative_cost() {
        let mut input = new_license();
        input.vendor = "  ".to_string();
        assert!(License::create(LicenseId::new("l1"), input, today()).is_err());

        let mut input = new_license();
        input.cost = -1.0;
        assert!(License::create(LicenseId::new("l1"), input, today()).is_err());
    }

    #[test]
    fn failed_edit_leaves_license_untouched() {
        let mut license = License::create(LicenseId::new("l1"), new_license(), today()).unwrap();
        let before = license.clone();
        let err = license.apply_edit(LicenseEdit {
            name: Some("Renamed".to_string()),
            cost: Some(f64::NAN),
            ..LicenseEdit::default()
        });
        assert!(err.is_err());
        assert_eq!(license, before);
    }

    #[test]
    fn serializes_with_persisted_field_names() {
        let license = License::create(LicenseId::new("l1"), new_license(), today()).unwrap();
        let json = serde_json::to_value(&license).unwrap();
        assert_eq!(json["type"], "User-based");
        assert_eq!(json["usedSeats"], 0);
        assert_eq!(json["status"], "active");
        assert_eq!(json["expiryDate"], "2024-12-31");
        assert!(json.get("documents").is_none());
    }
}

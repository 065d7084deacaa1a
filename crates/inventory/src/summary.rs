//! Dashboard read models computed from a license snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use licensedesk_core::LicenseId;

use crate::license::License;
use crate::status::{LicenseStatus, days_remaining, days_remaining_floor};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseSummary {
    pub total: usize,
    pub active: usize,
    pub expiring: usize,
    pub expired: usize,
    pub total_cost: f64,
    pub total_seats: u64,
    pub used_seats: u64,
    /// Rounded percentage of seats in use (0 when no seats exist).
    pub utilization_percent: u32,
}

impl LicenseSummary {
    pub fn from_licenses(licenses: &[License]) -> Self {
        let mut summary = Self {
            total: licenses.len(),
            ..Self::default()
        };

        for license in licenses {
            match license.status() {
                LicenseStatus::Active => summary.active += 1,
                LicenseStatus::Expiring => summary.expiring += 1,
                LicenseStatus::Expired => summary.expired += 1,
            }
            summary.total_cost += license.cost;
            summary.total_seats += u64::from(license.seats);
            summary.used_seats += u64::from(license.used_seats());
        }

        if summary.total_seats > 0 {
            let pct = summary.used_seats as f64 * 100.0 / summary.total_seats as f64;
            summary.utilization_percent = pct.round() as u32;
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentCost {
    pub department: String,
    pub cost: f64,
}

/// Annual cost per department, ordered by department name.
pub fn department_costs(licenses: &[License]) -> Vec<DepartmentCost> {
    let mut by_department: BTreeMap<&str, f64> = BTreeMap::new();
    for license in licenses {
        *by_department.entry(license.department.as_str()).or_default() += license.cost;
    }
    by_department
        .into_iter()
        .map(|(department, cost)| DepartmentCost {
            department: department.to_string(),
            cost,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Renewal {
    pub license_id: LicenseId,
    pub name: String,
    pub vendor: String,
    pub expiry_date: NaiveDate,
    pub days_remaining: i64,
    pub cost: f64,
}

/// Licenses coming up for renewal within `horizon_days`, soonest first.
pub fn upcoming_renewals(
    licenses: &[License],
    now: DateTime<Utc>,
    horizon_days: i64,
    limit: usize,
) -> Vec<Renewal> {
    let mut due: Vec<&License> = licenses
        .iter()
        .filter(|l| {
            let days = days_remaining_floor(l.expiry_date, now);
            (0..=horizon_days).contains(&days)
        })
        .collect();
    due.sort_by_key(|l| l.expiry_date);

    due.into_iter()
        .take(limit)
        .map(|l| Renewal {
            license_id: l.id.clone(),
            name: l.name.clone(),
            vendor: l.vendor.clone(),
            expiry_date: l.expiry_date,
            days_remaining: days_remaining(l.expiry_date, now),
            cost: l.cost,
        })
        .collect()
}

/// Case-insensitive match on name, vendor, department and type.
pub fn search<'a>(licenses: &'a [License], query: &str) -> Vec<&'a License> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return licenses.iter().collect();
    }
    licenses
        .iter()
        .filter(|l| {
            l.name.to_lowercase().contains(&query)
                || l.vendor.to_lowercase().contains(&query)
                || l.department.to_lowercase().contains(&query)
                || l.license_type.as_str().to_lowercase().contains(&query)
        })
        .collect()
}

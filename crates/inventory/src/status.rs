//! Status derivation from expiry date and "now".

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Derived lifecycle status of a license.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    Active,
    Expiring,
    Expired,
}

impl LicenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseStatus::Active => "active",
            LicenseStatus::Expiring => "expiring",
            LicenseStatus::Expired => "expired",
        }
    }
}

impl core::fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole days from `now` until the start of `expiry` (UTC), rounded up.
///
/// A license expiring later today yields 0; one that expired at the start of
/// yesterday yields -1.
pub fn days_remaining(expiry: NaiveDate, now: DateTime<Utc>) -> i64 {
    let expiry_at = expiry.and_time(NaiveTime::MIN).and_utc();
    let diff_ms = (expiry_at - now).num_milliseconds();
    // ceil(diff / day) for a positive divisor.
    -((-diff_ms).div_euclid(MILLIS_PER_DAY))
}

/// Whole days until expiry, rounded down (used for renewal horizons).
pub fn days_remaining_floor(expiry: NaiveDate, now: DateTime<Utc>) -> i64 {
    let expiry_at = expiry.and_time(NaiveTime::MIN).and_utc();
    (expiry_at - now).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Thresholds for classifying a license by days remaining.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StatusPolicy {
    /// Inclusive upper bound of the "expiring" band.
    pub expiring_window_days: i64,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self {
            expiring_window_days: 30,
        }
    }
}

impl StatusPolicy {
    pub fn new(expiring_window_days: i64) -> Self {
        Self {
            expiring_window_days,
        }
    }

    pub fn classify(&self, days_remaining: i64) -> LicenseStatus {
        if days_remaining < 0 {
            LicenseStatus::Expired
        } else if days_remaining <= self.expiring_window_days {
            LicenseStatus::Expiring
        } else {
            LicenseStatus::Active
        }
    }

    /// Pure status function for a given expiry and "now".
    pub fn status_for(&self, expiry: NaiveDate, now: DateTime<Utc>) -> LicenseStatus {
        self.classify(days_remaining(expiry, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn jan_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn expiry_today_is_expiring_not_expired() {
        let policy = StatusPolicy::default();
        assert_eq!(days_remaining(d(2024, 1, 1), jan_first()), 0);
        assert_eq!(policy.status_for(d(2024, 1, 1), jan_first()), LicenseStatus::Expiring);
    }

    #[test]
    fn yesterday_is_expired() {
        assert_eq!(days_remaining(d(2023, 12, 31), jan_first()), -1);
        assert_eq!(
            StatusPolicy::default().status_for(d(2023, 12, 31), jan_first()),
            LicenseStatus::Expired
        );
    }

    #[test]
    fn forty_five_days_out_is_active() {
        assert_eq!(days_remaining(d(2024, 2, 15), jan_first()), 45);
        assert_eq!(
            StatusPolicy::default().status_for(d(2024, 2, 15), jan_first()),
            LicenseStatus::Active
        );
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let policy = StatusPolicy::default();
        assert_eq!(policy.classify(30), LicenseStatus::Expiring);
        assert_eq!(policy.classify(31), LicenseStatus::Active);
    }

    #[test]
    fn partial_days_round_up() {
        // Noon on Dec 31st: expiry at midnight Jan 1st is half a day away.
        let noon = Utc.with_ymd_and_hms(2023, 12, 31, 12, 0, 0).unwrap();
        assert_eq!(days_remaining(d(2024, 1, 1), noon), 1);
        assert_eq!(days_remaining_floor(d(2024, 1, 1), noon), 0);
        // Noon on Jan 1st: expiry already passed by half a day, still day 0.
        let later = noon + Duration::days(1);
        assert_eq!(days_remaining(d(2024, 1, 1), later), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: pushing expiry later never makes a license "more expired".
        #[test]
        fn status_is_monotonic_in_expiry(offset in -400i64..400, extra in 0i64..400) {
            let policy = StatusPolicy::default();
            let now = jan_first();
            let base = now.date_naive() + Duration::days(offset);
            let later = base + Duration::days(extra);

            let rank = |s: LicenseStatus| match s {
                LicenseStatus::Expired => 0,
                LicenseStatus::Expiring => 1,
                LicenseStatus::Active => 2,
            };

            prop_assert!(rank(policy.status_for(base, now)) <= rank(policy.status_for(later, now)));
            prop_assert_eq!(days_remaining(base, now), offset);
        }
    }
}

//! Seat reconciliation rules.
//!
//! Derived license fields are recomputed from scratch on every pass:
//! used seats from the user→license assignment graph, status from expiry and
//! "now". Running the pass twice with the same inputs yields the same output.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use licensedesk_core::{LicenseId, UserId};

use crate::license::License;
use crate::status::StatusPolicy;
use crate::user::User;

/// An assignment whose license id resolves to nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingAssignment {
    pub user_id: UserId,
    pub license_id: LicenseId,
}

/// What a reconciliation pass counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatTally {
    /// Assignment records that resolved to a license.
    pub counted: usize,
    /// Stale references that were skipped.
    pub dangling: Vec<DanglingAssignment>,
}

/// Recompute `used_seats` and `status` for every license in place.
pub fn reconcile_seats(
    licenses: &mut [License],
    users: &[User],
    now: DateTime<Utc>,
    policy: StatusPolicy,
) -> SeatTally {
    // First occurrence wins if ids are duplicated.
    let mut index: HashMap<LicenseId, usize> = HashMap::with_capacity(licenses.len());
    for (i, license) in licenses.iter().enumerate() {
        index.entry(license.id.clone()).or_insert(i);
    }

    let mut counts = vec![0u32; licenses.len()];
    let mut tally = SeatTally::default();

    for user in users {
        for assignment in user.assignments() {
            match index.get(&assignment.id) {
                Some(&i) => {
                    counts[i] = counts[i].saturating_add(1);
                    tally.counted += 1;
                }
                None => tally.dangling.push(DanglingAssignment {
                    user_id: user.id,
                    license_id: assignment.id.clone(),
                }),
            }
        }
    }

    for (license, used) in licenses.iter_mut().zip(counts) {
        let status = policy.status_for(license.expiry_date, now);
        license.set_derived(used, status);
    }

    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::{LicenseType, NewLicense};
    use crate::status::LicenseStatus;
    use crate::user::{Assignment, NewUser};
    use chrono::{Duration, NaiveDate, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn license(id: &str, expiry_offset_days: i64) -> License {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        License::create(
            LicenseId::new(id),
            NewLicense {
                name: format!("License {id}"),
                vendor: "Vendor".to_string(),
                license_type: LicenseType::Subscription,
                seats: 3,
                cost: 100.0,
                start_date: Some(today - Duration::days(400)),
                expiry_date: Some(today + Duration::days(expiry_offset_days)),
                department: "IT".to_string(),
                tags: vec![],
            },
            today,
        )
        .unwrap()
    }

    fn user(id: u64, holds: &[&License]) -> User {
        User::create(
            UserId::new(id),
            NewUser {
                name: format!("User {id}"),
                email: format!("user{id}@example.com"),
                department: "IT".to_string(),
            },
        )
        .unwrap()
        .with_assignments(holds.iter().map(|l| Assignment::snapshot(l)).collect())
    }

    fn dangling_user(id: u64, license_id: &str) -> User {
        user(id, &[]).with_assignments(vec![Assignment {
            id: LicenseId::new(license_id),
            name: "Gone".to_string(),
            status: LicenseStatus::Active,
        }])
    }

    #[test]
    fn counts_assignments_and_skips_dangling_references() {
        let a = license("a", 100);
        let b = license("b", 100);
        let users = vec![user(1, &[&a, &b]), user(2, &[&a]), dangling_user(3, "zzz")];
        let mut licenses = vec![a, b];

        let tally = reconcile_seats(&mut licenses, &users, now(), StatusPolicy::default());

        assert_eq!(licenses[0].used_seats(), 2);
        assert_eq!(licenses[1].used_seats(), 1);
        assert_eq!(tally.counted, 3);
        assert_eq!(
            tally.dangling,
            vec![DanglingAssignment {
                user_id: UserId::new(3),
                license_id: LicenseId::new("zzz")
            }]
        );
    }

    #[test]
    fn status_overrides_previous_value() {
        let mut licenses = vec![license("old", -10), license("soon", 10), license("far", 90)];
        reconcile_seats(&mut licenses, &[], now(), StatusPolicy::default());

        let statuses: Vec<_> = licenses.iter().map(|l| l.status()).collect();
        assert_eq!(
            statuses,
            vec![LicenseStatus::Expired, LicenseStatus::Expiring, LicenseStatus::Active]
        );
        assert!(licenses.iter().all(|l| l.used_seats() == 0));
    }

    #[test]
    fn over_allocation_is_counted_not_capped() {
        let a = license("a", 100);
        let users: Vec<User> = (1..=5).map(|i| user(i, &[&a])).collect();
        let mut licenses = vec![a];

        reconcile_seats(&mut licenses, &users, now(), StatusPolicy::default());

        assert_eq!(licenses[0].used_seats(), 5);
        assert!(licenses[0].is_over_allocated());
        assert_eq!(licenses[0].available_seats(), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: after a pass, every license's used seats equal the number of
        /// assignment records pointing at it, and a second pass changes nothing.
        #[test]
        fn used_seats_match_assignment_graph(
            graph in prop::collection::vec(prop::collection::vec(0usize..8, 0..6), 0..12)
        ) {
            let pool: Vec<License> = (0..6).map(|i| license(&i.to_string(), i as i64 * 20 - 40)).collect();

            // Indices >= pool.len() become dangling references.
            let users: Vec<User> = graph
                .iter()
                .enumerate()
                .map(|(u, picks)| {
                    let assignments = picks
                        .iter()
                        .map(|&p| Assignment {
                            id: LicenseId::new(p.to_string()),
                            name: String::new(),
                            status: LicenseStatus::Active,
                        })
                        .collect();
                    user(u as u64 + 1, &[]).with_assignments(assignments)
                })
                .collect();

            let mut licenses = pool.clone();
            let tally = reconcile_seats(&mut licenses, &users, now(), StatusPolicy::default());

            for l in &licenses {
                let expected = users
                    .iter()
                    .flat_map(|u| u.assignments())
                    .filter(|a| a.id == l.id)
                    .count() as u32;
                prop_assert_eq!(l.used_seats(), expected);
            }
            let total: usize = graph.iter().map(|p| p.len()).sum();
            prop_assert_eq!(tally.counted + tally.dangling.len(), total);

            let first = licenses.clone();
            reconcile_seats(&mut licenses, &users, now(), StatusPolicy::default());
            prop_assert_eq!(first, licenses);
        }
    }
}

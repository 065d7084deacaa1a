//! Built-in dataset used to seed an empty store.
//!
//! Stored `usedSeats`/`status` values are historical figures; the first
//! reconciliation pass replaces them.

use chrono::NaiveDate;

use licensedesk_core::{LicenseId, UserId};

use crate::license::{License, LicenseType, NewLicense};
use crate::status::LicenseStatus;
use crate::user::{Assignment, NewUser, User};

struct SeedLicense {
    id: &'static str,
    name: &'static str,
    vendor: &'static str,
    license_type: LicenseType,
    seats: u32,
    used_seats: u32,
    cost: f64,
    start: (i32, u32, u32),
    expiry: (i32, u32, u32),
    status: LicenseStatus,
    last_used: (i32, u32, u32),
    department: &'static str,
    tags: &'static [&'static str],
}

const LICENSES: &[SeedLicense] = &[
    SeedLicense {
        id: "1",
        name: "Adobe Creative Cloud",
        vendor: "Adobe",
        license_type: LicenseType::Subscription,
        seats: 50,
        used_seats: 42,
        cost: 29999.0,
        start: (2023, 6, 15),
        expiry: (2024, 6, 15),
        status: LicenseStatus::Active,
        last_used: (2024, 4, 22),
        department: "Design",
        tags: &["design", "creative", "essential"],
    },
    SeedLicense {
        id: "2",
        name: "Microsoft 365",
        vendor: "Microsoft",
        license_type: LicenseType::UserBased,
        seats: 200,
        used_seats: 187,
        cost: 35000.0,
        start: (2023, 5, 10),
        expiry: (2024, 5, 10),
        status: LicenseStatus::Expiring,
        last_used: (2024, 4, 22),
        department: "All",
        tags: &["office", "essential", "productivity"],
    },
    SeedLicense {
        id: "3",
        name: "Slack Enterprise",
        vendor: "Salesforce",
        license_type: LicenseType::UserBased,
        seats: 150,
        used_seats: 124,
        cost: 22000.0,
        start: (2023, 2, 21),
        expiry: (2024, 2, 21),
        status: LicenseStatus::Expired,
        last_used: (2024, 2, 20),
        department: "All",
        tags: &["communication", "essential"],
    },
    SeedLicense {
        id: "4",
        name: "Atlassian Jira",
        vendor: "Atlassian",
        license_type: LicenseType::UserBased,
        seats: 100,
        used_seats: 78,
        cost: 14500.0,
        start: (2023, 10, 5),
        expiry: (2024, 10, 5),
        status: LicenseStatus::Active,
        last_used: (2024, 4, 21),
        department: "Engineering",
        tags: &["project-management", "essential"],
    },
    SeedLicense {
        id: "5",
        name: "Figma Enterprise",
        vendor: "Figma",
        license_type: LicenseType::UserBased,
        seats: 25,
        used_seats: 22,
        cost: 6500.0,
        start: (2023, 11, 17),
        expiry: (2024, 5, 17),
        status: LicenseStatus::Expiring,
        last_used: (2024, 4, 20),
        department: "Design",
        tags: &["design", "ui-ux"],
    },
    SeedLicense {
        id: "6",
        name: "AWS Enterprise Support",
        vendor: "Amazon",
        license_type: LicenseType::Subscription,
        seats: 1,
        used_seats: 1,
        cost: 40000.0,
        start: (2023, 8, 1),
        expiry: (2024, 8, 1),
        status: LicenseStatus::Active,
        last_used: (2024, 4, 22),
        department: "Engineering",
        tags: &["cloud", "infrastructure", "essential"],
    },
    SeedLicense {
        id: "7",
        name: "Salesforce Sales Cloud",
        vendor: "Salesforce",
        license_type: LicenseType::UserBased,
        seats: 35,
        used_seats: 28,
        cost: 18000.0,
        start: (2023, 7, 10),
        expiry: (2024, 7, 10),
        status: LicenseStatus::Active,
        last_used: (2024, 4, 19),
        department: "Sales",
        tags: &["crm", "sales"],
    },
    SeedLicense {
        id: "8",
        name: "Zoom Enterprise",
        vendor: "Zoom",
        license_type: LicenseType::UserBased,
        seats: 80,
        used_seats: 65,
        cost: 9500.0,
        start: (2023, 9, 15),
        expiry: (2024, 9, 15),
        status: LicenseStatus::Active,
        last_used: (2024, 4, 22),
        department: "All",
        tags: &["communication", "video"],
    },
    SeedLicense {
        id: "9",
        name: "AutoCAD",
        vendor: "Autodesk",
        license_type: LicenseType::Subscription,
        seats: 15,
        used_seats: 12,
        cost: 12500.0,
        start: (2023, 3, 1),
        expiry: (2024, 3, 1),
        status: LicenseStatus::Expired,
        last_used: (2024, 2, 29),
        department: "Engineering",
        tags: &["design", "cad"],
    },
    SeedLicense {
        id: "10",
        name: "GitHub Enterprise",
        vendor: "Microsoft",
        license_type: LicenseType::UserBased,
        seats: 90,
        used_seats: 84,
        cost: 11000.0,
        start: (2023, 12, 10),
        expiry: (2024, 12, 10),
        status: LicenseStatus::Active,
        last_used: (2024, 4, 21),
        department: "Engineering",
        tags: &["code", "essential", "development"],
    },
];

struct SeedUser {
    id: u64,
    name: &'static str,
    email: &'static str,
    department: &'static str,
    licenses: &'static [(&'static str, &'static str, LicenseStatus)],
}

const USERS: &[SeedUser] = &[
    SeedUser {
        id: 1,
        name: "Prajwal Weladi",
        email: "prajwalweladi1@gmail.com",
        department: "Engineering",
        licenses: &[
            ("1", "Adobe Creative Cloud", LicenseStatus::Active),
            ("2", "Microsoft 365", LicenseStatus::Active),
        ],
    },
    SeedUser {
        id: 2,
        name: "Tanmay Walke",
        email: "tanmay.walke22@vit.edu",
        department: "Marketing",
        licenses: &[
            ("3", "Slack Enterprise", LicenseStatus::Expired),
            ("5", "Figma Enterprise", LicenseStatus::Expiring),
        ],
    },
    SeedUser {
        id: 3,
        name: "Shlok Sonkusare",
        email: "shlok.sonkusare22@vit.edu",
        department: "Sales",
        licenses: &[
            ("7", "Salesforce Sales Cloud", LicenseStatus::Active),
            ("8", "Zoom Enterprise", LicenseStatus::Active),
        ],
    },
    SeedUser {
        id: 4,
        name: "Yashsin Patil Bhosale",
        email: "bhosale.patil22@vit.edu",
        department: "HR",
        licenses: &[("2", "Microsoft 365", LicenseStatus::Active)],
    },
    SeedUser {
        id: 5,
        name: "Michael Wilson",
        email: "michael.wilson@example.com",
        department: "IT",
        licenses: &[
            ("6", "AWS Enterprise Support", LicenseStatus::Active),
            ("10", "GitHub Enterprise", LicenseStatus::Active),
        ],
    },
];

fn date((y, m, d): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("seed dates are valid calendar dates")
}

/// The built-in license set.
pub fn seed_licenses() -> Vec<License> {
    LICENSES
        .iter()
        .map(|s| {
            let start = date(s.start);
            let mut license = License::create(
                LicenseId::new(s.id),
                NewLicense {
                    name: s.name.to_string(),
                    vendor: s.vendor.to_string(),
                    license_type: s.license_type,
                    seats: s.seats,
                    cost: s.cost,
                    start_date: Some(start),
                    expiry_date: Some(date(s.expiry)),
                    department: s.department.to_string(),
                    tags: s.tags.iter().map(|t| t.to_string()).collect(),
                },
                start,
            )
            .expect("seed licenses satisfy validation");
            license.set_derived(s.used_seats, s.status);
            license.last_used = Some(date(s.last_used));
            license
        })
        .collect()
}

/// The built-in user set.
pub fn seed_users() -> Vec<User> {
    USERS
        .iter()
        .map(|s| {
            let assignments = s
                .licenses
                .iter()
                .map(|(id, name, status)| Assignment {
                    id: LicenseId::new(*id),
                    name: name.to_string(),
                    status: *status,
                })
                .collect();
            User::create(
                UserId::new(s.id),
                NewUser {
                    name: s.name.to_string(),
                    email: s.email.to_string(),
                    department: s.department.to_string(),
                },
            )
            .expect("seed users satisfy validation")
            .with_assignments(assignments)
        })
        .collect()
}

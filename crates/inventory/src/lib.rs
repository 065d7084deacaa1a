//! License inventory domain module.
//!
//! This crate contains the business rules for licenses, users, and compliance
//! documents, implemented purely as deterministic domain logic (no IO, no
//! HTTP, no storage). Persistence and orchestration live in `licensedesk-infra`.

pub mod document;
pub mod license;
pub mod seats;
pub mod seed;
pub mod status;
pub mod summary;
pub mod user;

pub use document::{DEFAULT_MAX_DOCUMENT_BYTES, Document, DocumentUpload};
pub use license::{License, LicenseEdit, LicenseType, NewLicense};
pub use seats::{DanglingAssignment, SeatTally, reconcile_seats};
pub use status::{LicenseStatus, StatusPolicy, days_remaining};
pub use summary::{DepartmentCost, LicenseSummary, Renewal};
pub use user::{Assignment, NewUser, User, UserEdit};

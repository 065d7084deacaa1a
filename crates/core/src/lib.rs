//! `licensedesk-core`: foundation building blocks shared by every crate.
//!
//! This crate contains **pure** primitives (no persistence, no HTTP).

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::{Entity, position_of};
pub use error::{DomainError, DomainResult};
pub use id::{DocumentId, LicenseId, UserId};

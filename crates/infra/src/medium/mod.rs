//! Key/value persistence media backing the entity store.
//!
//! A medium holds whole JSON snapshots under a handful of named keys. It knows
//! nothing about licenses or users; capacity limits are its only policy.

#[cfg(test)]
pub(crate) mod faulty;
pub mod file;
pub mod in_memory;

use std::sync::Arc;

use thiserror::Error;

pub use file::FileMedium;
pub use in_memory::InMemoryMedium;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediumError {
    #[error("value of {required} chars exceeds capacity of {capacity} chars")]
    CapacityExceeded { required: usize, capacity: usize },

    #[error("medium unavailable: {0}")]
    Unavailable(String),
}

/// Snapshot storage contract.
///
/// `set` replaces the value atomically: after a failed `set`, `get` still
/// returns the previous value.
pub trait PersistenceMedium: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, MediumError>;
    fn set(&self, key: &str, value: String) -> Result<(), MediumError>;
}

impl<M> PersistenceMedium for Arc<M>
where
    M: PersistenceMedium + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>, MediumError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<(), MediumError> {
        (**self).set(key, value)
    }
}

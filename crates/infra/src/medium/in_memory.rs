use std::collections::HashMap;
use std::sync::RwLock;

use super::{MediumError, PersistenceMedium};

/// In-memory medium for tests/dev.
///
/// Capacity is counted in characters across all keys, the way browser local
/// storage quotas are.
#[derive(Debug, Default)]
pub struct InMemoryMedium {
    inner: RwLock<HashMap<String, String>>,
    capacity: Option<usize>,
}

impl InMemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            capacity: Some(capacity),
        }
    }

    /// Characters currently stored across all keys.
    pub fn used(&self) -> usize {
        self.inner
            .read()
            .map(|map| map.values().map(|v| v.len()).sum())
            .unwrap_or(0)
    }
}

impl PersistenceMedium for InMemoryMedium {
    fn get(&self, key: &str) -> Result<Option<String>, MediumError> {
        let map = self
            .inner
            .read()
            .map_err(|_| MediumError::Unavailable("lock poisoned".to_string()))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), MediumError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| MediumError::Unavailable("lock poisoned".to_string()))?;

        if let Some(capacity) = self.capacity {
            let others: usize = map
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let required = others + value.len();
            if required > capacity {
                return Err(MediumError::CapacityExceeded { required, capacity });
            }
        }

        map.insert(key.to_string(), value);
        Ok(())
    }
}

use std::collections::HashSet;
use std::sync::Mutex;

use super::{InMemoryMedium, MediumError, PersistenceMedium};

/// In-memory medium that can be told to refuse writes or reads for chosen keys.
#[derive(Debug, Default)]
pub(crate) struct FaultyMedium {
    inner: InMemoryMedium,
    failing_writes: Mutex<HashSet<String>>,
    failing_reads: Mutex<HashSet<String>>,
}

impl FaultyMedium {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_writes_to(&self, key: &str) {
        self.failing_writes.lock().unwrap().insert(key.to_string());
    }

    pub(crate) fn fail_reads_of(&self, key: &str) {
        self.failing_reads.lock().unwrap().insert(key.to_string());
    }

    pub(crate) fn heal(&self) {
        self.failing_writes.lock().unwrap().clear();
        self.failing_reads.lock().unwrap().clear();
    }
}

impl PersistenceMedium for FaultyMedium {
    fn get(&self, key: &str) -> Result<Option<String>, MediumError> {
        if self.failing_reads.lock().unwrap().contains(key) {
            return Err(MediumError::Unavailable(format!("read of {key} refused")));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<(), MediumError> {
        if self.failing_writes.lock().unwrap().contains(key) {
            return Err(MediumError::Unavailable(format!("write of {key} refused")));
        }
        self.inner.set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_write_keeps_previous_value_until_healed() {
        let medium = FaultyMedium::new();
        medium.set("users", "[]".to_string()).unwrap();

        medium.fail_writes_to("users");
        let err = medium.set("users", "[1]".to_string()).unwrap_err();
        assert!(matches!(err, MediumError::Unavailable(_)));
        assert_eq!(medium.get("users").unwrap().as_deref(), Some("[]"));
        medium.set("licenses", "[]".to_string()).unwrap();

        medium.heal();
        medium.set("users", "[1]".to_string()).unwrap();
        assert_eq!(medium.get("users").unwrap().as_deref(), Some("[1]"));
    }
}

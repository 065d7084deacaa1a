//! File-backed medium: one `<key>.json` per key in a data directory.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{MediumError, PersistenceMedium};

#[derive(Debug, Clone)]
pub struct FileMedium {
    dir: PathBuf,
    /// Maximum size of a single entry, in bytes.
    max_entry_bytes: Option<usize>,
}

fn io_err(context: &str, path: &Path, err: std::io::Error) -> MediumError {
    MediumError::Unavailable(format!("{context} {}: {err}", path.display()))
}

impl FileMedium {
    /// Open (creating if needed) a data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, MediumError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| io_err("failed to create data directory", &dir, e))?;
        Ok(Self {
            dir,
            max_entry_bytes: None,
        })
    }

    pub fn with_max_entry_bytes(mut self, max: usize) -> Self {
        self.max_entry_bytes = Some(max);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, MediumError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(MediumError::Unavailable(format!("invalid key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl PersistenceMedium for FileMedium {
    fn get(&self, key: &str) -> Result<Option<String>, MediumError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err("failed to read", &path, e)),
        }
    }

    fn set(&self, key: &str, value: String) -> Result<(), MediumError> {
        let path = self.path_for(key)?;

        if let Some(capacity) = self.max_entry_bytes {
            if value.len() > capacity {
                return Err(MediumError::CapacityExceeded {
                    required: value.len(),
                    capacity,
                });
            }
        }

        // Write a sibling temp file, then rename over the target.
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        let mut file = fs::File::create(&tmp).map_err(|e| io_err("failed to create", &tmp, e))?;
        file.write_all(value.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| io_err("failed to write", &tmp, e))?;
        drop(file);

        fs::rename(&tmp, &path).map_err(|e| io_err("failed to replace", &path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let medium = FileMedium::open(dir.path()).unwrap();

        assert_eq!(medium.get("users").unwrap(), None);
        medium.set("users", "[]".to_string()).unwrap();
        assert_eq!(medium.get("users").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("users.json").is_file());
        assert!(!dir.path().join(".users.json.tmp").exists());
    }

    #[test]
    fn oversized_entry_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let medium = FileMedium::open(dir.path()).unwrap().with_max_entry_bytes(4);

        medium.set("licenses", "[1]".to_string()).unwrap();
        let err = medium.set("licenses", "[1,2,3]".to_string()).unwrap_err();

        assert!(matches!(err, MediumError::CapacityExceeded { required: 7, capacity: 4 }));
        assert_eq!(medium.get("licenses").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let medium = FileMedium::open(dir.path()).unwrap();
        assert!(medium.get("../escape").is_err());
        assert!(medium.set("a/b", String::new()).is_err());
    }
}

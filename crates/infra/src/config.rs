//! Runtime configuration, read from `LICENSEDESK_*` environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use licensedesk_inventory::DEFAULT_MAX_DOCUMENT_BYTES;

use crate::medium::{FileMedium, InMemoryMedium, MediumError, PersistenceMedium};
use crate::notifications::DEFAULT_NOTICE_WINDOW_DAYS;
use crate::store::DEFAULT_MAX_PAYLOAD_CHARS;

/// Local-storage class quota, in characters.
pub const DEFAULT_STORAGE_CAPACITY: usize = 5 * 1024 * 1024;
pub const DEFAULT_EXPIRING_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    /// Directory for file-backed snapshots; `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    pub max_document_bytes: u64,
    pub max_payload_chars: usize,
    /// `None` means unlimited.
    pub storage_capacity: Option<usize>,
    pub expiring_window_days: i64,
    pub notice_window_days: i64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            max_payload_chars: DEFAULT_MAX_PAYLOAD_CHARS,
            storage_capacity: Some(DEFAULT_STORAGE_CAPACITY),
            expiring_window_days: DEFAULT_EXPIRING_WINDOW_DAYS,
            notice_window_days: DEFAULT_NOTICE_WINDOW_DAYS,
        }
    }
}

impl InventoryConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Bad values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_dir = match lookup("LICENSEDESK_DATA_DIR").map(|v| v.trim().to_string()) {
            None => None,
            Some(v) if v.is_empty() => None,
            Some(v) if v == "default" => {
                let dir = default_data_dir();
                if dir.is_none() {
                    warn!("could not resolve an OS data directory; using in-memory storage");
                }
                dir
            }
            Some(v) => Some(PathBuf::from(v)),
        };

        // Zero disables the quota.
        let storage_capacity = parse_or(
            &lookup,
            "LICENSEDESK_STORAGE_CAPACITY",
            defaults.storage_capacity.unwrap_or(0),
        );

        Self {
            data_dir,
            max_document_bytes: parse_or(&lookup, "LICENSEDESK_MAX_DOCUMENT_BYTES", defaults.max_document_bytes),
            max_payload_chars: parse_or(&lookup, "LICENSEDESK_MAX_PAYLOAD_CHARS", defaults.max_payload_chars),
            storage_capacity: (storage_capacity > 0).then_some(storage_capacity),
            expiring_window_days: parse_or(
                &lookup,
                "LICENSEDESK_EXPIRING_WINDOW_DAYS",
                defaults.expiring_window_days,
            ),
            notice_window_days: parse_or(&lookup, "LICENSEDESK_NOTICE_WINDOW_DAYS", defaults.notice_window_days),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, default = %default, "invalid configuration value; using default");
                default
            }
        },
    }
}

/// `<OS data dir>/licensedesk`, falling back to `~/.local/share/licensedesk`.
pub fn default_data_dir() -> Option<PathBuf> {
    let mut dir = dirs::data_dir().or_else(|| {
        dirs::home_dir().map(|mut h| {
            h.push(".local");
            h.push("share");
            h
        })
    })?;
    dir.push("licensedesk");
    Some(dir)
}

/// Open the medium described by `config`.
pub fn open_medium(config: &InventoryConfig) -> Result<Arc<dyn PersistenceMedium>, MediumError> {
    match &config.data_dir {
        Some(dir) => {
            let mut medium = FileMedium::open(dir)?;
            if let Some(capacity) = config.storage_capacity {
                medium = medium.with_max_entry_bytes(capacity);
            }
            info!(dir = %medium.dir().display(), "using file-backed storage");
            Ok(Arc::new(medium))
        }
        None => {
            let medium = match config.storage_capacity {
                Some(capacity) => InMemoryMedium::with_capacity(capacity),
                None => InMemoryMedium::new(),
            };
            info!("using in-memory storage");
            Ok(Arc::new(medium))
        }
    }
}

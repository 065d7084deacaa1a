//! Compliance documents attached to a license.
//!
//! Document content travels embedded in the license snapshot as a data URL
//! (`data:<mime-type>;base64,<payload>`). Payloads that cannot be persisted are
//! swapped for a size marker instead of being dropped.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use licensedesk_core::{DocumentId, DomainError, DomainResult};

/// Default upload limit (500 KiB).
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 512_000;

const FALLBACK_MIME: &str = "application/octet-stream";
const PLACEHOLDER_PREFIX: &str = "[Large document data - size: ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Original size in bytes.
    pub size: u64,
    pub upload_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
}

/// Raw upload as received from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub name: String,
    pub description: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Reject uploads larger than `max_bytes`.
pub fn check_upload_size(size: u64, max_bytes: u64) -> DomainResult<()> {
    if size > max_bytes {
        return Err(DomainError::oversized(size, max_bytes));
    }
    Ok(())
}

/// Encode bytes as a self-describing data URL.
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    let mime = if mime_type.trim().is_empty() {
        FALLBACK_MIME
    } else {
        mime_type.trim()
    };
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Split a base64 data URL back into MIME type and bytes.
pub fn decode_data_url(data_url: &str) -> Option<(String, Vec<u8>)> {
    let rest = data_url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((mime.to_string(), bytes))
}

/// Marker stored in place of a payload that was too large to persist.
pub fn placeholder_for(original_len: usize) -> String {
    format!("{PLACEHOLDER_PREFIX}{original_len} chars]")
}

impl Document {
    /// Build a document from an upload.
    ///
    /// The size limit is checked before anything is encoded.
    pub fn from_upload(
        id: DocumentId,
        upload: DocumentUpload,
        uploaded_at: DateTime<Utc>,
        max_bytes: u64,
    ) -> DomainResult<Self> {
        let size = upload.bytes.len() as u64;
        check_upload_size(size, max_bytes)?;

        let name = upload.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("document name cannot be empty"));
        }

        let mime_type = if upload.mime_type.trim().is_empty() {
            FALLBACK_MIME.to_string()
        } else {
            upload.mime_type.trim().to_string()
        };
        let data_url = encode_data_url(&mime_type, &upload.bytes);

        Ok(Self {
            id,
            name: name.to_string(),
            description: upload.description.trim().to_string(),
            mime_type,
            size,
            upload_date: uploaded_at,
            data_url: Some(data_url),
        })
    }

    pub fn is_placeholder(&self) -> bool {
        self.data_url
            .as_deref()
            .is_some_and(|d| d.starts_with(PLACEHOLDER_PREFIX))
    }

    /// Length of the real (non-placeholder) payload, if any.
    pub fn payload_len(&self) -> Option<usize> {
        match &self.data_url {
            Some(d) if !self.is_placeholder() => Some(d.len()),
            _ => None,
        }
    }

    /// Replace a real payload with the size marker; returns the original length.
    pub fn degrade_payload(&mut self) -> Option<usize> {
        let len = self.payload_len()?;
        self.data_url = Some(placeholder_for(len));
        Some(len)
    }

    /// Raw bytes of the payload (`None` for placeholders or missing content).
    pub fn decode_payload(&self) -> Option<Vec<u8>> {
        if self.is_placeholder() {
            return None;
        }
        decode_data_url(self.data_url.as_deref()?).map(|(_, bytes)| bytes)
    }
}

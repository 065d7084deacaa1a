use axum::http::StatusCode;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use licensedesk_core::{DocumentId, LicenseId, UserId};
use licensedesk_inventory::DocumentUpload;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

// License and user bodies deserialize straight into the domain inputs
// (`NewLicense`, `LicenseEdit`, `NewUser`, `UserEdit`).

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignLicensesRequest {
    pub license_ids: Vec<String>,
}

/// Document upload with base64-encoded content.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDocumentRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    pub content: String,
}

// -------------------------
// Decoding helpers
// -------------------------

impl AssignLicensesRequest {
    pub fn ids(&self) -> Vec<LicenseId> {
        self.license_ids.iter().map(|id| LicenseId::new(id.as_str())).collect()
    }
}

impl UploadDocumentRequest {
    pub fn into_upload(self) -> Result<DocumentUpload, axum::response::Response> {
        let bytes = STANDARD.decode(self.content.trim()).map_err(|_| {
            errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_content",
                "content must be base64-encoded",
            )
        })?;
        Ok(DocumentUpload {
            name: self.name,
            description: self.description,
            mime_type: self.mime_type,
            bytes,
        })
    }
}

pub fn parse_user_id(raw: &str) -> Result<UserId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"))
}

pub fn parse_license_id(raw: &str) -> Result<LicenseId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid license id"))
}

pub fn parse_document_id(raw: &str) -> Result<DocumentId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid document id"))
}

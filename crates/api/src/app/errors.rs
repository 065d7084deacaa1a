use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use licensedesk_core::DomainError;
use licensedesk_infra::{ServiceError, StoreError};

use crate::app::services::PoisonedLock;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Store(e) => store_error_to_response(e),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::OversizedPayload { .. } => {
            json_error(StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", message)
        }
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        StoreError::CapacityExceeded { .. } => {
            json_error(StatusCode::INSUFFICIENT_STORAGE, "capacity_exceeded", message)
        }
        StoreError::Unavailable(_) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable", message)
        }
        StoreError::Corrupt { .. } => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "corrupt_snapshot", message)
        }
        StoreError::Serialize(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "serialize_error", message)
        }
    }
}

pub fn poisoned_to_response(_: PoisonedLock) -> axum::response::Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "inventory lock poisoned",
    )
}

pub fn not_found(what: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", format!("{} not found", what.into()))
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

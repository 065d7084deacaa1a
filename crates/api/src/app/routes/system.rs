use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use licensedesk_infra::LogSink;

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn reconcile(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let inventory = match services.inventory() {
        Ok(i) => i,
        Err(e) => return errors::poisoned_to_response(e),
    };

    match inventory.reconcile() {
        Ok(report) => Json(serde_json::json!({
            "licenses": report.licenses.len(),
            "counted": report.counted,
            "dangling": report.dangling,
            "degraded": report.write.degraded,
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn expiring_notices(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let inventory = match services.inventory() {
        Ok(i) => i,
        Err(e) => return errors::poisoned_to_response(e),
    };

    match inventory.expiring_notices() {
        Ok(notices) => Json(notices).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Scan for licenses about to expire and emit one log event per notice.
pub async fn notify_expiring(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let inventory = match services.inventory() {
        Ok(i) => i,
        Err(e) => return errors::poisoned_to_response(e),
    };

    match inventory.notify_expiring(&LogSink) {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};

use licensedesk_inventory::{LicenseEdit, NewLicense};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_licenses).post(create_license))
        .route("/:id", put(update_license).delete(delete_license))
        .route("/:id/documents", post(upload_document))
        .route("/:id/documents/:doc_id", delete(delete_document))
}

pub async fn list_licenses(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::SearchQuery>,
) -> axum::response::Response {
    let inventory = match services.inventory() {
        Ok(i) => i,
        Err(e) => return errors::poisoned_to_response(e),
    };

    let result = match query.q.as_deref() {
        Some(q) => inventory.search_licenses(q),
        None => inventory.licenses(),
    };
    match result {
        Ok(licenses) => Json(licenses).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_license(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewLicense>,
) -> axum::response::Response {
    let inventory = match services.inventory() {
        Ok(i) => i,
        Err(e) => return errors::poisoned_to_response(e),
    };

    match inventory.add_license(body) {
        Ok(license) => (StatusCode::CREATED, Json(license)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_license(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<LicenseEdit>,
) -> axum::response::Response {
    let id = match dto::parse_license_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let inventory = match services.inventory() {
        Ok(i) => i,
        Err(e) => return errors::poisoned_to_response(e),
    };

    match inventory.update_license(&id, body) {
        Ok(Some(license)) => Json(license).into_response(),
        Ok(None) => errors::not_found(format!("license {id}")),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_license(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_license_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let inventory = match services.inventory() {
        Ok(i) => i,
        Err(e) => return errors::poisoned_to_response(e),
    };

    // Deleting an absent license is a no-op, not an error.
    match inventory.delete_license(&id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn upload_document(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UploadDocumentRequest>,
) -> axum::response::Response {
    let id = match dto::parse_license_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let upload = match body.into_upload() {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let inventory = match services.inventory() {
        Ok(i) => i,
        Err(e) => return errors::poisoned_to_response(e),
    };

    match inventory.upload_document(&id, upload) {
        Ok(Some(outcome)) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Ok(None) => errors::not_found(format!("license {id}")),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_document(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, doc_id)): Path<(String, String)>,
) -> axum::response::Response {
    let id = match dto::parse_license_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let doc_id = match dto::parse_document_id(&doc_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let inventory = match services.inventory() {
        Ok(i) => i,
        Err(e) => return errors::poisoned_to_response(e),
    };

    match inventory.delete_document(&id, &doc_id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

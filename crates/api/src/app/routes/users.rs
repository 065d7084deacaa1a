use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use licensedesk_inventory::{NewUser, UserEdit};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", put(update_user).delete(delete_user))
        .route("/:id/licenses", put(assign_licenses))
}

pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let inventory = match services.inventory() {
        Ok(i) => i,
        Err(e) => return errors::poisoned_to_response(e),
    };
    match inventory.users() {
        Ok(users) => Json(users).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewUser>,
) -> axum::response::Response {
    let inventory = match services.inventory() {
        Ok(i) => i,
        Err(e) => return errors::poisoned_to_response(e),
    };
    match inventory.add_user(body) {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<UserEdit>,
) -> axum::response::Response {
    let id = match dto::parse_user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let inventory = match services.inventory() {
        Ok(i) => i,
        Err(e) => return errors::poisoned_to_response(e),
    };
    match inventory.update_user(id, body) {
        Ok(Some(user)) => Json(user).into_response(),
        Ok(None) => errors::not_found(format!("user {id}")),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let inventory = match services.inventory() {
        Ok(i) => i,
        Err(e) => return errors::poisoned_to_response(e),
    };
    match inventory.delete_user(id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Replace the user's license set; unknown license ids are reported back as `dropped`.
pub async fn assign_licenses(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::AssignLicensesRequest>,
) -> axum::response::Response {
    let id = match dto::parse_user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let inventory = match services.inventory() {
        Ok(i) => i,
        Err(e) => return errors::poisoned_to_response(e),
    };
    match inventory.assign_licenses_to_user(id, &body.ids()) {
        Ok(outcome) => Json(serde_json::json!({
            "user": outcome.user,
            "dropped": outcome.dropped,
            "degraded": outcome.reconcile.write.degraded,
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

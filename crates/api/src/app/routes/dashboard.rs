use std::sync::Arc;

use axum::{Json, Router, extract::Extension, response::IntoResponse, routing::get};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/summary", get(summary))
        .route("/departments", get(departments))
        .route("/renewals", get(renewals))
}

pub async fn summary(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let inventory = match services.inventory() {
        Ok(i) => i,
        Err(e) => return errors::poisoned_to_response(e),
    };
    match inventory.summary() {
        Ok(s) => Json(s).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn departments(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let inventory = match services.inventory() {
        Ok(i) => i,
        Err(e) => return errors::poisoned_to_response(e),
    };
    match inventory.department_costs() {
        Ok(costs) => Json(costs).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn renewals(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let inventory = match services.inventory() {
        Ok(i) => i,
        Err(e) => return errors::poisoned_to_response(e),
    };
    match inventory.upcoming_renewals() {
        Ok(renewals) => Json(renewals).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

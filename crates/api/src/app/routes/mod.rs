use axum::{
    Router,
    routing::{get, post},
};

pub mod dashboard;
pub mod licenses;
pub mod system;
pub mod users;

/// Router for all inventory endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/reconcile", post(system::reconcile))
        .route(
            "/notifications/expiring",
            get(system::expiring_notices).post(system::notify_expiring),
        )
        .nest("/licenses", licenses::router())
        .nest("/users", users::router())
        .nest("/dashboard", dashboard::router())
}

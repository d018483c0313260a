pub mod cleanup;
mod error;
pub mod executions;
pub mod health;
pub mod progress;
pub mod routines;

use axum::{
    Router,
    routing::{delete, get, post},
};
pub use error::{ApiError, ApiPath, ErrorResponse};

use crate::{AppState, middleware, services::Services};

fn get_services(state: &AppState) -> Result<&Services, ApiError> {
    state.services.as_ref().ok_or(ApiError::DatabaseRequired)
}

/// Routes nested under `/api`.
///
/// Everything except `/cleanup` acts on behalf of an end user and sits behind
/// the identity middleware. `/cleanup` authenticates the scheduler with its
/// own bearer secret.
pub fn get_api_routes(state: AppState) -> Router<AppState> {
    let user_routes = Router::new()
        .route("/routines", get(routines::list).post(routines::create))
        .route("/routines/trash", get(routines::list_trash))
        .route(
            "/routines/{id}",
            get(routines::get)
                .patch(routines::update)
                .delete(routines::delete),
        )
        .route("/routines/{id}/restore", post(routines::restore))
        .route(
            "/routines/{id}/executions",
            get(executions::list).post(executions::log),
        )
        .route(
            "/routines/{id}/executions/{date}",
            delete(executions::delete),
        )
        .route("/routines/{id}/progress", get(progress::get))
        .route("/progress", get(progress::list))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::identity_middleware,
        ));

    Router::new()
        .route("/cleanup", post(cleanup::cleanup))
        .merge(user_routes)
}

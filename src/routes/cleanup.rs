//! `POST /api/cleanup`: purge routines soft-deleted more than 24 hours ago.
//!
//! Called by an external scheduler with `Authorization: Bearer <secret>`.
//! Sits outside the end-user identity middleware.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::ErrorResponse;
use crate::{
    AppState,
    db::DbError,
    observability::metrics,
    services::{CleanupError, cleanup::authorize},
};

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct CleanupResponse {
    pub success: bool,
    #[cfg_attr(
        feature = "utoipa",
        schema(example = "Purged 1 routine(s) deleted more than 24 hours ago")
    )]
    pub message: String,
    /// Number of routines permanently removed
    pub deleted: u64,
}

/// Extract the credential from an `Authorization: Bearer <token>` header.
///
/// The token is returned verbatim; surrounding whitespace is part of it.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

/// Purge soft-deleted routines past the retention window
#[cfg_attr(feature = "utoipa", utoipa::path(
    post,
    path = "/api/cleanup",
    tag = "cleanup",
    operation_id = "cleanup_purge",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Purge completed", body = CleanupResponse),
        (status = 401, description = "Missing or wrong bearer secret", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
))]
#[tracing::instrument(name = "cleanup.purge", skip_all)]
pub async fn cleanup(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CleanupResponse>, CleanupError> {
    let presented = bearer_token(&headers);

    let Some(services) = state.services.as_ref() else {
        // Authorization precedes any storage check.
        authorize(state.config.cleanup.secret(), presented)?;
        return Err(CleanupError::Storage(DbError::NotConfigured));
    };

    let report = services.purge.run(presented).await?;
    Ok(Json(CleanupResponse {
        success: true,
        message: report.message(),
        deleted: report.deleted,
    }))
}

impl IntoResponse for CleanupError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            CleanupError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized"),
            CleanupError::Storage(err) => {
                tracing::error!(error = %err, "Cleanup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "cleanup_failed",
                    "Failed to clean up deleted routines",
                )
            }
        };

        metrics::record_api_error(code);

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

//! Derived progress: streaks and recent completion rate per routine.

use axum::{Extension, Json, extract::State};
use uuid::Uuid;

use super::{ApiError, ApiPath, get_services};
use crate::{AppState, db::DbError, middleware::Identity, models::RoutineProgress};

/// Progress for every active routine of the caller
#[cfg_attr(feature = "utoipa", utoipa::path(
    get,
    path = "/api/progress",
    tag = "progress",
    operation_id = "progress_list",
    responses(
        (status = 200, description = "Progress per active routine", body = Vec<RoutineProgress>),
        (status = 401, description = "No user identity", body = crate::routes::ErrorResponse),
    )
))]
#[tracing::instrument(name = "progress.list", skip_all)]
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<RoutineProgress>>, ApiError> {
    let services = get_services(&state)?;
    Ok(Json(services.progress.for_user(&identity.user_id).await?))
}

/// Progress for one routine
#[cfg_attr(feature = "utoipa", utoipa::path(
    get,
    path = "/api/routines/{id}/progress",
    tag = "progress",
    operation_id = "progress_get",
    params(("id" = Uuid, Path, description = "Routine ID")),
    responses(
        (status = 200, description = "Routine progress", body = RoutineProgress),
        (status = 404, description = "Routine not found or deleted", body = crate::routes::ErrorResponse),
    )
))]
#[tracing::instrument(name = "progress.get", skip(state, identity))]
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<RoutineProgress>, ApiError> {
    let services = get_services(&state)?;
    let progress = services
        .progress
        .for_routine(id, &identity.user_id)
        .await
        .map_err(|e| match e {
            DbError::NotFound => ApiError::routine_not_found(),
            other => other.into(),
        })?;
    Ok(Json(progress))
}

#[cfg(all(test, feature = "database-sqlite"))]
mod tests {
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_streak_counts_consecutive_days() {
        let app = TestApp::new().await;
        let id = app.create_routine("user-1", "Stretch").await;
        let today = Utc::now().date_naive();

        for offset in 0..3 {
            let (status, _) = app
                .post(
                    &format!("/api/routines/{id}/executions"),
                    "user-1",
                    json!({ "executed_on": today - Duration::days(offset) }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = app.get(&format!("/api/routines/{id}/progress"), "user-1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_executions"], 3);
        assert_eq!(body["current_streak"], 3);
        assert_eq!(body["last_executed_on"], json!(today.to_string()));
    }

    #[tokio::test]
    async fn test_user_progress_skips_trashed_routines() {
        let app = TestApp::new().await;
        let kept = app.create_routine("user-1", "Kept").await;
        let trashed = app.create_routine("user-1", "Trashed").await;
        app.delete(&format!("/api/routines/{trashed}"), "user-1").await;

        let (status, body) = app.get("/api/progress", "user-1").await;
        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["routine_id"], json!(kept));

        let (status, _) = app
            .get(&format!("/api/routines/{trashed}/progress"), "user-1")
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

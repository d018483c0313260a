//! Execution logging for a routine. Each routine can be executed at most once
//! per calendar day.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use axum_valid::{Valid, ValidRejection};
use chrono::NaiveDate;
use uuid::Uuid;

use super::{ApiError, ApiPath, get_services};
use crate::{
    AppState,
    db::DbError,
    middleware::Identity,
    models::{Execution, LogExecution},
};

fn routine_scoped(err: DbError) -> ApiError {
    match err {
        DbError::NotFound => ApiError::routine_not_found(),
        other => other.into(),
    }
}

/// List executions of a routine, newest first
#[cfg_attr(feature = "utoipa", utoipa::path(
    get,
    path = "/api/routines/{id}/executions",
    tag = "executions",
    operation_id = "execution_list",
    params(("id" = Uuid, Path, description = "Routine ID")),
    responses(
        (status = 200, description = "Executions", body = Vec<Execution>),
        (status = 404, description = "Routine not found or deleted", body = crate::routes::ErrorResponse),
    )
))]
#[tracing::instrument(name = "executions.list", skip(state, identity))]
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<Execution>>, ApiError> {
    let services = get_services(&state)?;
    let executions = services
        .executions
        .list(id, &identity.user_id)
        .await
        .map_err(routine_scoped)?;
    Ok(Json(executions))
}

/// Log that a routine was performed
#[cfg_attr(feature = "utoipa", utoipa::path(
    post,
    path = "/api/routines/{id}/executions",
    tag = "executions",
    operation_id = "execution_log",
    params(("id" = Uuid, Path, description = "Routine ID")),
    request_body = LogExecution,
    responses(
        (status = 201, description = "Execution logged", body = Execution),
        (status = 400, description = "Invalid input, or date in the future or before 1970", body = crate::routes::ErrorResponse),
        (status = 404, description = "Routine not found or deleted", body = crate::routes::ErrorResponse),
        (status = 409, description = "Already executed on that date", body = crate::routes::ErrorResponse),
    )
))]
#[tracing::instrument(name = "executions.log", skip(state, identity, body))]
pub async fn log(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<Uuid>,
    body: Result<Valid<Json<LogExecution>>, ValidRejection<JsonRejection>>,
) -> Result<(StatusCode, Json<Execution>), ApiError> {
    let Valid(Json(input)) = body?;
    let services = get_services(&state)?;

    let execution = services
        .executions
        .log(id, &identity.user_id, input)
        .await
        .map_err(routine_scoped)?;
    Ok((StatusCode::CREATED, Json(execution)))
}

/// Remove the execution logged for a date
#[cfg_attr(feature = "utoipa", utoipa::path(
    delete,
    path = "/api/routines/{id}/executions/{date}",
    tag = "executions",
    operation_id = "execution_delete",
    params(
        ("id" = Uuid, Path, description = "Routine ID"),
        ("date" = NaiveDate, Path, description = "Execution date (YYYY-MM-DD)"),
    ),
    responses(
        (status = 204, description = "Execution removed"),
        (status = 404, description = "No such routine or execution", body = crate::routes::ErrorResponse),
    )
))]
#[tracing::instrument(name = "executions.delete", skip(state, identity))]
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath((id, date)): ApiPath<(Uuid, NaiveDate)>,
) -> Result<StatusCode, ApiError> {
    let services = get_services(&state)?;
    services
        .executions
        .delete(id, &identity.user_id, date)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(all(test, feature = "database-sqlite"))]
mod tests {
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_log_defaults_to_today() {
        let app = TestApp::new().await;
        let id = app.create_routine("user-1", "Walk").await;

        let (status, body) = app
            .post(&format!("/api/routines/{id}/executions"), "user-1", json!({}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            body["executed_on"],
            json!(Utc::now().date_naive().to_string())
        );
    }

    #[tokio::test]
    async fn test_duplicate_date_conflicts() {
        let app = TestApp::new().await;
        let id = app.create_routine("user-1", "Walk").await;
        let path = format!("/api/routines/{id}/executions");

        let (status, _) = app
            .post(&path, "user-1", json!({ "executed_on": "2025-06-02" }))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = app
            .post(&path, "user-1", json!({ "executed_on": "2025-06-02" }))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("2025-06-02"));
    }

    #[tokio::test]
    async fn test_future_date_rejected() {
        let app = TestApp::new().await;
        let id = app.create_routine("user-1", "Walk").await;
        let tomorrow = Utc::now().date_naive() + Duration::days(1);

        let (status, _) = app
            .post(
                &format!("/api/routines/{id}/executions"),
                "user-1",
                json!({ "executed_on": tomorrow }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ancient_date_rejected() {
        let app = TestApp::new().await;
        let id = app.create_routine("user-1", "Walk").await;
        let path = format!("/api/routines/{id}/executions");

        for date in ["-200000-01-01", "1969-12-31"] {
            let (status, body) = app
                .post(&path, "user-1", json!({ "executed_on": date }))
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{date}");
            assert!(body["error"].as_str().unwrap().contains("1970"));
        }

        let (status, _) = app
            .post(&path, "user-1", json!({ "executed_on": "1970-01-01" }))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, list) = app.get(&path, "user-1").await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, progress) = app
            .get(&format!("/api/routines/{id}/progress"), "user-1")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(progress["total_executions"], 1);
    }

    #[tokio::test]
    async fn test_trashed_routine_rejects_executions() {
        let app = TestApp::new().await;
        let id = app.create_routine("user-1", "Walk").await;
        app.delete(&format!("/api/routines/{id}"), "user-1").await;

        let (status, body) = app
            .post(&format!("/api/routines/{id}/executions"), "user-1", json!({}))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Routine not found");
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let app = TestApp::new().await;
        let id = app.create_routine("user-1", "Walk").await;
        let path = format!("/api/routines/{id}/executions");

        for date in ["2025-06-01", "2025-06-03"] {
            app.post(&path, "user-1", json!({ "executed_on": date, "note": "ok" }))
                .await;
        }

        let (status, list) = app.get(&path, "user-1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list[0]["executed_on"], "2025-06-03");
        assert_eq!(list[1]["executed_on"], "2025-06-01");

        let (status, _) = app.delete(&format!("{path}/2025-06-03"), "user-1").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.delete(&format!("{path}/2025-06-03"), "user-1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, list) = app.get(&path, "user-1").await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }
}

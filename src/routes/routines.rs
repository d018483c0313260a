//! Routine CRUD for the calling user.
//!
//! `DELETE` only soft-deletes: the routine moves to the trash, disappears from
//! every other read, and can be restored until the cleanup job purges it.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use axum_valid::{Valid, ValidRejection};
use uuid::Uuid;

use super::{ApiError, ApiPath, get_services};
use crate::{
    AppState,
    middleware::Identity,
    models::{CreateRoutine, Routine, UpdateRoutine},
};

/// List the caller's active routines
#[cfg_attr(feature = "utoipa", utoipa::path(
    get,
    path = "/api/routines",
    tag = "routines",
    operation_id = "routine_list",
    responses(
        (status = 200, description = "Active routines, oldest first", body = Vec<Routine>),
        (status = 401, description = "No user identity", body = crate::routes::ErrorResponse),
    )
))]
#[tracing::instrument(name = "routines.list", skip_all)]
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Routine>>, ApiError> {
    let services = get_services(&state)?;
    let routines = services.routines.list(&identity.user_id).await?;
    Ok(Json(routines))
}

/// Create a routine
#[cfg_attr(feature = "utoipa", utoipa::path(
    post,
    path = "/api/routines",
    tag = "routines",
    operation_id = "routine_create",
    request_body = CreateRoutine,
    responses(
        (status = 201, description = "Routine created", body = Routine),
        (status = 400, description = "Invalid input", body = crate::routes::ErrorResponse),
        (status = 401, description = "No user identity", body = crate::routes::ErrorResponse),
    )
))]
#[tracing::instrument(name = "routines.create", skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    body: Result<Valid<Json<CreateRoutine>>, ValidRejection<JsonRejection>>,
) -> Result<(StatusCode, Json<Routine>), ApiError> {
    let Valid(Json(input)) = body?;
    let services = get_services(&state)?;

    let routine = services.routines.create(&identity.user_id, input).await?;
    tracing::info!(routine_id = %routine.id, "Routine created");
    Ok((StatusCode::CREATED, Json(routine)))
}

/// List the caller's soft-deleted routines that have not been purged yet
#[cfg_attr(feature = "utoipa", utoipa::path(
    get,
    path = "/api/routines/trash",
    tag = "routines",
    operation_id = "routine_list_trash",
    responses(
        (status = 200, description = "Soft-deleted routines, most recent first", body = Vec<Routine>),
        (status = 401, description = "No user identity", body = crate::routes::ErrorResponse),
    )
))]
#[tracing::instrument(name = "routines.trash", skip_all)]
pub async fn list_trash(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Routine>>, ApiError> {
    let services = get_services(&state)?;
    let routines = services.routines.list_trash(&identity.user_id).await?;
    Ok(Json(routines))
}

/// Get an active routine
#[cfg_attr(feature = "utoipa", utoipa::path(
    get,
    path = "/api/routines/{id}",
    tag = "routines",
    operation_id = "routine_get",
    params(("id" = Uuid, Path, description = "Routine ID")),
    responses(
        (status = 200, description = "Routine found", body = Routine),
        (status = 404, description = "Routine not found or deleted", body = crate::routes::ErrorResponse),
    )
))]
#[tracing::instrument(name = "routines.get", skip(state, identity))]
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Routine>, ApiError> {
    let services = get_services(&state)?;
    let routine = services
        .routines
        .get(id, &identity.user_id)
        .await?
        .ok_or_else(ApiError::routine_not_found)?;
    Ok(Json(routine))
}

/// Update an active routine
#[cfg_attr(feature = "utoipa", utoipa::path(
    patch,
    path = "/api/routines/{id}",
    tag = "routines",
    operation_id = "routine_update",
    params(("id" = Uuid, Path, description = "Routine ID")),
    request_body = UpdateRoutine,
    responses(
        (status = 200, description = "Routine updated", body = Routine),
        (status = 400, description = "Invalid input", body = crate::routes::ErrorResponse),
        (status = 404, description = "Routine not found or deleted", body = crate::routes::ErrorResponse),
    )
))]
#[tracing::instrument(name = "routines.update", skip(state, identity, body))]
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<Uuid>,
    body: Result<Valid<Json<UpdateRoutine>>, ValidRejection<JsonRejection>>,
) -> Result<Json<Routine>, ApiError> {
    let Valid(Json(input)) = body?;
    let services = get_services(&state)?;

    let routine = services
        .routines
        .update(id, &identity.user_id, input)
        .await
        .map_err(not_found_as_routine)?;
    Ok(Json(routine))
}

/// Soft-delete a routine
#[cfg_attr(feature = "utoipa", utoipa::path(
    delete,
    path = "/api/routines/{id}",
    tag = "routines",
    operation_id = "routine_delete",
    params(("id" = Uuid, Path, description = "Routine ID")),
    responses(
        (status = 204, description = "Routine moved to the trash"),
        (status = 404, description = "Routine not found or already deleted", body = crate::routes::ErrorResponse),
    )
))]
#[tracing::instrument(name = "routines.delete", skip(state, identity))]
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let services = get_services(&state)?;
    services
        .routines
        .soft_delete(id, &identity.user_id)
        .await
        .map_err(not_found_as_routine)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Restore a soft-deleted routine that has not been purged yet
#[cfg_attr(feature = "utoipa", utoipa::path(
    post,
    path = "/api/routines/{id}/restore",
    tag = "routines",
    operation_id = "routine_restore",
    params(("id" = Uuid, Path, description = "Routine ID")),
    responses(
        (status = 200, description = "Routine restored", body = Routine),
        (status = 404, description = "No such routine in the trash", body = crate::routes::ErrorResponse),
    )
))]
#[tracing::instrument(name = "routines.restore", skip(state, identity))]
pub async fn restore(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Routine>, ApiError> {
    let services = get_services(&state)?;
    let routine = services
        .routines
        .restore(id, &identity.user_id)
        .await
        .map_err(not_found_as_routine)?;
    Ok(Json(routine))
}

fn not_found_as_routine(err: crate::db::DbError) -> ApiError {
    match err {
        crate::db::DbError::NotFound => ApiError::routine_not_found(),
        other => other.into(),
    }
}

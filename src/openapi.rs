use utoipa::OpenApi;

use crate::{
    models,
    routes::{self, cleanup, executions, health, progress, routines},
    services::cleanup::RETENTION_WINDOW_HOURS,
};

/// OpenAPI documentation for Routinely
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Routinely API",
        version = "0.1.0",
        description = r#"**Routinely** tracks routines (recurring habits), the days they were carried out, and the resulting streaks.

## Authentication

End-user routes under `/api` expect an authenticating proxy in front of the service that sets the user's identity header (`X-User-Id` by default). Requests without it receive `401`.

`POST /api/cleanup` is called by a scheduler, not by users. It requires `Authorization: Bearer <secret>` matching the configured `cleanup.secret`.

## Deletion

Deleting a routine moves it to the trash. It is hidden from every other read and can be restored until the cleanup job permanently removes routines that have been in the trash for 24 hours or more.

## Errors

Every error body has the shape `{"error": "..."}`, plus a `request_id` when one is available."#
    ),
    tags(
        (name = "routines", description = "Routine management and trash"),
        (name = "executions", description = "Daily execution log"),
        (name = "progress", description = "Streaks and completion rates"),
        (name = "cleanup", description = "Scheduled purge of trashed routines"),
        (name = "health", description = "Health checks"),
    ),
    paths(
        routines::list,
        routines::create,
        routines::list_trash,
        routines::get,
        routines::update,
        routines::delete,
        routines::restore,
        executions::list,
        executions::log,
        executions::delete,
        progress::list,
        progress::get,
        cleanup::cleanup,
        health::health_check,
        health::liveness,
        health::readiness,
    ),
    components(schemas(
        models::Routine,
        models::CreateRoutine,
        models::UpdateRoutine,
        models::Schedule,
        models::Weekday,
        models::Execution,
        models::LogExecution,
        models::RoutineProgress,
        cleanup::CleanupResponse,
        routes::ErrorResponse,
        health::HealthStatus,
        health::ComponentStatus,
    )),
    security(
        ("identity" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

impl ApiDoc {
    pub fn build() -> utoipa::openapi::OpenApi {
        Self::openapi()
    }
}

/// Security schemes for the identity header and the cleanup secret
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "identity",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "X-User-Id",
                "User identity set by the authenticating proxy",
            ))),
        );
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some(format!(
                        "Cleanup secret; purges routines deleted {RETENTION_WINDOW_HOURS}h or more ago"
                    )))
                    .build(),
            ),
        );
    }
}

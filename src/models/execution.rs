use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A single day on which a routine was carried out
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Execution {
    pub id: Uuid,
    pub routine_id: Uuid,
    /// Calendar date the routine was performed on
    pub executed_on: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request to log an execution
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct LogExecution {
    /// Date performed; defaults to today (UTC)
    pub executed_on: Option<NaiveDate>,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

/// Input handed to the repository once defaults are resolved
#[derive(Debug, Clone)]
pub struct CreateExecution {
    pub routine_id: Uuid,
    pub executed_on: NaiveDate,
    pub note: Option<String>,
}

use uuid::Uuid;

use crate::{
    db::error::{DbError, DbResult},
    models::Schedule,
};

/// Parse a UUID string from the database, returning a DbError on failure
pub fn parse_uuid(s: &str) -> DbResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DbError::Internal(format!("Invalid UUID in database: {}", e)))
}

/// Parse a stored schedule (JSON array of weekday names)
pub fn parse_schedule(s: &str) -> DbResult<Schedule> {
    Ok(serde_json::from_str(s)?)
}

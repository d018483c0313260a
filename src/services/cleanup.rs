//! Purge of soft-deleted routines.
//!
//! A routine moves `Active -> SoftDeleted` when its owner deletes it and
//! `SoftDeleted -> Purged` only here, once it has sat in the trash for at
//! least [`RETENTION_WINDOW_HOURS`]. The job is triggered externally through
//! `POST /api/cleanup` and authorized with a pre-shared bearer secret.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::{
    db::{DbError, RoutineRepo},
    observability::metrics,
};

/// Hours a routine stays recoverable after a soft delete.
pub const RETENTION_WINDOW_HOURS: i64 = 24;

/// [`RETENTION_WINDOW_HOURS`] as a duration.
pub fn retention_window() -> Duration {
    Duration::hours(RETENTION_WINDOW_HOURS)
}

/// Outcome of a successful purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeReport {
    /// Routines permanently removed
    pub deleted: u64,
    /// Routines soft-deleted strictly before this instant were eligible
    pub cutoff: DateTime<Utc>,
}

impl PurgeReport {
    pub fn message(&self) -> String {
        format!(
            "Purged {} routine(s) deleted more than {} hours ago",
            self.deleted, RETENTION_WINDOW_HOURS
        )
    }
}

#[derive(Debug, Error)]
pub enum CleanupError {
    /// Missing or incorrect bearer secret, or no secret configured.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Purge failed: {0}")]
    Storage(#[from] DbError),
}

/// Check a presented bearer secret against the configured one.
///
/// Fails closed: with no configured secret every request is refused.
pub fn authorize(expected: Option<&str>, presented: Option<&str>) -> Result<(), CleanupError> {
    match (expected, presented) {
        (Some(expected), Some(presented))
            if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) =>
        {
            Ok(())
        }
        _ => Err(CleanupError::Unauthorized),
    }
}

/// The purge operation with its collaborators passed in explicitly.
#[derive(Clone)]
pub struct PurgeJob {
    routines: Arc<dyn RoutineRepo>,
    secret: Option<String>,
}

impl PurgeJob {
    pub fn new(routines: Arc<dyn RoutineRepo>, secret: Option<String>) -> Self {
        Self { routines, secret }
    }

    /// Authorize and purge using the current server time.
    pub async fn run(&self, presented: Option<&str>) -> Result<PurgeReport, CleanupError> {
        self.run_at(presented, Utc::now()).await
    }

    /// Authorize and purge as of `now`.
    ///
    /// Authorization happens before any storage access. The purge itself is a
    /// single predicate delete, so concurrent or repeated runs are safe.
    pub async fn run_at(
        &self,
        presented: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<PurgeReport, CleanupError> {
        if let Err(e) = authorize(self.secret.as_deref(), presented) {
            tracing::warn!(
                credential_present = presented.is_some(),
                "Rejected cleanup request"
            );
            return Err(e);
        }

        let cutoff = now - retention_window();
        let deleted = self.routines.purge_deleted_before(cutoff).await?;

        if deleted > 0 {
            tracing::info!(deleted, cutoff = %cutoff, "Purged soft-deleted routines");
            metrics::record_retention_deletion("routines", deleted);
        } else {
            tracing::debug!(cutoff = %cutoff, "Cleanup run complete, nothing to purge");
        }

        Ok(PurgeReport { deleted, cutoff })
    }
}

pub mod cleanup;
mod executions;
mod progress;
mod routines;

use std::sync::Arc;

pub use cleanup::{CleanupError, PurgeJob, PurgeReport};
pub use executions::ExecutionService;
pub use progress::ProgressService;
pub use routines::RoutineService;

use crate::{config::CleanupConfig, db::DbPool};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub routines: RoutineService,
    pub executions: ExecutionService,
    pub progress: ProgressService,
    pub purge: PurgeJob,
}

impl Services {
    pub fn new(db: Arc<DbPool>, cleanup: &CleanupConfig) -> Self {
        Self {
            routines: RoutineService::new(db.clone()),
            executions: ExecutionService::new(db.clone()),
            progress: ProgressService::new(db.clone()),
            purge: PurgeJob::new(db.routines(), cleanup.secret().map(str::to_string)),
        }
    }
}

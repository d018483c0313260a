mod common;
mod executions;
mod routines;

pub use executions::SqliteExecutionRepo;
pub use routines::SqliteRoutineRepo;

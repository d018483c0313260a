mod executions;
mod routines;

pub use executions::PostgresExecutionRepo;
pub use routines::PostgresRoutineRepo;

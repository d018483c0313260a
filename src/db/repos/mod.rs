mod executions;
mod routines;

pub use executions::*;
pub use routines::*;

mod execution;
mod progress;
mod routine;

pub use execution::*;
pub use progress::*;
pub use routine::*;

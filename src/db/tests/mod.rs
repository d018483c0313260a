//! Shared database repository test infrastructure
//!
//! Each repository has a test module containing shared test functions that
//! take `&dyn XxxRepo`, instantiated twice:
//!
//! - **SQLite**: in-memory databases with real migrations, run with every `cargo test`
//! - **PostgreSQL**: testcontainers-backed schemas, marked `#[ignore]`
//!
//! ```bash
//! cargo test                       # Run fast SQLite tests only
//! cargo test -- --ignored          # Run PostgreSQL integration tests (requires Docker)
//! cargo test -- --include-ignored  # Run all tests
//! ```

mod executions;
pub mod harness;

//! Database readiness wait used as a container startup pre-step.
//! Shared by the `wait-for-db` binary and its tests.

pub mod config;
pub mod error;
pub mod infra;
pub mod waiter;

pub use config::db::{database_url, sanitize_db_url};
pub use config::wait::WaitPolicy;
pub use error::{DbReadyError, ProbeError};
pub use infra::db::probe::{classify_db_err, ProbedConnection, SeaOrmProvider};
pub use waiter::{
    wait_for_database, ConnectionProvider, DbWaiter, Pause, Readiness, ThreadSleep, WaitState,
};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    db_ready_test_support::logging::init();
}

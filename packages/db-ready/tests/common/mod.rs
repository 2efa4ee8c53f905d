#![allow(dead_code)]

use std::time::Duration;

use db_ready::WaitPolicy;

// Logging is auto-installed for every test binary that includes this module
#[ctor::ctor]
fn init_logging() {
    db_ready_test_support::logging::init();
}

/// Default policy with an interval short enough that a real sleep would still be cheap.
pub fn fast_policy() -> WaitPolicy {
    WaitPolicy::default().with_interval(Duration::from_millis(10))
}

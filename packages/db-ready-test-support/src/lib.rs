//! Test support for the readiness waiter
//!
//! Scripted providers and pauses that let tests count attempts and delays
//! without touching a real database or the wall clock, plus the shared
//! logging bootstrap.

pub mod logging;
pub mod scripted;

pub use scripted::{CallCount, PauseLog, RecordingPause, ScriptedProvider};

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use db_ready::{ConnectionProvider, Pause, ProbeError};

/// Shared view of how many times a [`ScriptedProvider`] was asked to connect.
#[derive(Debug, Clone, Default)]
pub struct CallCount(Arc<AtomicU32>);

impl CallCount {
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) -> u32 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Provider that replays a fixed list of outcomes.
///
/// Once the script runs out, every further call repeats `fallback`.
pub struct ScriptedProvider {
    script: VecDeque<Result<(), ProbeError>>,
    fallback: Result<(), ProbeError>,
    calls: CallCount,
}

impl ScriptedProvider {
    pub fn new(script: impl IntoIterator<Item = Result<(), ProbeError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: Ok(()),
            calls: CallCount::default(),
        }
    }

    /// `failures` transient errors, then success.
    pub fn unavailable_then_ready(failures: usize) -> Self {
        Self::new(
            std::iter::repeat_with(|| Err(ProbeError::unavailable("connection refused")))
                .take(failures),
        )
    }

    /// Never becomes ready.
    pub fn always_unavailable() -> Self {
        Self::new([]).with_fallback(Err(ProbeError::unavailable("connection refused")))
    }

    pub fn with_fallback(mut self, fallback: Result<(), ProbeError>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn calls(&self) -> CallCount {
        self.calls.clone()
    }
}

impl ConnectionProvider for ScriptedProvider {
    type Handle = u32;

    /// The handle is the 1-based attempt number that succeeded.
    fn connect(&mut self) -> Result<u32, ProbeError> {
        let attempt = self.calls.bump();
        let outcome = self
            .script
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        outcome.map(|()| attempt)
    }
}

/// Shared record of every interval handed to a [`RecordingPause`].
#[derive(Debug, Clone, Default)]
pub struct PauseLog(Arc<Mutex<Vec<Duration>>>);

impl PauseLog {
    pub fn intervals(&self) -> Vec<Duration> {
        self.0.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.intervals().len()
    }
}

/// Pause that records the requested interval and returns immediately.
#[derive(Debug, Clone, Default)]
pub struct RecordingPause {
    log: PauseLog,
}

impl RecordingPause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> PauseLog {
        self.log.clone()
    }
}

impl Pause for RecordingPause {
    fn pause(&mut self, interval: Duration) {
        if let Ok(mut intervals) = self.log.0.lock() {
            intervals.push(interval);
        }
    }
}

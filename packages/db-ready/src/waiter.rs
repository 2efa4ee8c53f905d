//! Blocking readiness wait for the database.
//!
//! The waiter polls a [`ConnectionProvider`] until one attempt succeeds. Only
//! [`ProbeError::Unavailable`] is retried, after a fixed pause. Anything else
//! ends the wait immediately.

use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::wait::WaitPolicy;
use crate::error::{DbReadyError, ProbeError};

/// The one capability the waiter needs from the database collaborator.
pub trait ConnectionProvider {
    /// Opaque handle. The waiter drops it as soon as it is obtained.
    type Handle;

    fn connect(&mut self) -> Result<Self::Handle, ProbeError>;
}

impl<F, H> ConnectionProvider for F
where
    F: FnMut() -> Result<H, ProbeError>,
{
    type Handle = H;

    fn connect(&mut self) -> Result<H, ProbeError> {
        self()
    }
}

/// Blocking delay between attempts.
pub trait Pause {
    fn pause(&mut self, interval: Duration);
}

impl<F> Pause for F
where
    F: FnMut(Duration),
{
    fn pause(&mut self, interval: Duration) {
        self(interval)
    }
}

/// Blocks the calling thread for the full interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Pause for ThreadSleep {
    fn pause(&mut self, interval: Duration) {
        std::thread::sleep(interval);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Probing,
    Waiting,
    Ready,
}

/// Returned once the database accepted a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    /// Connection attempts made, including the successful one.
    pub attempts: u32,
    /// Total time handed to the pause between attempts.
    pub waited: Duration,
}

/// Builder-style waiter. See [`wait_for_database`] for the default setup.
pub struct DbWaiter<P, S = ThreadSleep> {
    provider: P,
    pause: S,
    policy: WaitPolicy,
}

impl<P> DbWaiter<P, ThreadSleep>
where
    P: ConnectionProvider,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            pause: ThreadSleep,
            policy: WaitPolicy::default(),
        }
    }
}

impl<P, S> DbWaiter<P, S>
where
    P: ConnectionProvider,
    S: Pause,
{
    pub fn with_pause<T: Pause>(self, pause: T) -> DbWaiter<P, T> {
        DbWaiter {
            provider: self.provider,
            pause,
            policy: self.policy,
        }
    }

    pub fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Block until the provider hands out a connection.
    pub fn wait(mut self) -> Result<Readiness, DbReadyError> {
        self.policy.validate()?;

        let interval = self.policy.interval;
        let start = Instant::now();
        let mut attempts: u32 = 0;
        let mut waited = Duration::ZERO;
        let mut state = WaitState::Probing;

        info!(
            interval_ms = interval.as_millis() as u64,
            max_attempts = ?self.policy.max_attempts,
            timeout_ms = ?self.policy.timeout.map(|t| t.as_millis() as u64),
            "Waiting for database..."
        );

        loop {
            match state {
                WaitState::Probing => {
                    attempts = attempts.saturating_add(1);

                    match self.provider.connect() {
                        Ok(handle) => {
                            drop(handle);
                            state = WaitState::Ready;
                        }
                        Err(ProbeError::Unavailable { message }) => {
                            if self.exhausted(attempts, start.elapsed()) {
                                error!(
                                    attempts,
                                    elapsed_ms = start.elapsed().as_millis() as u64,
                                    "db_wait=gave_up"
                                );
                                return Err(DbReadyError::GaveUp {
                                    attempts,
                                    last_error: message,
                                });
                            }
                            warn!(
                                attempt = attempts,
                                interval_ms = interval.as_millis() as u64,
                                reason = %message,
                                "Database unavailable, waiting before retry"
                            );
                            state = WaitState::Waiting;
                        }
                        Err(ProbeError::Fatal { message }) => {
                            error!(attempt = attempts, reason = %message, "db_wait=fatal");
                            return Err(DbReadyError::Fatal { message });
                        }
                    }
                }
                WaitState::Waiting => {
                    self.pause.pause(interval);
                    waited += interval;
                    debug!(
                        attempt = attempts,
                        waited_ms = waited.as_millis() as u64,
                        "db_wait=retry"
                    );
                    state = WaitState::Probing;
                }
                WaitState::Ready => {
                    info!(
                        attempts,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Database available!"
                    );
                    return Ok(Readiness { attempts, waited });
                }
            }
        }
    }

    /// Whether a configured bound forbids another pause after `attempts` failures.
    fn exhausted(&self, attempts: u32, elapsed: Duration) -> bool {
        if let Some(max) = self.policy.max_attempts {
            if attempts >= max {
                return true;
            }
        }
        if let Some(timeout) = self.policy.timeout {
            if elapsed.saturating_add(self.policy.interval) > timeout {
                return true;
            }
        }
        false
    }
}

/// Wait for the database with the default policy: one second between
/// attempts, no attempt cap, no timeout, real thread sleep.
pub fn wait_for_database<P>(provider: P) -> Result<Readiness, DbReadyError>
where
    P: ConnectionProvider,
{
    DbWaiter::new(provider).wait()
}

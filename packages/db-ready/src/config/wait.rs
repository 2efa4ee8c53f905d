use std::time::Duration;

use super::opt_u64;
use crate::error::DbReadyError;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Retry policy for the readiness wait.
///
/// The default polls every second with no attempt cap and no timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Fixed pause between attempts. Never grows.
    pub interval: Duration,
    /// Give up after this many attempts. `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Give up once this much wall-clock time would be exceeded. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            max_attempts: None,
            timeout: None,
        }
    }
}

impl WaitPolicy {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read the policy from `DB_WAIT_INTERVAL_MS`, `DB_WAIT_MAX_ATTEMPTS`
    /// and `DB_WAIT_TIMEOUT_MS`. Unset variables keep the defaults.
    pub fn from_env() -> Result<Self, DbReadyError> {
        let mut policy = WaitPolicy::default();

        if let Some(ms) = opt_u64("DB_WAIT_INTERVAL_MS")? {
            policy.interval = Duration::from_millis(ms);
        }
        if let Some(n) = opt_u64("DB_WAIT_MAX_ATTEMPTS")? {
            let n = u32::try_from(n).map_err(|_| {
                DbReadyError::config(format!("DB_WAIT_MAX_ATTEMPTS is too large: {n}"))
            })?;
            policy.max_attempts = Some(n);
        }
        if let Some(ms) = opt_u64("DB_WAIT_TIMEOUT_MS")? {
            policy.timeout = Some(Duration::from_millis(ms));
        }

        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), DbReadyError> {
        if self.interval.is_zero() {
            return Err(DbReadyError::config(
                "wait interval must be greater than zero",
            ));
        }
        if self.max_attempts == Some(0) {
            return Err(DbReadyError::config(
                "max attempts must be at least 1 when set",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::time::Duration;

    use serial_test::serial;

    use super::WaitPolicy;

    fn clear_wait_env() {
        env::remove_var("DB_WAIT_INTERVAL_MS");
        env::remove_var("DB_WAIT_MAX_ATTEMPTS");
        env::remove_var("DB_WAIT_TIMEOUT_MS");
    }

    #[test]
    fn test_default_is_one_second_unbounded() {
        let policy = WaitPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(1));
        assert_eq!(policy.max_attempts, None);
        assert_eq!(policy.timeout, None);
    }

    #[test]
    #[serial]
    fn test_from_env_defaults_when_unset() {
        clear_wait_env();
        assert_eq!(WaitPolicy::from_env().unwrap(), WaitPolicy::default());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_all_knobs() {
        clear_wait_env();
        env::set_var("DB_WAIT_INTERVAL_MS", "250");
        env::set_var("DB_WAIT_MAX_ATTEMPTS", "40");
        env::set_var("DB_WAIT_TIMEOUT_MS", "10000");

        let policy = WaitPolicy::from_env().unwrap();
        assert_eq!(policy.interval, Duration::from_millis(250));
        assert_eq!(policy.max_attempts, Some(40));
        assert_eq!(policy.timeout, Some(Duration::from_secs(10)));

        clear_wait_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_garbage() {
        clear_wait_env();
        env::set_var("DB_WAIT_INTERVAL_MS", "soon");

        let err = WaitPolicy::from_env().unwrap_err();
        assert!(err.to_string().contains("DB_WAIT_INTERVAL_MS"));

        clear_wait_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_zero_interval() {
        clear_wait_env();
        env::set_var("DB_WAIT_INTERVAL_MS", "0");

        assert!(WaitPolicy::from_env().is_err());

        clear_wait_env();
    }

    #[test]
    fn test_zero_max_attempts_is_invalid() {
        let policy = WaitPolicy::default().with_max_attempts(0);
        assert!(policy.validate().is_err());
    }
}

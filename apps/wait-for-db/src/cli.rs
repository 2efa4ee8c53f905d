use std::time::Duration;

use clap::Parser;
use db_ready::{database_url, DbReadyError, WaitPolicy};

#[derive(Parser, Debug)]
#[command(name = "wait-for-db")]
#[command(about = "Block until the database accepts connections")]
pub struct Args {
    /// Database URL (defaults to DATABASE_URL or the POSTGRES_* variables)
    #[arg(long, value_name = "URL")]
    pub database_url: Option<String>,

    /// Pause between attempts in milliseconds (defaults to DB_WAIT_INTERVAL_MS or 1000)
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Give up after this many attempts (defaults to DB_WAIT_MAX_ATTEMPTS, unbounded if unset)
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Give up after this many milliseconds (defaults to DB_WAIT_TIMEOUT_MS, unbounded if unset)
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Per-attempt connect timeout in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 2000)]
    pub connect_timeout_ms: u64,
}

/// Resolved invocation: flags first, environment second.
#[derive(Debug)]
pub struct Invocation {
    pub url: String,
    pub policy: WaitPolicy,
    pub connect_timeout: Duration,
}

impl Args {
    pub fn resolve(self) -> Result<Invocation, DbReadyError> {
        let url = match self.database_url {
            Some(url) => url,
            None => database_url()?,
        };

        let mut policy = WaitPolicy::from_env()?;
        if let Some(ms) = self.interval_ms {
            policy.interval = Duration::from_millis(ms);
        }
        if let Some(n) = self.max_attempts {
            policy.max_attempts = Some(n);
        }
        if let Some(ms) = self.timeout_ms {
            policy.timeout = Some(Duration::from_millis(ms));
        }
        policy.validate()?;

        if self.connect_timeout_ms == 0 {
            return Err(DbReadyError::config(
                "connect timeout must be greater than zero",
            ));
        }

        Ok(Invocation {
            url,
            policy,
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::time::Duration;

    use clap::Parser;
    use serial_test::serial;

    use super::Args;

    fn clear_env() {
        for name in [
            "DATABASE_URL",
            "POSTGRES_DB",
            "POSTGRES_USER",
            "POSTGRES_PASSWORD",
            "POSTGRES_HOST",
            "POSTGRES_PORT",
            "DB_WAIT_INTERVAL_MS",
            "DB_WAIT_MAX_ATTEMPTS",
            "DB_WAIT_TIMEOUT_MS",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_no_arguments_reads_environment() {
        clear_env();
        env::set_var("DATABASE_URL", "postgresql://app:pw@db:5432/app");

        let invocation = Args::try_parse_from(["wait-for-db"])
            .unwrap()
            .resolve()
            .unwrap();

        assert_eq!(invocation.url, "postgresql://app:pw@db:5432/app");
        assert_eq!(invocation.policy.interval, Duration::from_secs(1));
        assert_eq!(invocation.policy.max_attempts, None);
        assert_eq!(invocation.policy.timeout, None);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_flags_override_environment() {
        clear_env();
        env::set_var("DATABASE_URL", "postgresql://app:pw@db:5432/app");
        env::set_var("DB_WAIT_INTERVAL_MS", "5000");
        env::set_var("DB_WAIT_MAX_ATTEMPTS", "3");

        let invocation = Args::try_parse_from([
            "wait-for-db",
            "--database-url",
            "sqlite::memory:",
            "--interval-ms",
            "100",
            "--timeout-ms",
            "30000",
        ])
        .unwrap()
        .resolve()
        .unwrap();

        assert_eq!(invocation.url, "sqlite::memory:");
        assert_eq!(invocation.policy.interval, Duration::from_millis(100));
        assert_eq!(invocation.policy.max_attempts, Some(3));
        assert_eq!(invocation.policy.timeout, Some(Duration::from_secs(30)));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_configuration_is_config_error() {
        clear_env();

        let err = Args::try_parse_from(["wait-for-db"])
            .unwrap()
            .resolve()
            .unwrap_err();

        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("POSTGRES_DB"));
    }

    #[test]
    #[serial]
    fn test_zero_interval_flag_rejected() {
        clear_env();

        let err = Args::try_parse_from([
            "wait-for-db",
            "--database-url",
            "sqlite::memory:",
            "--interval-ms",
            "0",
        ])
        .unwrap()
        .resolve()
        .unwrap_err();

        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    #[serial]
    fn test_connect_timeout_flag() {
        clear_env();

        let invocation = Args::try_parse_from([
            "wait-for-db",
            "--database-url",
            "sqlite::memory:",
            "--connect-timeout-ms",
            "750",
        ])
        .unwrap()
        .resolve()
        .unwrap();
        assert_eq!(invocation.connect_timeout, Duration::from_millis(750));

        let err = Args::try_parse_from([
            "wait-for-db",
            "--database-url",
            "sqlite::memory:",
            "--connect-timeout-ms",
            "0",
        ])
        .unwrap()
        .resolve()
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_non_numeric_flag_is_usage_error() {
        assert!(Args::try_parse_from(["wait-for-db", "--max-attempts", "many"]).is_err());
    }
}

pub mod db;
pub mod wait;

use std::env;

use crate::error::DbReadyError;

/// Get required environment variable or return error
pub(crate) fn must_var(name: &str) -> Result<String, DbReadyError> {
    env::var(name).map_err(|_| {
        DbReadyError::config(format!("Required environment variable '{name}' is not set"))
    })
}

/// Parse an optional numeric environment variable
pub(crate) fn opt_u64(name: &str) -> Result<Option<u64>, DbReadyError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<u64>().map(Some).map_err(|_| {
            DbReadyError::config(format!(
                "Environment variable '{name}' must be a non-negative integer, got '{raw}'"
            ))
        }),
        Err(_) => Ok(None),
    }
}

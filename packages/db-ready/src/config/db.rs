use std::env;

use super::must_var;
use crate::error::DbReadyError;

/// Resolve the database URL from the environment.
///
/// `DATABASE_URL` wins when set. Otherwise the URL is composed from the
/// `POSTGRES_*` variables the database container is started with.
pub fn database_url() -> Result<String, DbReadyError> {
    if let Ok(url) = env::var("DATABASE_URL") {
        if !url.trim().is_empty() {
            return Ok(url);
        }
    }

    let host = host();
    let port = port()?;
    let db_name = must_var("POSTGRES_DB")?;
    let username = must_var("POSTGRES_USER")?;
    let password = must_var("POSTGRES_PASSWORD")?;

    Ok(format!(
        "postgresql://{username}:{password}@{host}:{port}/{db_name}"
    ))
}

/// Get database host from environment (defaults to localhost)
fn host() -> String {
    env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string())
}

/// Get database port from environment (defaults to 5432)
fn port() -> Result<u16, DbReadyError> {
    match env::var("POSTGRES_PORT") {
        Ok(raw) => raw.parse::<u16>().map_err(|_| {
            DbReadyError::config(format!("POSTGRES_PORT must be a valid port number, got '{raw}'"))
        }),
        Err(_) => Ok(5432),
    }
}

/// Sanitize database URL by masking password in connection strings.
/// Used for logging.
pub fn sanitize_db_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    // Authority ends at the first path, query or fragment delimiter.
    let authority_end = rest
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);
    let Some((credentials, host)) = authority.rsplit_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}{tail}"),
        None => url.to_string(),
    }
}

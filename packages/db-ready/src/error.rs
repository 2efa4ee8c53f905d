use thiserror::Error;

/// Outcome of a single failed connection attempt, as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The database is not accepting connections yet. Retried.
    #[error("Database unavailable: {message}")]
    Unavailable { message: String },
    /// Anything else. Never retried.
    #[error("Database probe failed: {message}")]
    Fatal { message: String },
}

impl ProbeError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        ProbeError::Unavailable {
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        ProbeError::Fatal {
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, ProbeError::Unavailable { .. })
    }
}

#[derive(Debug, Error)]
pub enum DbReadyError {
    #[error("Configuration error: {message}")]
    Config { message: String },
    #[error("Database connection failed: {message}")]
    Fatal { message: String },
    #[error("Database still unavailable after {attempts} attempts: {last_error}")]
    GaveUp { attempts: u32, last_error: String },
}

impl DbReadyError {
    pub fn config(message: impl Into<String>) -> Self {
        DbReadyError::Config {
            message: message.into(),
        }
    }

    /// Process exit code for the startup command.
    pub fn exit_code(&self) -> i32 {
        match self {
            DbReadyError::Config { .. } => 2,
            DbReadyError::Fatal { .. } | DbReadyError::GaveUp { .. } => 1,
        }
    }
}

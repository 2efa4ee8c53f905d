use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DbErr, RuntimeErr};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, trace};

use crate::config::db::sanitize_db_url;
use crate::error::{DbReadyError, ProbeError};
use crate::waiter::ConnectionProvider;

/// Postgres `cannot_connect_now`: "the database system is starting up".
const PG_CANNOT_CONNECT_NOW: &str = "57P03";
/// Postgres `too_many_connections`.
const PG_TOO_MANY_CONNECTIONS: &str = "53300";
/// SQLite `SQLITE_BUSY`.
const SQLITE_BUSY: &str = "5";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// Proof of a successful probe. The pool it came from is already closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbedConnection {
    pub backend: DatabaseBackend,
}

/// Connection provider backed by sea-orm.
///
/// Each attempt opens a single-connection pool, pings it and closes it again,
/// all on a private current-thread runtime so callers stay synchronous.
pub struct SeaOrmProvider {
    url: String,
    connect_timeout: Duration,
    runtime: Runtime,
}

impl SeaOrmProvider {
    pub fn new(url: impl Into<String>) -> Result<Self, DbReadyError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DbReadyError::Fatal {
                message: format!("failed to start probe runtime: {e}"),
            })?;

        Ok(Self {
            url: url.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            runtime,
        })
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    fn connect_options(&self) -> ConnectOptions {
        let mut opt = ConnectOptions::new(self.url.clone());
        opt.min_connections(1)
            .max_connections(1)
            .connect_timeout(self.connect_timeout)
            .acquire_timeout(self.connect_timeout)
            .sqlx_logging(false);
        opt
    }
}

impl ConnectionProvider for SeaOrmProvider {
    type Handle = ProbedConnection;

    fn connect(&mut self) -> Result<ProbedConnection, ProbeError> {
        let opt = self.connect_options();

        trace!(url = %sanitize_db_url(&self.url), "db_probe=connect");

        self.runtime.block_on(async move {
            let conn = Database::connect(opt).await.map_err(classify_db_err)?;
            let backend = conn.get_database_backend();

            let ping = conn.ping().await;
            if let Err(e) = conn.close().await {
                debug!(error = %e, "db_probe=close_failed");
            }
            ping.map_err(classify_db_err)?;

            Ok::<_, ProbeError>(ProbedConnection { backend })
        })
    }
}

/// Translate a `DbErr` into a retry decision.
///
/// Only failures that mean "not accepting connections yet" are transient.
/// Authentication failures, unknown databases and bad URLs are fatal.
pub fn classify_db_err(e: DbErr) -> ProbeError {
    let message = e.to_string();

    match &e {
        DbErr::ConnectionAcquire(_) => ProbeError::Unavailable { message },
        DbErr::Conn(RuntimeErr::SqlxError(err))
        | DbErr::Exec(RuntimeErr::SqlxError(err))
        | DbErr::Query(RuntimeErr::SqlxError(err)) => classify_sqlx_err(err, message),
        _ if mentions_sqlstate(&message, PG_CANNOT_CONNECT_NOW)
            || message.contains("the database system is starting up") =>
        {
            ProbeError::Unavailable { message }
        }
        _ => ProbeError::Fatal { message },
    }
}

fn classify_sqlx_err(err: &sqlx::Error, message: String) -> ProbeError {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::WorkerCrashed => {
            ProbeError::Unavailable { message }
        }
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some(PG_CANNOT_CONNECT_NOW) | Some(PG_TOO_MANY_CONNECTIONS) | Some(SQLITE_BUSY) => {
                ProbeError::Unavailable { message }
            }
            _ if message.contains("database is locked") => ProbeError::Unavailable { message },
            _ => ProbeError::Fatal { message },
        },
        _ => ProbeError::Fatal { message },
    }
}

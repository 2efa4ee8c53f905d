pub mod probe;

pub use probe::{classify_db_err, ProbedConnection, SeaOrmProvider};

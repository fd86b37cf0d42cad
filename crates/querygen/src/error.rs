//! Errors raised while building or executing statements.

use thiserror::Error;
use tokio_postgres::error::SqlState;

pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
    /// The generator was used in a way that can never succeed
    /// (no pending statement, empty SET list, empty bulk input).
    #[error("Misuse: {0}")]
    Misuse(String),

    /// What the plain `exec_*` methods report for any failure.
    ///
    /// Carries the underlying message and the statement text that was sent.
    #[error("Unexpected error: {message} Query: {query}")]
    Unexpected { message: String, query: String },

    /// The URL was malformed or the connection dropped.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Any driver error without a more specific variant.
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// A single-row fetch matched nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A single-row fetch matched more rows than it may decode.
    #[error("Expected {expected} row(s), got {got}")]
    TooManyRows { expected: usize, got: usize },

    /// SQLSTATE 23505, as `<constraint>: <message>`.
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// SQLSTATE 23503, as `<constraint>: <message>`.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// SQLSTATE 23514, as `<constraint>: <message>`.
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// A column could not be read into its field.
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Bad input to a builder or to configuration, e.g. an unknown sort direction.
    #[error("Validation error: {0}")]
    Validation(String),

    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// The configured statement timeout elapsed.
    #[error("Query timeout after {0:?}")]
    Timeout(std::time::Duration),
}

impl QueryError {
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn too_many_rows(expected: usize, got: usize) -> Self {
        Self::TooManyRows { expected, got }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn misuse(message: impl Into<String>) -> Self {
        Self::Misuse(message.into())
    }

    /// Wrap any error as the "unexpected" failure of `query`.
    pub fn unexpected(err: impl std::fmt::Display, query: impl Into<String>) -> Self {
        Self::Unexpected {
            message: err.to_string(),
            query: query.into(),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_too_many_rows(&self) -> bool {
        matches!(self, Self::TooManyRows { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    pub fn is_misuse(&self) -> bool {
        matches!(self, Self::Misuse(_))
    }

    /// Classify a driver error by SQLSTATE, falling back to
    /// [`QueryError::Connection`] for closed connections and
    /// [`QueryError::Query`] otherwise.
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db) = err.as_db_error() {
            let detail = || {
                format!(
                    "{}: {}",
                    db.constraint().unwrap_or("unknown"),
                    db.message()
                )
            };
            let code = db.code();
            if *code == SqlState::UNIQUE_VIOLATION {
                return Self::UniqueViolation(detail());
            }
            if *code == SqlState::FOREIGN_KEY_VIOLATION {
                return Self::ForeignKeyViolation(detail());
            }
            if *code == SqlState::CHECK_VIOLATION {
                return Self::CheckViolation(detail());
            }
        }
        if err.is_closed() {
            return Self::Connection(err.to_string());
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for QueryError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

//! Hooks around statement execution.
//!
//! A [`QueryHook`] sees every statement the execution adapter sends, before
//! and after it runs. [`TracingSqlHook`] (feature `tracing`) logs them.

use crate::generator::StatementKind;
use std::fmt;
use std::time::Duration;

/// Maximum length for error messages in [`QueryOutcome::Error`].
const MAX_ERROR_LEN: usize = 512;

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// What is about to run.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// Table the generator is bound to.
    pub table: String,
    /// The statement text actually sent.
    pub sql: String,
    /// How the statement was built.
    pub kind: StatementKind,
}

impl QueryContext {
    pub fn new(table: impl Into<String>, sql: impl Into<String>, kind: StatementKind) -> Self {
        Self {
            table: table.into(),
            sql: sql.into(),
            kind,
        }
    }
}

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Rows returned.
    Rows(usize),
    /// Rows affected by a mutation.
    Affected(u64),
    /// The statement failed (message truncated to 512 bytes).
    Error(String),
}

impl QueryOutcome {
    /// Create an error outcome, truncating the message.
    pub fn error(msg: impl fmt::Display) -> Self {
        let msg = msg.to_string();
        if msg.len() > MAX_ERROR_LEN {
            Self::Error(format!("{}...", truncate_sql_bytes(&msg, MAX_ERROR_LEN)))
        } else {
            Self::Error(msg)
        }
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutcome::Rows(n) => write!(f, "{n} rows"),
            QueryOutcome::Affected(n) => write!(f, "{n} affected"),
            QueryOutcome::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Observer of the execute lifecycle.
pub trait QueryHook: Send + Sync {
    /// Called before the statement is sent.
    fn before_query(&self, _ctx: &QueryContext) {}

    /// Called after the statement completed or failed.
    fn after_query(&self, _ctx: &QueryContext, _duration: Duration, _outcome: &QueryOutcome) {}
}

#[cfg(feature = "tracing")]
pub use tracing_hook::TracingSqlHook;

#[cfg(feature = "tracing")]
mod tracing_hook {
    use super::{QueryContext, QueryHook, QueryOutcome, truncate_sql_bytes};
    use std::time::Duration;

    /// Logs statements at `DEBUG` and failures at `WARN`, under target
    /// `querygen.sql`.
    #[derive(Debug, Clone)]
    pub struct TracingSqlHook {
        /// Statements longer than this many bytes are cut. `None` keeps them whole.
        pub max_sql_length: Option<usize>,
    }

    impl Default for TracingSqlHook {
        fn default() -> Self {
            Self {
                max_sql_length: Some(200),
            }
        }
    }

    impl TracingSqlHook {
        pub(crate) fn shorten<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
            match self.max_sql_length {
                Some(limit) if sql.len() > limit => {
                    format!("{}...", truncate_sql_bytes(sql, limit)).into()
                }
                _ => sql.into(),
            }
        }
    }

    impl QueryHook for TracingSqlHook {
        fn before_query(&self, ctx: &QueryContext) {
            tracing::debug!(
                target: "querygen.sql",
                kind = ?ctx.kind,
                table = %ctx.table,
                sql = %self.shorten(&ctx.sql),
            );
        }

        fn after_query(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome) {
            let elapsed_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
            match outcome {
                QueryOutcome::Error(message) => tracing::warn!(
                    target: "querygen.sql",
                    kind = ?ctx.kind,
                    table = %ctx.table,
                    elapsed_ms,
                    sql = %self.shorten(&ctx.sql),
                    error = %message,
                    "statement failed"
                ),
                _ => tracing::trace!(
                    target: "querygen.sql",
                    kind = ?ctx.kind,
                    elapsed_ms,
                    %outcome,
                ),
            }
        }
    }
}

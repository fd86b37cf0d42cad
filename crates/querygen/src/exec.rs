//! Execution adapter.
//!
//! Each method consumes the pending statement (exactly like
//! [`Generator::to_text`]), sends it through a [`GenericClient`] and maps the
//! result. The plain variants report every failure as
//! [`QueryError::Unexpected`] carrying the statement text; the `try_` variants
//! keep the classified error and report a missing row as
//! [`QueryError::NotFound`]. A configured timeout surfaces as
//! [`QueryError::Timeout`] from both.

use crate::client::GenericClient;
use crate::config::GeneratorConfig;
use crate::dialect::Dialect;
use crate::entity::Entity;
use crate::error::{QueryError, QueryResult};
use crate::generator::{Generator, StatementKind};
use crate::monitor::{QueryContext, QueryOutcome};
use crate::row::{FromRow, first_i64};
use std::future::Future;
use std::time::Instant;
use tokio_postgres::Row;

/// Run `fut` under the configured timeout, reporting to the configured hook.
async fn observe<T, F>(
    config: &GeneratorConfig,
    table: &str,
    kind: StatementKind,
    sql: &str,
    fut: F,
    describe: fn(&T) -> QueryOutcome,
) -> QueryResult<T>
where
    F: Future<Output = QueryResult<T>>,
{
    let ctx = config
        .hook
        .as_ref()
        .map(|_| QueryContext::new(table, sql, kind));
    if let (Some(hook), Some(ctx)) = (&config.hook, &ctx) {
        hook.before_query(ctx);
    }

    let start = Instant::now();
    let result = match config.query_timeout {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(QueryError::Timeout(limit)),
        },
        None => fut.await,
    };

    if let (Some(hook), Some(ctx)) = (&config.hook, &ctx) {
        let outcome = match &result {
            Ok(value) => describe(value),
            Err(err) => QueryOutcome::error(err),
        };
        hook.after_query(ctx, start.elapsed(), &outcome);
    }
    result
}

fn rows_outcome(rows: &Vec<Row>) -> QueryOutcome {
    QueryOutcome::Rows(rows.len())
}

fn affected_outcome(affected: &u64) -> QueryOutcome {
    QueryOutcome::Affected(*affected)
}

fn batch_outcome(_: &()) -> QueryOutcome {
    QueryOutcome::Affected(0)
}

/// Collapse a classified error into the service-level "unexpected" error.
///
/// Timeouts keep their own kind so callers can ask the client to retry.
fn unexpected(err: QueryError, sql: &str) -> QueryError {
    match err {
        QueryError::Timeout(_) | QueryError::Unexpected { .. } => err,
        other => QueryError::unexpected(other, sql),
    }
}

impl<E: Entity> Generator<E> {
    fn take_for_exec(&mut self) -> QueryResult<(StatementKind, String)> {
        if self.is_empty() {
            self.pending = None;
            return Err(QueryError::misuse("no query to execute"));
        }
        Ok(self.take_statement())
    }

    async fn fetch(
        &self,
        client: &impl GenericClient,
        kind: StatementKind,
        sql: &str,
    ) -> QueryResult<Vec<Row>> {
        observe(
            &self.config,
            &self.table,
            kind,
            sql,
            client.query(sql, &[]),
            rows_outcome,
        )
        .await
    }

    /// Run the pending non-row-returning statement.
    ///
    /// Returns the generated id for a single-row insert on Postgres when the
    /// entity has an identity column (the id is also written into the owned
    /// row), and `0` otherwise.
    pub async fn try_exec_mutation(&mut self, client: &impl GenericClient) -> QueryResult<i64> {
        let (kind, sql) = self.take_for_exec()?;

        match (kind, E::ID_COLUMN) {
            (StatementKind::Atomic, _) => {
                observe(
                    &self.config,
                    &self.table,
                    kind,
                    &sql,
                    client.batch_execute(&sql),
                    batch_outcome,
                )
                .await?;
                Ok(0)
            }
            (StatementKind::Insert, Some(id_column)) if self.config.dialect == Dialect::Postgres => {
                let sql = format!("{} RETURNING {id_column}", sql.trim_end_matches(';'));
                let rows = self.fetch(client, kind, &sql).await?;
                let Some(row) = rows.first() else {
                    return Ok(0);
                };
                let id = first_i64(row)?;
                if let Some(slot) = self.row.id_slot() {
                    *slot = id;
                }
                Ok(id)
            }
            _ => {
                observe(
                    &self.config,
                    &self.table,
                    kind,
                    &sql,
                    client.execute(&sql, &[]),
                    affected_outcome,
                )
                .await?;
                Ok(0)
            }
        }
    }

    /// Like [`Generator::try_exec_mutation`], reporting failures as
    /// [`QueryError::Unexpected`].
    pub async fn exec_mutation(&mut self, client: &impl GenericClient) -> QueryResult<i64> {
        let sql = self.pending().unwrap_or_default().to_string();
        self.try_exec_mutation(client)
            .await
            .map_err(|e| unexpected_unless_misuse(e, &sql))
    }

    /// Count rows with the pending statement, reading the first column of the
    /// first row.
    pub async fn exec_count(&mut self, client: &impl GenericClient) -> QueryResult<i64> {
        let (kind, sql) = self.take_for_exec()?;
        let rows = self
            .fetch(client, kind, &sql)
            .await
            .map_err(|e| unexpected(e, &sql))?;
        let row = rows
            .first()
            .ok_or_else(|| QueryError::unexpected("count returned no rows", &sql))?;
        first_i64(row).map_err(|e| unexpected(e, &sql))
    }

    /// Fetch every row of the pending statement into `dest`.
    ///
    /// `dest` is replaced, not appended to, and left untouched on failure.
    /// Decoding is by column name; `T` does not have to be `E`.
    pub async fn try_exec_multi_row<T: FromRow>(
        &mut self,
        client: &impl GenericClient,
        dest: &mut Vec<T>,
    ) -> QueryResult<()> {
        let (kind, sql) = self.take_for_exec()?;
        let rows = self.fetch(client, kind, &sql).await?;
        let decoded = rows
            .iter()
            .map(T::from_row)
            .collect::<QueryResult<Vec<T>>>()?;
        *dest = decoded;
        Ok(())
    }

    /// Like [`Generator::try_exec_multi_row`], reporting failures as
    /// [`QueryError::Unexpected`].
    pub async fn exec_multi_row<T: FromRow>(
        &mut self,
        client: &impl GenericClient,
        dest: &mut Vec<T>,
    ) -> QueryResult<()> {
        let sql = self.pending().unwrap_or_default().to_string();
        self.try_exec_multi_row(client, dest)
            .await
            .map_err(|e| unexpected_unless_misuse(e, &sql))
    }
}

impl<E: Entity + FromRow> Generator<E> {
    /// Fetch one row with the pending statement and decode it onto the owned row.
    ///
    /// No row is [`QueryError::NotFound`]; more than one is
    /// [`QueryError::TooManyRows`] and leaves the owned row untouched. Fields
    /// the entity excludes from mapping are reset to their defaults.
    pub async fn try_exec_single_row(&mut self, client: &impl GenericClient) -> QueryResult<()> {
        let (kind, sql) = self.take_for_exec()?;
        let rows = self.fetch(client, kind, &sql).await?;
        let row = exactly_one(rows, &self.table)?;
        self.row = E::from_row(&row)?;
        Ok(())
    }

    /// Like [`Generator::try_exec_single_row`], reporting failures (including
    /// a missing row) as [`QueryError::Unexpected`].
    pub async fn exec_single_row(&mut self, client: &impl GenericClient) -> QueryResult<()> {
        let sql = self.pending().unwrap_or_default().to_string();
        self.try_exec_single_row(client)
            .await
            .map_err(|e| unexpected_unless_misuse(e, &sql))
    }
}

fn exactly_one<T>(rows: Vec<T>, table: &str) -> QueryResult<T> {
    match rows.len() {
        0 => Err(QueryError::not_found(format!("no rows in {table}"))),
        1 => rows
            .into_iter()
            .next()
            .ok_or_else(|| QueryError::not_found(format!("no rows in {table}"))),
        got => Err(QueryError::too_many_rows(1, got)),
    }
}

/// [`unexpected`], except that misuse of the generator is reported as such.
fn unexpected_unless_misuse(err: QueryError, sql: &str) -> QueryError {
    if err.is_misuse() {
        err
    } else {
        unexpected(err, &terminated(sql))
    }
}

fn terminated(sql: &str) -> String {
    if sql.ends_with(';') {
        sql.to_string()
    } else {
        format!("{sql};")
    }
}

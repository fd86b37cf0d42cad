//! Connection abstraction used by the execution adapter.

use crate::error::{QueryError, QueryResult};
use std::future::Future;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Anything a generated statement can be sent through.
///
/// Implemented for plain connections, pooled connections and transactions,
/// so one generator works against all of them. Statements built by a
/// [`Generator`](crate::Generator) embed their values as literals and are
/// sent with an empty parameter list. Driver errors come back classified by
/// [`QueryError::from_db_error`].
pub trait GenericClient: Send + Sync {
    /// Run a row-returning statement.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = QueryResult<Vec<Row>>> + Send;

    /// Run a statement and report the affected row count.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = QueryResult<u64>> + Send;

    /// Run `;`-separated statements over the simple query protocol.
    fn batch_execute(&self, sql: &str) -> impl Future<Output = QueryResult<()>> + Send;
}

/// Driver types: call the inherent method and classify its error.
macro_rules! impl_for_driver {
    ($($ty:ty),+ $(,)?) => {$(
        impl GenericClient for $ty {
            async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QueryResult<Vec<Row>> {
                <$ty>::query(self, sql, params)
                    .await
                    .map_err(QueryError::from_db_error)
            }

            async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QueryResult<u64> {
                <$ty>::execute(self, sql, params)
                    .await
                    .map_err(QueryError::from_db_error)
            }

            async fn batch_execute(&self, sql: &str) -> QueryResult<()> {
                <$ty>::batch_execute(self, sql)
                    .await
                    .map_err(QueryError::from_db_error)
            }
        }
    )+};
}

impl_for_driver!(tokio_postgres::Client, tokio_postgres::Transaction<'_>);

/// Pool wrappers: forward to the connection they dereference to.
#[cfg(feature = "pool")]
macro_rules! impl_for_deref {
    ($($ty:ty),+ $(,)?) => {$(
        impl GenericClient for $ty {
            async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QueryResult<Vec<Row>> {
                GenericClient::query(&**self, sql, params).await
            }

            async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QueryResult<u64> {
                GenericClient::execute(&**self, sql, params).await
            }

            async fn batch_execute(&self, sql: &str) -> QueryResult<()> {
                GenericClient::batch_execute(&**self, sql).await
            }
        }
    )+};
}

#[cfg(feature = "pool")]
impl_for_deref!(
    deadpool_postgres::Client,
    deadpool_postgres::ClientWrapper,
    deadpool_postgres::Transaction<'_>,
);

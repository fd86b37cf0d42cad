//! Row mapping traits

use crate::error::{QueryError, QueryResult};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Trait for converting a database row into a Rust struct.
///
/// Columns are matched by name, so the struct may list its fields in any
/// order relative to the `SELECT`. This trait should typically be derived
/// using `#[derive(FromRow)]` from the `querygen-derive` crate.
///
/// # Example
///
/// ```ignore
/// use querygen::FromRow;
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     phone_number: String,
///     email: Option<String>,
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> QueryResult<Self>;
}

/// Typed column access used by derived `FromRow` impls.
pub trait RowExt {
    /// Read `column`, reporting failures as [`QueryError::Decode`].
    fn try_get_column<T>(&self, column: &str) -> QueryResult<T>
    where
        T: for<'a> FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> QueryResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| QueryError::decode(column, e.to_string()))
    }
}

/// Read the first column of a row as an `i64`.
///
/// Accepts `bigint` and `integer` columns (counts, generated ids).
pub(crate) fn first_i64(row: &Row) -> QueryResult<i64> {
    let column = row
        .columns()
        .first()
        .map(|c| c.name().to_string())
        .ok_or_else(|| QueryError::decode("?column?", "row has no columns"))?;
    match row.try_get::<_, i64>(0) {
        Ok(count) => Ok(count),
        Err(_) => row
            .try_get::<_, i32>(0)
            .map(i64::from)
            .map_err(|e| QueryError::decode(column, e.to_string())),
    }
}

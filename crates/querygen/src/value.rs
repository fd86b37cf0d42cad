//! Literal values and their SQL text.
//!
//! Values are embedded into statements as literals, not bound as parameters.
//! Strings are escaped per [`Dialect`]; identifiers are never touched, so
//! table and column names passed to the generator must come from trusted code.

use crate::dialect::Dialect;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use std::fmt;

/// The SQL `NULL` literal.
pub const NULL: &str = "NULL";

/// A value that can be rendered as a SQL literal.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    /// Rendered in UTC with nanosecond precision.
    Timestamp(DateTime<Utc>),
    /// Any other value, already stringified. Rendered quoted.
    Other(String),
}

impl SqlValue {
    /// Wrap any displayable value; it is rendered as a quoted string.
    pub fn other(value: impl fmt::Display) -> Self {
        SqlValue::Other(value.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Render this value for `dialect`.
    ///
    /// With `nil_on_empty`, numeric zero and the empty string render as `NULL`.
    pub fn format(&self, nil_on_empty: bool, dialect: Dialect) -> String {
        format_value(self, nil_on_empty, dialect)
    }
}

/// Render `value` as a SQL literal. Never fails.
pub fn format_value(value: &SqlValue, nil_on_empty: bool, dialect: Dialect) -> String {
    match value {
        SqlValue::Null => NULL.to_string(),
        SqlValue::Bool(true) => "TRUE".to_string(),
        SqlValue::Bool(false) => "FALSE".to_string(),
        SqlValue::Int(0) | SqlValue::UInt(0) if nil_on_empty => NULL.to_string(),
        SqlValue::Float(f) if nil_on_empty && *f == 0.0 => NULL.to_string(),
        SqlValue::Int(i) => i.to_string(),
        SqlValue::UInt(u) => u.to_string(),
        SqlValue::Float(f) if f.is_nan() => "'NaN'".to_string(),
        SqlValue::Float(f) if f.is_infinite() && *f > 0.0 => "'Infinity'".to_string(),
        SqlValue::Float(f) if f.is_infinite() => "'-Infinity'".to_string(),
        SqlValue::Float(f) => f.to_string(),
        SqlValue::Timestamp(ts) => format!("'{}'", format_timestamp(ts)),
        SqlValue::Text(s) if nil_on_empty && s.is_empty() => NULL.to_string(),
        SqlValue::Text(s) | SqlValue::Other(s) => format!("'{}'", dialect.escape_str(s)),
    }
}

/// The fixed timestamp layout: RFC 3339, `Z` offset, nine fractional digits.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Conversion into [`SqlValue`] by reference.
///
/// Implemented for the scalar types entities usually hold. `#[derive(Entity)]`
/// calls this for every column field.
pub trait ToSqlValue {
    fn to_sql_value(&self) -> SqlValue;
}

impl<T: ToSqlValue + ?Sized> ToSqlValue for &T {
    fn to_sql_value(&self) -> SqlValue {
        (**self).to_sql_value()
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(&self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl<T: ToSqlValue + ?Sized> ToSqlValue for Box<T> {
    fn to_sql_value(&self) -> SqlValue {
        (**self).to_sql_value()
    }
}

macro_rules! impl_scalar {
    ($variant:ident as $cast:ty: $($ty:ty),+) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(&self) -> SqlValue {
                    SqlValue::$variant(*self as $cast)
                }
            }

            impl From<$ty> for SqlValue {
                fn from(v: $ty) -> Self {
                    SqlValue::$variant(v as $cast)
                }
            }
        )+
    };
}

impl_scalar!(Int as i64: i8, i16, i32, i64, isize);
impl_scalar!(UInt as u64: u8, u16, u32, u64, usize);
impl_scalar!(Float as f64: f32, f64);

impl ToSqlValue for bool {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }
}

impl ToSqlValue for str {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }
}

impl ToSqlValue for String {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl ToSqlValue for char {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }
}

impl<Tz: TimeZone> ToSqlValue for DateTime<Tz> {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Timestamp(self.with_timezone(&Utc))
    }
}

// Naive timestamps are taken to be UTC already.
impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Timestamp(self.and_utc())
    }
}

impl ToSqlValue for NaiveDate {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Other(self.format("%Y-%m-%d").to_string())
    }
}

impl ToSqlValue for uuid::Uuid {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Other(self.to_string())
    }
}

impl ToSqlValue for serde_json::Value {
    fn to_sql_value(&self) -> SqlValue {
        match self {
            serde_json::Value::Null => SqlValue::Null,
            other => SqlValue::Other(other.to_string()),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&String> for SqlValue {
    fn from(v: &String) -> Self {
        SqlValue::Text(v.clone())
    }
}

impl From<char> for SqlValue {
    fn from(v: char) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for SqlValue {
    fn from(v: DateTime<Tz>) -> Self {
        v.to_sql_value()
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        v.to_sql_value()
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        v.to_sql_value()
    }
}

impl From<uuid::Uuid> for SqlValue {
    fn from(v: uuid::Uuid) -> Self {
        v.to_sql_value()
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(v: serde_json::Value) -> Self {
        v.to_sql_value()
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

impl fmt::Display for SqlValue {
    /// Renders with the Postgres dialect and no nil-on-empty policy.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_value(self, false, Dialect::Postgres))
    }
}

#[cfg(test)]
mod tests;

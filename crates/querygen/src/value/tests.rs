use super::*;
use chrono::{DateTime, TimeZone, Utc};

fn pg(v: impl Into<SqlValue>, nil_on_empty: bool) -> String {
    format_value(&v.into(), nil_on_empty, Dialect::Postgres)
}

#[test]
fn numbers_render_as_decimal_text() {
    assert_eq!(pg(42_i32, false), "42");
    assert_eq!(pg(-7_i64, false), "-7");
    assert_eq!(pg(18_u8, false), "18");
    assert_eq!(pg(2.5_f64, false), "2.5");
    assert_eq!(pg(0_i64, false), "0");
}

#[test]
fn zero_numbers_become_null_only_with_nil_on_empty() {
    assert_eq!(pg(0_i64, true), "NULL");
    assert_eq!(pg(0_u32, true), "NULL");
    assert_eq!(pg(0.0_f64, true), "NULL");
    assert_eq!(pg(1_i64, true), "1");
    assert_eq!(pg(-1_i64, true), "-1");
    assert_eq!(pg(0.25_f32, true), "0.25");
}

#[test]
fn empty_text_becomes_null_only_with_nil_on_empty() {
    assert_eq!(pg("", true), "NULL");
    assert_eq!(pg("", false), "''");
    assert_eq!(pg("a", true), "'a'");
    assert_eq!(pg(" ", true), "' '");
}

#[test]
fn booleans_are_dialect_independent() {
    for dialect in [Dialect::Postgres, Dialect::Sqlite, Dialect::Generic] {
        assert_eq!(format_value(&SqlValue::Bool(true), false, dialect), "TRUE");
        assert_eq!(format_value(&SqlValue::Bool(false), true, dialect), "FALSE");
    }
}

#[test]
fn null_is_unconditional() {
    assert_eq!(pg(SqlValue::Null, false), "NULL");
    assert_eq!(pg(None::<i64>, false), "NULL");
    assert_eq!(pg(Some(3_i64), false), "3");
}

#[test]
fn quotes_are_doubled_for_quote_delimited_dialects() {
    let v = SqlValue::from("it's");
    assert_eq!(format_value(&v, false, Dialect::Postgres), "'it''s'");
    assert_eq!(format_value(&v, false, Dialect::Sqlite), "'it''s'");
    assert_eq!(format_value(&v, false, Dialect::Generic), "'it's'");
}

#[test]
fn other_values_are_stringified_and_quoted() {
    let id = uuid::Uuid::nil();
    assert_eq!(
        pg(id, false),
        "'00000000-0000-0000-0000-000000000000'"
    );
    assert_eq!(pg(serde_json::json!({"a": 1}), false), "'{\"a\":1}'");
    assert_eq!(pg(SqlValue::other(std::net::Ipv4Addr::LOCALHOST), false), "'127.0.0.1'");
}

#[test]
fn timestamps_are_utc_with_nanoseconds() {
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap()
        + chrono::Duration::nanoseconds(123_456_789);
    assert_eq!(pg(ts, false), "'2024-05-01T10:20:30.123456789Z'");

    let offset = chrono::FixedOffset::east_opt(3 * 3600).unwrap();
    let local = offset.with_ymd_and_hms(2024, 5, 1, 13, 20, 30).unwrap();
    assert_eq!(pg(local, false), "'2024-05-01T10:20:30.000000000Z'");
}

#[test]
fn timestamp_text_round_trips() {
    let samples = [
        Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap(),
        Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap() + chrono::Duration::nanoseconds(1),
        Utc::now(),
    ];
    for ts in samples {
        let text = format_timestamp(&ts);
        let parsed: DateTime<Utc> = DateTime::parse_from_rfc3339(&text)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parsed, ts);
    }
}

#[test]
fn display_uses_postgres_rules() {
    assert_eq!(SqlValue::from("a'b").to_string(), "'a''b'");
    assert_eq!(SqlValue::Null.to_string(), "NULL");
}

#[test]
fn non_finite_floats_render_as_quoted_literals() {
    assert_eq!(pg(f64::NAN, false), "'NaN'");
    assert_eq!(pg(f64::INFINITY, false), "'Infinity'");
    assert_eq!(pg(f64::NEG_INFINITY, true), "'-Infinity'");
    assert_eq!(pg(f32::INFINITY, false), "'Infinity'");
}

//! The statement builder.
//!
//! A [`Generator`] owns one entity row and holds at most one pending
//! statement. Every builder method replaces the pending statement (the
//! `ORDER BY` and `LIMIT` appenders extend it); [`Generator::to_text`] and the
//! execution methods consume it and leave the generator empty.
//!
//! ```ignore
//! let mut users = Generator::for_entity(User::default());
//! users
//!     .select(Filter::new().eq("is_active", true))
//!     .order_by("created_at", Order::Desc)?
//!     .paginate(10, 2)?;
//! assert_eq!(
//!     users.to_text(),
//!     "SELECT id, phone FROM users WHERE is_active = TRUE ORDER BY created_at DESC LIMIT 10 OFFSET 10;"
//! );
//! ```
//!
//! Values are escaped for the configured [`Dialect`]; table names, column names
//! and raw predicates are copied into the statement verbatim.

use crate::config::GeneratorConfig;
use crate::dialect::Dialect;
use crate::entity::{Entity, Identified, singular};
use crate::error::{QueryError, QueryResult};
use crate::filter::Filter;
use crate::value::{NULL, SqlValue};
use std::fmt;
use std::str::FromStr;

/// How the pending statement was built. Drives execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Single-row `INSERT` of the owned row.
    Insert,
    /// Multi-row `INSERT`, including many-to-many link rows.
    InsertMulti,
    /// Row-returning `SELECT`, including relationship joins.
    Select,
    /// `SELECT COUNT(*)`.
    Count,
    Update,
    Delete,
    /// Text supplied through [`Generator::raw_query`].
    Raw,
    /// Text wrapped by [`Generator::wrap_atomic`].
    Atomic,
}

impl StatementKind {
    /// Whether the statement produces rows.
    pub fn returns_rows(self) -> bool {
        matches!(self, StatementKind::Select | StatementKind::Count)
    }
}

/// Sort direction for [`Generator::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub fn as_sql(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

impl FromStr for Order {
    type Err = QueryError;

    /// Accepts `asc` or `desc` in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Order::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Order::Desc)
        } else {
            Err(QueryError::validation(format!(
                "invalid sort direction: {s} (expected asc or desc)"
            )))
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Pending {
    pub(crate) text: String,
    pub(crate) kind: StatementKind,
}

/// Builds one SQL statement at a time for the entity it owns.
///
/// Not meant to be shared: every method takes `&mut self`. Use one generator
/// per entity instance per operation.
pub struct Generator<E> {
    pub(crate) table: String,
    pub(crate) row: E,
    pub(crate) pending: Option<Pending>,
    pub(crate) config: GeneratorConfig,
}

impl<E: Entity> Generator<E> {
    /// Bind `row` to `table` with the default configuration.
    pub fn new(table: impl Into<String>, row: E) -> Self {
        Self::with_config(table, row, GeneratorConfig::default())
    }

    /// Bind `row` to `table` with an explicit configuration.
    pub fn with_config(table: impl Into<String>, row: E, config: GeneratorConfig) -> Self {
        Self {
            table: table.into(),
            row,
            pending: None,
            config,
        }
    }

    /// Bind `row` to its entity's default table.
    pub fn for_entity(row: E) -> Self {
        Self::new(E::TABLE, row)
    }

    /// Bind `row` to its entity's default table with an explicit configuration.
    pub fn for_entity_with(row: E, config: GeneratorConfig) -> Self {
        Self::with_config(E::TABLE, row, config)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn set_table(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = table.into();
        self
    }

    pub fn row(&self) -> &E {
        &self.row
    }

    pub fn row_mut(&mut self) -> &mut E {
        &mut self.row
    }

    /// Replace the owned row, returning the previous one.
    pub fn set_row(&mut self, row: E) -> E {
        std::mem::replace(&mut self.row, row)
    }

    pub fn into_row(self) -> E {
        self.row
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn dialect(&self) -> Dialect {
        self.config.dialect
    }

    pub fn set_dialect(&mut self, dialect: Dialect) -> &mut Self {
        self.config.dialect = dialect;
        self
    }

    /// The pending statement text, without consuming it.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.text.as_str())
    }

    /// The kind of the pending statement.
    pub fn pending_kind(&self) -> Option<StatementKind> {
        self.pending.as_ref().map(|p| p.kind)
    }

    /// Whether no statement is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.as_ref().is_none_or(|p| p.text.is_empty())
    }

    fn set_pending(&mut self, text: String, kind: StatementKind) -> &mut Self {
        self.pending = Some(Pending { text, kind });
        self
    }

    fn pending_mut(&mut self, action: &str) -> QueryResult<&mut Pending> {
        match self.pending.as_mut() {
            Some(p) if !p.text.is_empty() => Ok(p),
            _ => Err(QueryError::misuse(format!("no query to {action}"))),
        }
    }

    fn format(&self, value: &SqlValue, nil_on_empty: bool) -> String {
        value.format(nil_on_empty, self.config.dialect)
    }

    fn id_column() -> &'static str {
        E::ID_COLUMN.unwrap_or("id")
    }

    // ---- clause helpers -------------------------------------------------

    /// Comma-separated column list, each qualified with `prefix.` when given.
    pub fn select_fields(&self, prefix: Option<&str>) -> String {
        E::columns()
            .iter()
            .map(|c| match prefix {
                Some(p) => format!("{p}.{}", c.name),
                None => c.name.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Insertable columns and their formatted values, as two comma lists.
    pub fn insert_fields(&self) -> (String, String) {
        (self.insert_columns(), Self::insert_values(&self.row, self.config.dialect))
    }

    fn insert_columns(&self) -> String {
        E::columns()
            .iter()
            .filter(|c| c.insertable())
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn insert_values(row: &E, dialect: Dialect) -> String {
        row.column_values()
            .into_iter()
            .filter(|(c, _)| c.insertable())
            .map(|(c, v)| v.format(c.nil_on_empty, dialect))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `col = value` pairs for every updatable column whose value is not null.
    pub fn update_fields(&self) -> String {
        self.row
            .column_values()
            .into_iter()
            .filter(|(c, v)| c.updatable() && !v.is_null())
            .map(|(c, v)| format!("{} = {}", c.name, self.format(&v, c.nil_on_empty)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Equality predicates joined with `AND`; null values become `IS NULL`.
    pub fn where_clause(&self, filter: &Filter) -> String {
        filter
            .iter()
            .map(|(column, value)| {
                let literal = self.format(value, false);
                if literal == NULL {
                    format!("{column} IS {literal}")
                } else {
                    format!("{column} = {literal}")
                }
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Substring search predicates joined with `OR`.
    ///
    /// Uses `ILIKE` for Postgres and `LIKE` otherwise. `%` and `_` inside the
    /// search text keep their wildcard meaning.
    pub fn like_where_clause<I, K, V>(&self, terms: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let like = self.config.dialect.like_operator();
        terms
            .into_iter()
            .map(|(column, needle)| {
                let pattern = SqlValue::Text(format!("%{}%", needle.as_ref()));
                format!("{} {like} {}", column.as_ref(), self.format(&pattern, false))
            })
            .collect::<Vec<_>>()
            .join(" OR ")
    }

    fn with_where(base: String, predicate: &str) -> String {
        if predicate.is_empty() {
            base
        } else {
            format!("{base} WHERE {predicate}")
        }
    }

    // ---- builders ---------------------------------------------------------

    /// `INSERT INTO <table> (<cols>) VALUES(<values>)` for the owned row.
    pub fn insert_into(&mut self) -> &mut Self {
        let (columns, values) = self.insert_fields();
        let text = format!("INSERT INTO {} ({columns}) VALUES({values})", self.table);
        self.set_pending(text, StatementKind::Insert)
    }

    /// One `INSERT` carrying every row in `rows`.
    ///
    /// Columns come from the entity definition; the owned row is not included
    /// unless it is part of `rows`.
    pub fn insert_into_multi<'a, I>(&mut self, rows: I) -> QueryResult<&mut Self>
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a,
    {
        let dialect = self.config.dialect;
        let tuples: Vec<String> = rows
            .into_iter()
            .map(|row| format!("({})", Self::insert_values(row, dialect)))
            .collect();
        if tuples.is_empty() {
            return Err(QueryError::misuse("no rows to insert"));
        }
        let text = format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.table,
            self.insert_columns(),
            tuples.join(", ")
        );
        Ok(self.set_pending(text, StatementKind::InsertMulti))
    }

    /// `SELECT <cols> FROM <table> [WHERE <filter>]`.
    pub fn select(&mut self, filter: impl Into<Filter>) -> &mut Self {
        let predicate = self.where_clause(&filter.into());
        let base = format!("SELECT {} FROM {}", self.select_fields(None), self.table);
        self.set_pending(Self::with_where(base, &predicate), StatementKind::Select)
    }

    /// `SELECT <cols> FROM <table> [WHERE <predicate>]` with a raw predicate.
    pub fn select_where(&mut self, predicate: &str) -> &mut Self {
        let base = format!("SELECT {} FROM {}", self.select_fields(None), self.table);
        self.set_pending(Self::with_where(base, predicate), StatementKind::Select)
    }

    /// `SELECT COUNT(*) as count FROM <table> [WHERE <filter>]`.
    pub fn select_count(&mut self, filter: impl Into<Filter>) -> &mut Self {
        let predicate = self.where_clause(&filter.into());
        self.select_count_where(&predicate)
    }

    /// `SELECT COUNT(*) as count FROM <table> [WHERE <predicate>]` with a raw predicate.
    pub fn select_count_where(&mut self, predicate: &str) -> &mut Self {
        let base = format!("SELECT COUNT(*) as count FROM {}", self.table);
        self.set_pending(Self::with_where(base, predicate), StatementKind::Count)
    }

    /// Append `ORDER BY <column> ASC|DESC` to the pending statement.
    pub fn order_by(&mut self, column: &str, order: Order) -> QueryResult<&mut Self> {
        let pending = self.pending_mut("add order by into it")?;
        pending.text.push_str(&format!(" ORDER BY {column} {}", order.as_sql()));
        Ok(self)
    }

    /// Append `LIMIT <limit> OFFSET <(page - 1) * limit>` to the pending statement.
    ///
    /// Pages are 1-based. A page below 1 yields a negative offset, which the
    /// database will reject.
    pub fn paginate(&mut self, limit: i64, page: i64) -> QueryResult<&mut Self> {
        let offset = page.saturating_sub(1).saturating_mul(limit);
        let pending = self.pending_mut("paginate")?;
        pending
            .text
            .push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
        Ok(self)
    }

    /// `DELETE FROM <table> [WHERE <filter>]`.
    pub fn delete(&mut self, filter: impl Into<Filter>) -> &mut Self {
        let predicate = self.where_clause(&filter.into());
        let base = format!("DELETE FROM {}", self.table);
        self.set_pending(Self::with_where(base, &predicate), StatementKind::Delete)
    }

    /// `UPDATE <table> SET <updatable non-null fields> [WHERE <filter>]`.
    pub fn update(&mut self, filter: impl Into<Filter>) -> QueryResult<&mut Self> {
        let sets = self.update_fields();
        if sets.is_empty() {
            return Err(QueryError::misuse("no updatable fields to set"));
        }
        let predicate = self.where_clause(&filter.into());
        let base = format!("UPDATE {} SET {sets}", self.table);
        Ok(self.set_pending(Self::with_where(base, &predicate), StatementKind::Update))
    }

    /// `UPDATE <table> SET <set> [WHERE <filter>]` from an explicit SET list.
    pub fn update_specific(
        &mut self,
        set: impl Into<Filter>,
        filter: impl Into<Filter>,
    ) -> QueryResult<&mut Self> {
        let set = set.into();
        if set.is_empty() {
            return Err(QueryError::misuse("update_specific requires at least one column"));
        }
        let sets = set
            .iter()
            .map(|(column, value)| format!("{column} = {}", self.format(value, false)))
            .collect::<Vec<_>>()
            .join(", ");
        let predicate = self.where_clause(&filter.into());
        let base = format!("UPDATE {} SET {sets}", self.table);
        Ok(self.set_pending(Self::with_where(base, &predicate), StatementKind::Update))
    }

    /// Rows of this table that reference `parent_id` in `child_table`.
    ///
    /// The foreign key is `<child_table minus its last character>_id` on this
    /// table: `one_to_many("groups", 7)` joins on `main.group_id`.
    pub fn one_to_many(&mut self, child_table: &str, parent_id: i64) -> &mut Self {
        let text = format!(
            "SELECT DISTINCT {} FROM {} main JOIN {child_table} destination ON main.{}_id = destination.id WHERE destination.id = {parent_id}",
            self.select_fields(Some("main")),
            self.table,
            singular(child_table),
        );
        self.set_pending(text, StatementKind::Select)
    }

    /// Rows of this table linked to `other_id` of `other_table` through `middle_table`.
    ///
    /// The middle table holds `<singular(table)>_id` and `<singular(other_table)>_id`.
    pub fn many_to_many(&mut self, middle_table: &str, other_table: &str, other_id: i64) -> &mut Self {
        let text = format!(
            "SELECT DISTINCT {} FROM {} main JOIN {middle_table} middle ON main.{} = middle.{}_id JOIN {other_table} destination ON destination.id = middle.{}_id WHERE destination.id = {other_id}",
            self.select_fields(Some("main")),
            self.table,
            Self::id_column(),
            singular(&self.table),
            singular(other_table),
        );
        self.set_pending(text, StatementKind::Select)
    }

    /// Use `text` verbatim as the pending statement.
    pub fn raw_query(&mut self, text: impl Into<String>) -> &mut Self {
        self.set_pending(text.into(), StatementKind::Raw)
    }

    /// Wrap the pending text in `BEGIN;` / `END;`.
    ///
    /// Purely textual: no transaction object is opened here. The wrapped
    /// statement is sent as a batch when executed. Each boundary is its own
    /// statement so the batch parses on Postgres.
    pub fn wrap_atomic(&mut self) -> &mut Self {
        let mut inner = self.pending.take().map(|p| p.text).unwrap_or_default();
        if !inner.trim_end().ends_with(';') {
            inner.push(';');
        }
        self.set_pending(format!("BEGIN;\n{inner}\nEND;"), StatementKind::Atomic)
    }

    /// Take the pending statement with exactly one trailing `;`.
    ///
    /// The generator is empty afterwards; calling this again returns `";"`.
    pub fn to_text(&mut self) -> String {
        self.take_statement().1
    }

    pub(crate) fn take_statement(&mut self) -> (StatementKind, String) {
        match self.pending.take() {
            Some(Pending { mut text, kind }) => {
                if !text.ends_with(';') {
                    text.push(';');
                }
                (kind, text)
            }
            None => (StatementKind::Raw, ";".to_string()),
        }
    }
}

impl<E: Identified> Generator<E> {
    fn me_predicate(&self) -> String {
        format!("{} = {}", Self::id_column(), self.row.id())
    }

    /// `SELECT * FROM <table> WHERE id = <owned row's id>`.
    pub fn get_me(&mut self) -> &mut Self {
        let text = format!("SELECT * FROM {} WHERE {}", self.table, self.me_predicate());
        self.set_pending(text, StatementKind::Select)
    }

    /// Alias of [`Generator::get_me`].
    pub fn select_me(&mut self) -> &mut Self {
        self.get_me()
    }

    /// Update the owned row's updatable fields, scoped to its id.
    pub fn update_me(&mut self) -> QueryResult<&mut Self> {
        let sets = self.update_fields();
        if sets.is_empty() {
            return Err(QueryError::misuse("no updatable fields to set"));
        }
        let text = format!("UPDATE {} SET {sets} WHERE {}", self.table, self.me_predicate());
        Ok(self.set_pending(text, StatementKind::Update))
    }

    /// `DELETE FROM <table> WHERE id = <owned row's id>`.
    pub fn delete_me(&mut self) -> &mut Self {
        let text = format!("DELETE FROM {} WHERE {}", self.table, self.me_predicate());
        self.set_pending(text, StatementKind::Delete)
    }

    /// Link the owned row to each of `other_ids` in `middle_table`.
    pub fn insert_many_to_many(
        &mut self,
        middle_table: &str,
        other_table: &str,
        other_ids: &[i64],
    ) -> QueryResult<&mut Self> {
        if other_ids.is_empty() {
            return Err(QueryError::misuse("no ids to link"));
        }
        let id = self.row.id();
        let values = other_ids
            .iter()
            .map(|other| format!("({id}, {other})"))
            .collect::<Vec<_>>()
            .join(", ");
        let text = format!(
            "INSERT INTO {middle_table} ({}_id, {}_id) VALUES {values}",
            singular(&self.table),
            singular(other_table),
        );
        Ok(self.set_pending(text, StatementKind::InsertMulti))
    }

    /// Remove the links between the owned row and each of `other_ids`.
    pub fn delete_many_to_many(
        &mut self,
        middle_table: &str,
        other_table: &str,
        other_ids: &[i64],
    ) -> QueryResult<&mut Self> {
        if other_ids.is_empty() {
            return Err(QueryError::misuse("no ids to unlink"));
        }
        let ids = other_ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let text = format!(
            "DELETE FROM {middle_table} WHERE {}_id = {} AND {}_id IN ({ids})",
            singular(&self.table),
            self.row.id(),
            singular(other_table),
        );
        Ok(self.set_pending(text, StatementKind::Delete))
    }
}

impl<E: fmt::Debug> fmt::Debug for Generator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("table", &self.table)
            .field("row", &self.row)
            .field("pending", &self.pending)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests;

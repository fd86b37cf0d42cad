//! Entity metadata.
//!
//! Every entity registers an ordered list of [`Column`] descriptors once,
//! usually through `#[derive(Entity)]`. The generator reads this list instead
//! of inspecting values at runtime, so column order always follows the
//! struct's declared field order.

use crate::value::SqlValue;

/// One mapped field of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name in the database.
    pub name: &'static str,
    /// Rust field name.
    pub field: &'static str,
    /// Left out of INSERT column lists.
    pub skip_insert: bool,
    /// Left out of UPDATE set lists.
    pub skip_update: bool,
    /// Zero / empty values render as `NULL`.
    pub nil_on_empty: bool,
}

impl Column {
    /// A plain column: inserted, updated, zero values kept.
    pub const fn new(name: &'static str, field: &'static str) -> Self {
        Self {
            name,
            field,
            skip_insert: false,
            skip_update: false,
            nil_on_empty: false,
        }
    }

    pub const fn skip_insert(mut self) -> Self {
        self.skip_insert = true;
        self
    }

    pub const fn skip_update(mut self) -> Self {
        self.skip_update = true;
        self
    }

    pub const fn nil_on_empty(mut self) -> Self {
        self.nil_on_empty = true;
        self
    }

    pub fn insertable(&self) -> bool {
        !self.skip_insert
    }

    pub fn updatable(&self) -> bool {
        !self.skip_update
    }
}

/// A struct mapped to one row of a table.
///
/// # Example
///
/// ```ignore
/// use querygen::{Entity, FromRow};
///
/// #[derive(Entity, FromRow)]
/// #[orm(table = "users")]
/// struct User {
///     #[orm(skip_insert)]
///     id: i64,
///     phone: String,
///     #[orm(nil_on_empty)]
///     email: String,
///     #[orm(skip)]
///     session: Option<String>,
/// }
/// ```
pub trait Entity: Sized {
    /// Default table name.
    const TABLE: &'static str;

    /// Identity column, if the entity has one.
    const ID_COLUMN: Option<&'static str> = None;

    /// Mapped columns in declared order. Excluded fields are not listed.
    fn columns() -> &'static [Column];

    /// Current field values, index-aligned with [`Entity::columns`].
    fn values(&self) -> Vec<SqlValue>;

    /// Mutable access to the identity, used to write back generated ids.
    fn id_slot(&mut self) -> Option<&mut i64> {
        None
    }

    /// Column/value pairs in declared order.
    fn column_values(&self) -> Vec<(Column, SqlValue)> {
        Self::columns()
            .iter()
            .copied()
            .zip(self.values())
            .collect()
    }
}

/// An entity with a numeric identity.
///
/// Identity-scoped statements (`get_me`, `update_me`, `delete_me`, many-to-many
/// writes) are only available for these entities.
pub trait Identified: Entity {
    fn id(&self) -> i64;
}

/// Derive a foreign-key stem from a table name by dropping its last character.
///
/// `"users"` becomes `"user"`. Irregular plurals are not handled: `"people"`
/// becomes `"peopl"`, so tables used in relationships must be named with a
/// trailing `s`.
pub fn singular(table: &str) -> &str {
    match table.char_indices().last() {
        Some((idx, _)) => &table[..idx],
        None => table,
    }
}

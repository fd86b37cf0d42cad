//! Derive macros for querygen
//!
//! Provides `#[derive(Entity)]` and `#[derive(FromRow)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod entity;
mod from_row;
mod sql_ident;

/// Derive `Entity` metadata for a struct.
///
/// # Example
///
/// ```ignore
/// use querygen::Entity;
///
/// #[derive(Entity)]
/// #[orm(table = "users")]
/// struct User {
///     #[orm(skip_insert)]
///     id: i64,
///     display_name: String,
///     #[orm(nil_on_empty)]
///     email: String,
///     #[orm(skip_update)]
///     created_at: chrono::DateTime<chrono::Utc>,
/// }
/// ```
///
/// # Generated
///
/// - `Entity` with `TABLE`, ordered `columns()` and aligned `values()`
/// - `ID_COLUMN` / `id_slot()` and an `Identified` impl when the struct has an identity
///
/// # Attributes
///
/// - `#[orm(table = "name")]` - Table name (defaults to the snake_case struct name plus `s`)
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm(skip)]` - Leave the field out of every statement
/// - `#[orm(skip_insert)]` - Leave the column out of INSERT lists
/// - `#[orm(skip_update)]` - Leave the column out of UPDATE set lists
/// - `#[orm(nil_on_empty)]` - Write zero / empty values as `NULL`
/// - `#[orm(id)]` - Mark the `i64` identity (a field named `id` is picked up without it)
/// - `#[orm(flatten)]` - Splice another entity's columns in at this position;
///   with `id`, the identity is delegated to it
#[proc_macro_derive(Entity, attributes(orm))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `FromRow` trait for a struct.
///
/// # Example
///
/// ```ignore
/// use querygen::FromRow;
///
/// #[derive(FromRow)]
/// struct UserSummary {
///     id: i64,
///     #[orm(column = "display_name")]
///     name: String,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(column = "name")]` - Read from a different column name
/// - `#[orm(skip)]` - Not read; filled with `Default::default()`
/// - `#[orm(flatten)]` - Decode the field with its own `FromRow` from the same row
#[proc_macro_derive(FromRow, attributes(orm))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

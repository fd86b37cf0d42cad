//! # querygen
//!
//! Entity-driven SQL statement generation with a query-then-execute lifecycle.
//!
//! ## Features
//!
//! - **Compile-time entity metadata**: `#[derive(Entity)]` registers each
//!   struct's columns and their insert/update/nil-on-empty rules
//! - **One pending statement**: builders replace it, `to_text()` and the
//!   `exec_*` methods consume it
//! - **Dialect-aware literals**: values are escaped for Postgres, SQLite or a
//!   generic target
//! - **Transaction-friendly**: execute against any `GenericClient`
//!   (connection, pooled connection, transaction)
//! - **Query hooks**: observe every executed statement, log it via `tracing`
//!
//! ## Example
//!
//! ```ignore
//! use querygen::{Entity, FromRow, Filter, Generator, Order};
//!
//! #[derive(Debug, Default, Entity, FromRow)]
//! #[orm(table = "users")]
//! struct User {
//!     #[orm(id, skip_insert)]
//!     id: i64,
//!     phone: String,
//!     active: bool,
//! }
//!
//! let mut users = Generator::for_entity(User::default());
//! let mut active = Vec::new();
//! users
//!     .select(Filter::new().eq("active", true))
//!     .order_by("id", Order::Desc)?
//!     .paginate(10, 1)?;
//! users.exec_multi_row::<User>(&client, &mut active).await?;
//! ```
//!
//! ## Safety
//!
//! Values are rendered as escaped literals. Table names, column names, sort
//! columns and the predicates passed to `select_where` / `select_count_where`
//! are copied into the statement as-is: never build them from user input
//! without validating them against a fixed list first.

pub mod client;
pub mod config;
pub mod dialect;
pub mod entity;
pub mod error;
pub mod exec;
pub mod filter;
pub mod generator;
pub mod monitor;
pub mod row;
pub mod value;

pub use client::GenericClient;
pub use config::GeneratorConfig;
pub use dialect::Dialect;
pub use entity::{Column, Entity, Identified, singular};
pub use error::{QueryError, QueryResult};
pub use filter::Filter;
pub use generator::{Generator, Order, StatementKind};
pub use monitor::{QueryContext, QueryHook, QueryOutcome};
pub use row::{FromRow, RowExt};
pub use value::{NULL, SqlValue, ToSqlValue, format_timestamp, format_value};

#[cfg(feature = "tracing")]
pub use monitor::TracingSqlHook;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};

#[cfg(feature = "derive")]
pub use querygen_derive::{Entity, FromRow};

// Re-exported for code generated by the derives.
pub use tokio_postgres;

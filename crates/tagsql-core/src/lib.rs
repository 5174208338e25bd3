//! # tagsql-core
//!
//! Derives the SQL for listing, fetching, inserting, updating and deleting
//! records from their table mapping, without hand-written SQL.
//!
//! This crate provides:
//! - The `Record` trait describing how a struct maps onto a table
//!   (implemented by `#[derive(Record)]` from `tagsql-derive`)
//! - `TypeInfo` and `ValueInfo`, the metadata extracted from records
//! - The `SqlGenerator` trait and its stock implementation
//! - `Statements`, which ties records to an injected generator
//!
//! Statements are plain SQL text with literals inlined. Nothing is executed.
//!
//! ## Generating statements
//!
//! ```rust
//! use tagsql_core::{DefaultSqlGenerator, SqlGenerator, TypeInfo, ValueInfo};
//!
//! let generator = DefaultSqlGenerator::new();
//!
//! let users = TypeInfo::new("users", "id").column("name");
//! let sql = generator
//!     .list_sql(&users, &["age = 30", "created_at DESC"])
//!     .unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT id,name FROM users WHERE age = 30 ORDER BY created_at DESC"
//! );
//!
//! let bob = ValueInfo::new("users")
//!     .primary_key("id", "5")
//!     .column("name", "'Bob'");
//! assert_eq!(
//!     generator.delete_by_id_sql(&bob).unwrap(),
//!     "DELETE FROM users WHERE id = 5"
//! );
//! ```
//!
//! ## List conditions
//!
//! List queries take free-form strings. A string containing `=` is a WHERE
//! fragment, a string containing `desc`, `DESC`, `asc` or `ASC` is an
//! ORDER BY fragment, and anything else is ignored. See [`condition`].

pub mod condition;
pub mod config;
pub mod error;
pub mod generator;
pub mod record;
pub mod statements;
pub mod value;

pub use config::GeneratorConfig;
pub use error::{ExtractError, GenerateError, Result, ValidationError};
pub use generator::{DefaultSqlGenerator, SqlGenerator};
pub use record::{Record, TypeInfo, ValueInfo};
pub use statements::Statements;
pub use value::{SqlValue, ToSqlValue};

//! Record-level entry points.
//!
//! [`Statements`] extracts metadata from a [`Record`] and passes it to the
//! generator the caller injected. There is no process-wide generator: each
//! `Statements` owns its own, and hosts that want different SQL construct
//! one around their own [`SqlGenerator`].

use crate::error::{GenerateError, Result};
use crate::generator::{DefaultSqlGenerator, SqlGenerator};
use crate::record::{Record, TypeInfo, ValueInfo};

/// Generates statements for records through an injected [`SqlGenerator`].
///
/// # Example
///
/// ```rust
/// use tagsql_core::{Record, Statements};
/// # use tagsql_derive::Record;
///
/// #[derive(Record)]
/// #[record(table = "users")]
/// struct User {
///     #[column(primary_key)]
///     id: i64,
///     name: String,
/// }
///
/// # fn main() -> tagsql_core::Result<()> {
/// let statements = Statements::new();
/// let user = User { id: 5, name: "Bob".into() };
/// assert_eq!(
///     statements.delete_by_id(&user)?,
///     "DELETE FROM users WHERE id = 5"
/// );
/// let listing = statements.list::<User>(&["name = 'Bob'", "id DESC"])?;
/// assert_eq!(
///     listing,
///     "SELECT id,name FROM users WHERE name = 'Bob' ORDER BY id DESC"
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Statements<G: SqlGenerator = DefaultSqlGenerator> {
    generator: G,
}

impl Statements<DefaultSqlGenerator> {
    /// Creates statements backed by the default generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G: SqlGenerator> Statements<G> {
    /// Creates statements backed by `generator`.
    pub const fn with_generator(generator: G) -> Self {
        Self { generator }
    }

    /// Returns the generator.
    pub const fn generator(&self) -> &G {
        &self.generator
    }

    /// Lists rows of `R`, filtered and sorted by `conditions`.
    ///
    /// Conditions containing `=` become WHERE fragments, conditions
    /// containing a sort keyword become ORDER BY fragments, and the rest are
    /// ignored.
    pub fn list<R: Record>(&self, conditions: &[&str]) -> Result<String> {
        let info = TypeInfo::of::<R>()
            .map_err(|e| GenerateError::metadata("get record type info failed", e))?;
        self.generator.list_sql(&info, conditions)
    }

    /// Fetches the row of `record` by its primary key.
    pub fn find_by_id<R: Record>(&self, record: &R) -> Result<String> {
        let info = value_info(record)?;
        self.generator.find_by_id_sql(&info)
    }

    /// Inserts `record`.
    pub fn save<R: Record>(&self, record: &R) -> Result<String> {
        let info = value_info(record)?;
        self.generator.save_sql(&info)
    }

    /// Updates the row of `record` by its primary key.
    pub fn update_by_id<R: Record>(&self, record: &R) -> Result<String> {
        let info = value_info(record)?;
        self.generator.update_by_id_sql(&info)
    }

    /// Deletes the row of `record` by its primary key.
    pub fn delete_by_id<R: Record>(&self, record: &R) -> Result<String> {
        let info = value_info(record)?;
        self.generator.delete_by_id_sql(&info)
    }
}

fn value_info<R: Record>(record: &R) -> Result<ValueInfo> {
    ValueInfo::of(record).map_err(|e| GenerateError::metadata("get record value info failed", e))
}

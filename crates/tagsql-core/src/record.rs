//! Record descriptors and the metadata views extracted from them.
//!
//! A [`Record`] describes how a struct maps onto a table. It is normally
//! implemented by `#[derive(Record)]`. The generators never look at records
//! directly. They consume the two views extracted here: [`TypeInfo`] for
//! the type-level list query, and [`ValueInfo`] for the instance-level
//! statements.

use std::collections::HashSet;

use crate::error::ExtractError;
use crate::value::SqlValue;

/// Table mapping for a record struct.
///
/// # Example
///
/// ```rust
/// use tagsql_core::{Record, ValueInfo};
/// # use tagsql_derive::Record;
///
/// #[derive(Record)]
/// #[record(table = "users")]
/// struct User {
///     #[column(primary_key, auto_increment)]
///     id: i64,
///     name: String,
///     #[column(name = "mail")]
///     email: Option<String>,
/// }
///
/// # fn main() -> Result<(), tagsql_core::ExtractError> {
/// assert_eq!(User::TABLE, "users");
/// assert_eq!(User::PRIMARY_KEY, Some("id"));
/// assert_eq!(User::COLUMNS, ["name", "mail"]);
///
/// let user = User { id: 0, name: "Bob".into(), email: None };
/// let info = ValueInfo::of(&user)?;
/// assert_eq!(info.primary_key_literal, "");
/// assert!(info.auto_increment);
/// assert_eq!(
///     info.column_literals,
///     [("name".to_string(), "'Bob'".to_string()), ("mail".to_string(), "NULL".to_string())]
/// );
/// # Ok(())
/// # }
/// ```
pub trait Record {
    /// The SQL table name.
    const TABLE: &'static str;

    /// The primary key column name, if any.
    const PRIMARY_KEY: Option<&'static str>;

    /// Whether the database generates the primary key.
    const AUTO_INCREMENT: bool;

    /// Non-key column names, in declaration order.
    const COLUMNS: &'static [&'static str];

    /// Returns the primary key value, or `None` when there is no key field.
    fn primary_key_value(&self) -> Option<SqlValue>;

    /// Returns the non-key values, positionally matching [`Record::COLUMNS`].
    fn column_values(&self) -> Vec<SqlValue>;
}

/// Type-level metadata used by the list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Target table.
    pub table_name: String,
    /// Primary key column.
    pub primary_key_column: String,
    /// Non-key columns.
    pub columns: Vec<String>,
}

impl TypeInfo {
    /// Creates type metadata with no non-key columns.
    #[must_use]
    pub fn new(table_name: impl Into<String>, primary_key_column: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            primary_key_column: primary_key_column.into(),
            columns: Vec::new(),
        }
    }

    /// Adds a non-key column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(name.into());
        self
    }

    /// Extracts the type metadata of `R`.
    ///
    /// Fails when `R` names no table, declares no primary key, or maps two
    /// fields onto the same column.
    pub fn of<R: Record>() -> Result<Self, ExtractError> {
        if R::TABLE.is_empty() {
            return Err(ExtractError::EmptyTableName);
        }
        let primary_key_column = match R::PRIMARY_KEY {
            Some(pk) if !pk.is_empty() => pk,
            _ => {
                return Err(ExtractError::MissingPrimaryKey {
                    table: R::TABLE.to_string(),
                })
            }
        };
        ensure_unique_columns(R::TABLE, primary_key_column, R::COLUMNS.iter().copied())?;
        Ok(Self {
            table_name: R::TABLE.to_string(),
            primary_key_column: primary_key_column.to_string(),
            columns: R::COLUMNS.iter().map(|c| (*c).to_string()).collect(),
        })
    }
}

/// Instance-level metadata used by the fetch, insert, update and delete
/// statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueInfo {
    /// Target table.
    pub table_name: String,
    /// Primary key column, empty when the record has none.
    pub primary_key_column: String,
    /// Primary key rendered as a literal, empty when no key value is present.
    pub primary_key_literal: String,
    /// Whether the database generates the key.
    pub auto_increment: bool,
    /// Non-key `(column, literal)` pairs in a stable order.
    pub column_literals: Vec<(String, String)>,
}

impl ValueInfo {
    /// Creates value metadata for `table_name` with no key and no columns.
    #[must_use]
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            primary_key_column: String::new(),
            primary_key_literal: String::new(),
            auto_increment: false,
            column_literals: Vec::new(),
        }
    }

    /// Sets the primary key column and its literal.
    #[must_use]
    pub fn primary_key(mut self, column: impl Into<String>, literal: impl Into<String>) -> Self {
        self.primary_key_column = column.into();
        self.primary_key_literal = literal.into();
        self
    }

    /// Marks the key as database generated.
    #[must_use]
    pub const fn auto_increment(mut self, enabled: bool) -> Self {
        self.auto_increment = enabled;
        self
    }

    /// Adds a non-key column and its literal.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>, literal: impl Into<String>) -> Self {
        self.column_literals.push((name.into(), literal.into()));
        self
    }

    /// Returns whether both the key column and a key value are present.
    #[must_use]
    pub fn has_primary_key(&self) -> bool {
        !self.primary_key_column.is_empty() && !self.primary_key_literal.is_empty()
    }

    /// Extracts the value metadata of `record`.
    ///
    /// An unset key value (see [`SqlValue::is_unset`]) yields an empty key
    /// literal. Fails when the table name is empty, a column name repeats, or
    /// a value has no literal form.
    pub fn of<R: Record>(record: &R) -> Result<Self, ExtractError> {
        if R::TABLE.is_empty() {
            return Err(ExtractError::EmptyTableName);
        }
        let primary_key_column = R::PRIMARY_KEY.unwrap_or_default();
        ensure_unique_columns(R::TABLE, primary_key_column, R::COLUMNS.iter().copied())?;
        let primary_key_literal = match record.primary_key_value() {
            Some(value) if !value.is_unset() => render(primary_key_column, &value)?,
            _ => String::new(),
        };

        let values = record.column_values();
        if values.len() != R::COLUMNS.len() {
            return Err(ExtractError::UnsupportedShape(format!(
                "table '{}' declares {} columns but the record yields {} values",
                R::TABLE,
                R::COLUMNS.len(),
                values.len()
            )));
        }
        let column_literals = R::COLUMNS
            .iter()
            .zip(&values)
            .map(|(column, value)| -> Result<(String, String), ExtractError> {
                Ok(((*column).to_string(), render(column, value)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            table_name: R::TABLE.to_string(),
            primary_key_column: primary_key_column.to_string(),
            primary_key_literal,
            auto_increment: R::AUTO_INCREMENT && !primary_key_column.is_empty(),
            column_literals,
        })
    }
}

/// Checks that no column name appears twice, counting the key column.
///
/// An empty `primary_key_column` means the table has no key.
pub fn ensure_unique_columns<'a>(
    table: &str,
    primary_key_column: &'a str,
    columns: impl IntoIterator<Item = &'a str>,
) -> Result<(), ExtractError> {
    let mut seen = HashSet::new();
    let key = Some(primary_key_column).filter(|pk| !pk.is_empty());
    for column in key.into_iter().chain(columns) {
        if !seen.insert(column) {
            return Err(ExtractError::UnsupportedShape(format!(
                "table '{table}' maps column '{column}' more than once"
            )));
        }
    }
    Ok(())
}

/// Renders `value` for `column`, failing on values with no literal form.
pub fn render(column: &str, value: &SqlValue) -> Result<String, ExtractError> {
    value
        .to_literal()
        .ok_or_else(|| ExtractError::UnrepresentableValue {
            column: column.to_string(),
            value: format!("{value:?}"),
        })
}

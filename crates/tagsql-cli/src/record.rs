//! Records described by JSON documents.
//!
//! ```json
//! { "table": "users",
//!   "primary_key": { "column": "id", "value": 5, "auto_increment": false },
//!   "columns": { "name": "Bob", "age": 30 } }
//! ```
//!
//! Column order follows the document. JSON scalars map onto `SqlValue`;
//! arrays and objects have no literal form and are rejected.

use serde::Deserialize;
use serde_json::{Map, Value};
use tagsql_core::record::{ensure_unique_columns, render};
use tagsql_core::{ExtractError, SqlValue, TypeInfo, ValueInfo};

/// A record read from JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonRecord {
    /// Target table.
    pub table: String,
    /// Primary key, if the table has one.
    #[serde(default)]
    pub primary_key: Option<JsonKey>,
    /// Non-key columns and their values.
    #[serde(default)]
    pub columns: Map<String, Value>,
}

/// Primary key of a [`JsonRecord`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonKey {
    /// Key column.
    pub column: String,
    /// Key value; missing or null means not assigned yet.
    #[serde(default)]
    pub value: Value,
    /// Whether the database generates the key.
    #[serde(default)]
    pub auto_increment: bool,
}

impl JsonRecord {
    /// Parses a record document.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Type-level metadata, for list queries.
    pub fn type_info(&self) -> Result<TypeInfo, ExtractError> {
        if self.table.is_empty() {
            return Err(ExtractError::EmptyTableName);
        }
        let Some(key) = self.primary_key.as_ref().filter(|k| !k.column.is_empty()) else {
            return Err(ExtractError::MissingPrimaryKey {
                table: self.table.clone(),
            });
        };
        ensure_unique_columns(&self.table, &key.column, self.columns.keys().map(String::as_str))?;
        Ok(self
            .columns
            .keys()
            .fold(TypeInfo::new(&self.table, &key.column), |info, column| {
                info.column(column)
            }))
    }

    /// Instance-level metadata, for the by-key statements and inserts.
    pub fn value_info(&self) -> Result<ValueInfo, ExtractError> {
        if self.table.is_empty() {
            return Err(ExtractError::EmptyTableName);
        }
        let key_column = self.primary_key.as_ref().map_or("", |k| k.column.as_str());
        ensure_unique_columns(&self.table, key_column, self.columns.keys().map(String::as_str))?;
        let mut info = ValueInfo::new(&self.table);
        if let Some(key) = &self.primary_key {
            let value = to_sql_value(&key.column, &key.value)?;
            let literal = if value.is_unset() {
                String::new()
            } else {
                render(&key.column, &value)?
            };
            info = info
                .primary_key(&key.column, literal)
                .auto_increment(key.auto_increment && !key.column.is_empty());
        }
        for (column, value) in &self.columns {
            let literal = render(column, &to_sql_value(column, value)?)?;
            info = info.column(column, literal);
        }
        Ok(info)
    }
}

fn to_sql_value(column: &str, value: &Value) -> Result<SqlValue, ExtractError> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(b) => Ok(SqlValue::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(SqlValue::Int(i))
            } else if let Some(u) = n.as_u64() {
                Ok(SqlValue::UInt(u))
            } else {
                n.as_f64()
                    .map(SqlValue::Float)
                    .ok_or_else(|| unrepresentable(column, value))
            }
        }
        Value::String(s) => Ok(SqlValue::Text(s.clone())),
        Value::Array(_) => Err(ExtractError::UnsupportedShape(format!(
            "column '{column}' holds a JSON array"
        ))),
        Value::Object(_) => Err(ExtractError::UnsupportedShape(format!(
            "column '{column}' holds a JSON object"
        ))),
    }
}

fn unrepresentable(column: &str, value: &Value) -> ExtractError {
    ExtractError::UnrepresentableValue {
        column: column.to_string(),
        value: value.to_string(),
    }
}

//! SQL statement generators.
//!
//! [`SqlGenerator`] is the capability set a host application depends on: one
//! method per statement shape, each consuming extracted metadata and
//! returning SQL text. [`DefaultSqlGenerator`] is the stock implementation.
//! Hosts that need different SQL implement the trait themselves and hand
//! their generator to [`Statements`](crate::Statements).

use tracing::debug;

use crate::condition::Clauses;
use crate::config::GeneratorConfig;
use crate::error::{ExtractError, GenerateError, Result, ValidationError};
use crate::record::{TypeInfo, ValueInfo};

/// Target of the debug event carrying every generated statement.
pub const SQL_LOG_TARGET: &str = "tagsql::sql";

/// Generates the five record statements from extracted metadata.
///
/// Implementations must be pure: identical metadata yields identical SQL.
pub trait SqlGenerator: Send + Sync {
    /// `SELECT` of every column, filtered and sorted by free-form conditions.
    fn list_sql(&self, info: &TypeInfo, conditions: &[&str]) -> Result<String>;

    /// `SELECT` of the non-key columns of one row, addressed by key.
    fn find_by_id_sql(&self, info: &ValueInfo) -> Result<String>;

    /// `INSERT` of one row.
    fn save_sql(&self, info: &ValueInfo) -> Result<String>;

    /// `UPDATE` of the non-key columns of one row, addressed by key.
    fn update_by_id_sql(&self, info: &ValueInfo) -> Result<String>;

    /// `DELETE` of one row, addressed by key.
    fn delete_by_id_sql(&self, info: &ValueInfo) -> Result<String>;
}

impl<G: SqlGenerator + ?Sized> SqlGenerator for Box<G> {
    fn list_sql(&self, info: &TypeInfo, conditions: &[&str]) -> Result<String> {
        (**self).list_sql(info, conditions)
    }

    fn find_by_id_sql(&self, info: &ValueInfo) -> Result<String> {
        (**self).find_by_id_sql(info)
    }

    fn save_sql(&self, info: &ValueInfo) -> Result<String> {
        (**self).save_sql(info)
    }

    fn update_by_id_sql(&self, info: &ValueInfo) -> Result<String> {
        (**self).update_by_id_sql(info)
    }

    fn delete_by_id_sql(&self, info: &ValueInfo) -> Result<String> {
        (**self).delete_by_id_sql(info)
    }
}

/// The stock generator.
///
/// # Example
///
/// ```rust
/// use tagsql_core::{DefaultSqlGenerator, SqlGenerator, ValueInfo};
///
/// let info = ValueInfo::new("users")
///     .primary_key("id", "5")
///     .column("name", "'Bob'");
/// let sql = DefaultSqlGenerator::new().update_by_id_sql(&info).unwrap();
/// assert_eq!(sql, "UPDATE users SET name = 'Bob' WHERE id = 5");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DefaultSqlGenerator {
    config: GeneratorConfig,
}

impl DefaultSqlGenerator {
    /// Creates a generator with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator with the given configuration.
    #[must_use]
    pub const fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn emit(&self, sql: String) -> Result<String> {
        if self.config.log_statements {
            debug!(target: SQL_LOG_TARGET, sql = %sql, "generated statement");
        }
        Ok(sql)
    }
}

impl SqlGenerator for DefaultSqlGenerator {
    fn list_sql(&self, info: &TypeInfo, conditions: &[&str]) -> Result<String> {
        if info.table_name.is_empty() {
            return Err(GenerateError::metadata(
                "invalid record type info",
                ExtractError::EmptyTableName,
            ));
        }
        if info.primary_key_column.is_empty() {
            return Err(GenerateError::metadata(
                "invalid record type info",
                ExtractError::MissingPrimaryKey {
                    table: info.table_name.clone(),
                },
            ));
        }

        let fields = projection(info);
        let clauses = Clauses::collect(conditions, &self.config.sort_keywords);
        let sql = format!(
            "SELECT {fields} FROM {} {} {}",
            info.table_name,
            clauses.where_clause(),
            clauses.order_by_clause()
        );
        self.emit(sql)
    }

    fn find_by_id_sql(&self, info: &ValueInfo) -> Result<String> {
        require_primary_key(info)?;
        let fields = column_names(info).collect::<Vec<_>>().join(",");
        let sql = format!(
            "SELECT {fields} FROM {} WHERE {} = {}",
            info.table_name, info.primary_key_column, info.primary_key_literal
        );
        self.emit(sql)
    }

    fn save_sql(&self, info: &ValueInfo) -> Result<String> {
        require_fields(info)?;

        let mut columns: Vec<&str> = Vec::with_capacity(info.column_literals.len() + 1);
        let mut values: Vec<&str> = Vec::with_capacity(info.column_literals.len() + 1);
        if info.primary_key_column.is_empty() {
            debug!(table = %info.table_name, "inserting record without a primary key column");
        } else if info.auto_increment {
            columns.push(&info.primary_key_column);
            values.push("DEFAULT");
        } else if info.primary_key_literal.is_empty() {
            debug!(table = %info.table_name, "inserting record without a primary key value");
        } else {
            columns.push(&info.primary_key_column);
            values.push(&info.primary_key_literal);
        }
        columns.extend(column_names(info));
        values.extend(column_literals(info));

        let sql = format!(
            "INSERT INTO {}({}) VALUES({})",
            info.table_name,
            columns.join(","),
            values.join(",")
        );
        self.emit(sql)
    }

    fn update_by_id_sql(&self, info: &ValueInfo) -> Result<String> {
        require_primary_key(info)?;
        require_fields(info)?;
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = {}",
            info.table_name,
            assignments(info),
            info.primary_key_column,
            info.primary_key_literal
        );
        self.emit(sql)
    }

    fn delete_by_id_sql(&self, info: &ValueInfo) -> Result<String> {
        require_primary_key(info)?;
        let sql = format!(
            "DELETE FROM {} WHERE {} = {}",
            info.table_name, info.primary_key_column, info.primary_key_literal
        );
        self.emit(sql)
    }
}

fn require_primary_key(info: &ValueInfo) -> std::result::Result<(), ValidationError> {
    if info.has_primary_key() {
        Ok(())
    } else {
        Err(ValidationError::EmptyPrimaryKey {
            table: info.table_name.clone(),
        })
    }
}

fn require_fields(info: &ValueInfo) -> std::result::Result<(), ValidationError> {
    if info.column_literals.is_empty() {
        Err(ValidationError::NoFields {
            table: info.table_name.clone(),
        })
    } else {
        Ok(())
    }
}

/// Key column followed by every non-key column, comma separated.
fn projection(info: &TypeInfo) -> String {
    let mut fields = info.primary_key_column.clone();
    for column in &info.columns {
        fields.push(',');
        fields.push_str(column);
    }
    fields
}

fn column_names(info: &ValueInfo) -> impl Iterator<Item = &str> {
    info.column_literals.iter().map(|(column, _)| column.as_str())
}

fn column_literals(info: &ValueInfo) -> impl Iterator<Item = &str> {
    info.column_literals.iter().map(|(_, literal)| literal.as_str())
}

/// `col = literal` pairs joined by `, `.
fn assignments(info: &ValueInfo) -> String {
    info.column_literals
        .iter()
        .map(|(column, literal)| format!("{column} = {literal}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing::Event;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    fn users() -> ValueInfo {
        ValueInfo::new("users")
            .primary_key("id", "5")
            .column("name", "'Bob'")
    }

    fn sqlgen() -> DefaultSqlGenerator {
        DefaultSqlGenerator::new()
    }

    // =========================================================================
    // List
    // =========================================================================

    #[test]
    fn test_list_without_conditions() {
        let info = TypeInfo::new("users", "id").column("name").column("age");
        let sql = sqlgen().list_sql(&info, &[]).unwrap();
        assert_eq!(sql, "SELECT id,name,age FROM users  ");
        assert!(!sql.contains("WHERE"));
        assert!(!sql.contains("ORDER BY"));
    }

    #[test]
    fn test_list_projection_has_key_plus_columns() {
        let info = TypeInfo::new("t", "pk").column("a").column("b").column("c");
        let sql = sqlgen().list_sql(&info, &[]).unwrap();
        let projection = sql
            .strip_prefix("SELECT ")
            .and_then(|rest| rest.split(" FROM ").next())
            .unwrap();
        assert_eq!(projection.split(',').count(), 4);
    }

    #[test]
    fn test_list_with_filter_and_sort() {
        let info = TypeInfo::new("users", "id").column("name");
        let sql = sqlgen()
            .list_sql(&info, &["age = 30", "created_at DESC"])
            .unwrap();
        assert_eq!(
            sql,
            "SELECT id,name FROM users WHERE age = 30 ORDER BY created_at DESC"
        );
    }

    #[test]
    fn test_list_only_sorts() {
        let info = TypeInfo::new("users", "id").column("name");
        let sql = sqlgen().list_sql(&info, &["name ASC", "id desc"]).unwrap();
        assert_eq!(sql, "SELECT id,name FROM users  ORDER BY name ASC,id desc");
    }

    #[test]
    fn test_list_drops_unclassified_conditions() {
        let info = TypeInfo::new("users", "id").column("name");
        let with = sqlgen().list_sql(&info, &["age = 30", "LIMIT 5"]).unwrap();
        let without = sqlgen().list_sql(&info, &["age = 30"]).unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_list_quoted_sort_keyword_is_filter() {
        let info = TypeInfo::new("users", "id");
        let sql = sqlgen().list_sql(&info, &["status = 'DESC'"]).unwrap();
        assert_eq!(sql, "SELECT id FROM users WHERE status = 'DESC' ");
    }

    #[test]
    fn test_list_custom_sort_keywords() {
        let generator = DefaultSqlGenerator::with_config(
            GeneratorConfig::default().sort_keywords(["NULLS FIRST"]),
        );
        let info = TypeInfo::new("users", "id");
        let sql = generator
            .list_sql(&info, &["score DESC", "rank NULLS FIRST"])
            .unwrap();
        assert_eq!(sql, "SELECT id FROM users  ORDER BY rank NULLS FIRST");
    }

    #[test]
    fn test_list_rejects_missing_primary_key() {
        let info = TypeInfo::new("users", "");
        let err = sqlgen().list_sql(&info, &[]).unwrap_err();
        assert!(err.is_metadata());
    }

    // =========================================================================
    // Find by id
    // =========================================================================

    #[test]
    fn test_find_by_id() {
        let info = users().column("age", "41");
        assert_eq!(
            sqlgen().find_by_id_sql(&info).unwrap(),
            "SELECT name,age FROM users WHERE id = 5"
        );
    }

    #[test]
    fn test_find_by_id_requires_key_literal() {
        let info = ValueInfo::new("users")
            .primary_key("id", "")
            .column("name", "'Bob'");
        let err = sqlgen().find_by_id_sql(&info).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Validation(ValidationError::EmptyPrimaryKey { .. })
        ));
    }

    #[test]
    fn test_find_by_id_requires_key_column() {
        let info = ValueInfo::new("users").column("name", "'Bob'");
        assert!(sqlgen().find_by_id_sql(&info).unwrap_err().is_validation());
    }

    // =========================================================================
    // Save
    // =========================================================================

    #[test]
    fn test_save_with_key_literal() {
        assert_eq!(
            sqlgen().save_sql(&users()).unwrap(),
            "INSERT INTO users(id,name) VALUES(5,'Bob')"
        );
    }

    #[test]
    fn test_save_auto_increment_emits_default() {
        let info = users().auto_increment(true);
        let sql = sqlgen().save_sql(&info).unwrap();
        assert_eq!(sql, "INSERT INTO users(id,name) VALUES(DEFAULT,'Bob')");
    }

    #[test]
    fn test_save_without_key_value_omits_key_column() {
        let info = ValueInfo::new("users")
            .primary_key("id", "")
            .column("name", "'Bob'")
            .column("age", "41");
        assert_eq!(
            sqlgen().save_sql(&info).unwrap(),
            "INSERT INTO users(name,age) VALUES('Bob',41)"
        );
    }

    #[test]
    fn test_save_without_key_column() {
        let info = ValueInfo::new("audit_log")
            .auto_increment(true)
            .column("message", "'boot'");
        assert_eq!(
            sqlgen().save_sql(&info).unwrap(),
            "INSERT INTO audit_log(message) VALUES('boot')"
        );
    }

    #[test]
    fn test_save_requires_fields() {
        let info = ValueInfo::new("users").primary_key("id", "5");
        let err = sqlgen().save_sql(&info).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Validation(ValidationError::NoFields { .. })
        ));
    }

    // =========================================================================
    // Update by id
    // =========================================================================

    #[test]
    fn test_update_by_id() {
        assert_eq!(
            sqlgen().update_by_id_sql(&users()).unwrap(),
            "UPDATE users SET name = 'Bob' WHERE id = 5"
        );
    }

    #[test]
    fn test_update_by_id_multiple_columns() {
        let info = users().column("age", "41");
        assert_eq!(
            sqlgen().update_by_id_sql(&info).unwrap(),
            "UPDATE users SET name = 'Bob', age = 41 WHERE id = 5"
        );
    }

    #[test]
    fn test_update_by_id_requires_key() {
        let info = ValueInfo::new("users")
            .primary_key("id", "")
            .column("name", "'Bob'");
        assert!(sqlgen().update_by_id_sql(&info).unwrap_err().is_validation());
    }

    #[test]
    fn test_update_by_id_requires_fields() {
        let info = ValueInfo::new("users").primary_key("id", "5");
        let err = sqlgen().update_by_id_sql(&info).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Validation(ValidationError::NoFields { .. })
        ));
    }

    // =========================================================================
    // Delete by id
    // =========================================================================

    #[test]
    fn test_delete_by_id() {
        assert_eq!(
            sqlgen().delete_by_id_sql(&users()).unwrap(),
            "DELETE FROM users WHERE id = 5"
        );
    }

    #[test]
    fn test_delete_by_id_without_columns() {
        let info = ValueInfo::new("users").primary_key("id", "'abc'");
        assert_eq!(
            sqlgen().delete_by_id_sql(&info).unwrap(),
            "DELETE FROM users WHERE id = 'abc'"
        );
    }

    #[test]
    fn test_delete_by_id_requires_key() {
        let info = ValueInfo::new("users").primary_key("id", "");
        assert!(sqlgen().delete_by_id_sql(&info).unwrap_err().is_validation());
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    #[test]
    fn test_boxed_generator() {
        let generator: Box<dyn SqlGenerator> = Box::new(DefaultSqlGenerator::new());
        assert_eq!(
            generator.delete_by_id_sql(&users()).unwrap(),
            "DELETE FROM users WHERE id = 5"
        );
    }

    // =========================================================================
    // Statement logging
    // =========================================================================

    /// Collects the `sql` field of every event on [`SQL_LOG_TARGET`].
    #[derive(Clone, Default)]
    struct CapturedSql(Arc<Mutex<Vec<String>>>);

    impl CapturedSql {
        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    struct SqlField(Option<String>);

    impl Visit for SqlField {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "sql" {
                self.0 = Some(format!("{value:?}"));
            }
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for CapturedSql {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if event.metadata().target() != SQL_LOG_TARGET {
                return;
            }
            let mut field = SqlField(None);
            event.record(&mut field);
            if let Some(sql) = field.0 {
                self.0.lock().unwrap().push(sql);
            }
        }
    }

    fn capture<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
        let captured = CapturedSql::default();
        let subscriber = tracing_subscriber::registry().with(captured.clone());
        let out = tracing::subscriber::with_default(subscriber, f);
        (out, captured.take())
    }

    #[test]
    fn test_each_statement_is_logged_once() {
        let generator = sqlgen();
        let info = users();
        let type_info = TypeInfo::new("users", "id").column("name");
        let statements: [&dyn Fn() -> Result<String>; 5] = [
            &|| generator.list_sql(&type_info, &["name ASC"]),
            &|| generator.find_by_id_sql(&info),
            &|| generator.save_sql(&info),
            &|| generator.update_by_id_sql(&info),
            &|| generator.delete_by_id_sql(&info),
        ];
        for statement in statements {
            let (sql, logged) = capture(statement);
            assert_eq!(logged, vec![sql.unwrap()]);
        }
    }

    #[test]
    fn test_failed_statement_is_not_logged() {
        let keyless = ValueInfo::new("users").primary_key("id", "");
        let (result, logged) = capture(|| sqlgen().delete_by_id_sql(&keyless));
        assert!(result.unwrap_err().is_validation());
        assert!(logged.is_empty());

        let (result, logged) = capture(|| sqlgen().list_sql(&TypeInfo::new("", "id"), &[]));
        assert!(result.unwrap_err().is_metadata());
        assert!(logged.is_empty());
    }

    #[test]
    fn test_statement_logging_can_be_disabled() {
        let quiet =
            DefaultSqlGenerator::with_config(GeneratorConfig::default().log_statements(false));
        let (sql, logged) = capture(|| quiet.delete_by_id_sql(&users()));
        assert_eq!(sql.unwrap(), "DELETE FROM users WHERE id = 5");
        assert!(logged.is_empty());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let info = users().column("age", "41");
        assert_eq!(
            sqlgen().save_sql(&info).unwrap(),
            sqlgen().save_sql(&info).unwrap()
        );
    }
}

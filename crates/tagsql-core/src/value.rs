//! SQL values and literal rendering.
//!
//! Record fields are converted to [`SqlValue`] and rendered as inline SQL
//! literals. The generators concatenate these literals verbatim, so this is
//! the only place where quoting and escaping happen.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// A record field value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Unsigned integer value beyond the reach of `Int`.
    UInt(u64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time without zone. Zoned times are stored as UTC.
    Timestamp(NaiveDateTime),
}

impl SqlValue {
    /// Renders the value as an inline SQL literal.
    ///
    /// Returns `None` for values that SQL cannot express as a literal
    /// (NaN and infinite floats).
    #[must_use]
    pub fn to_literal(&self) -> Option<String> {
        let literal = match self {
            Self::Null => String::from("NULL"),
            Self::Bool(true) => String::from("TRUE"),
            Self::Bool(false) => String::from("FALSE"),
            Self::Int(n) => format!("{n}"),
            Self::UInt(n) => format!("{n}"),
            Self::Float(f) if !f.is_finite() => return None,
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => {
                // Escape single quotes by doubling them
                let escaped = s.replace('\'', "''");
                format!("'{escaped}'")
            }
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
            Self::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
            Self::Timestamp(ts) => format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S%.f")),
        };
        Some(literal)
    }

    /// Returns whether the value counts as "no value" for a primary key.
    ///
    /// NULL, integer zero (signed or unsigned) and the empty string are unset; a record holding one
    /// of them in its key field has not been assigned a key yet.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Int(n) => *n == 0,
            Self::UInt(n) => *n == 0,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

/// Trait for field types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(&self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(&self) -> SqlValue {
        self.clone()
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }
}

macro_rules! impl_to_sql_value_int {
    ($($t:ty),+ $(,)?) => {
        $(impl ToSqlValue for $t {
            fn to_sql_value(&self) -> SqlValue {
                SqlValue::Int(i64::from(*self))
            }
        })+
    };
}

impl_to_sql_value_int!(i8, i16, i32, i64, u8, u16, u32);

impl ToSqlValue for u64 {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::UInt(*self)
    }
}

impl ToSqlValue for usize {
    fn to_sql_value(&self) -> SqlValue {
        // usize is at most 64 bits on every supported target
        SqlValue::UInt(*self as u64)
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Float(*self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Float(f64::from(*self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(String::from(*self))
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(&self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Blob(self.clone())
    }
}

impl ToSqlValue for NaiveDate {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Date(*self)
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Timestamp(*self)
    }
}

impl ToSqlValue for DateTime<Utc> {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Timestamp(self.naive_utc())
    }
}

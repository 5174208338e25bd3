//! Classification of free-form list conditions.
//!
//! Callers pass list queries plain strings such as `"age = 30"` or
//! `"created_at DESC"`. Each string is classified independently:
//!
//! 1. containing `=` makes it a filter fragment (WHERE),
//! 2. otherwise containing a sort keyword makes it a sort fragment (ORDER BY),
//! 3. anything else is dropped.
//!
//! Matching is plain substring search. Quoted literals are not parsed, so a
//! sort-only fragment with `=` inside a quoted string is taken as a filter.

use tracing::trace;

/// Sort keywords recognised by default. Matching is case sensitive.
pub const DEFAULT_SORT_KEYWORDS: [&str; 4] = ["desc", "DESC", "asc", "ASC"];

/// How a condition string contributes to a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    /// Appended to the WHERE clause.
    Filter,
    /// Appended to the ORDER BY clause.
    Sort,
    /// Neither; the condition is dropped.
    Ignored,
}

/// Classifies one condition against `sort_keywords`.
///
/// Blank keywords never match.
#[must_use]
pub fn classify<S: AsRef<str>>(condition: &str, sort_keywords: &[S]) -> ConditionKind {
    if condition.contains('=') {
        ConditionKind::Filter
    } else if sort_keywords.iter().any(|keyword| {
        let keyword: &str = keyword.as_ref();
        !is_blank_keyword(keyword) && condition.contains(keyword)
    }) {
        ConditionKind::Sort
    } else {
        ConditionKind::Ignored
    }
}

/// Returns whether `keyword` is empty or only whitespace.
#[must_use]
pub fn is_blank_keyword(keyword: &str) -> bool {
    keyword.trim().is_empty()
}

/// WHERE and ORDER BY fragments accumulated from a list of conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clauses {
    filters: Vec<String>,
    sorts: Vec<String>,
}

impl Clauses {
    /// Classifies every condition, keeping caller order within each clause.
    pub fn collect<C, S>(conditions: &[C], sort_keywords: &[S]) -> Self
    where
        C: AsRef<str>,
        S: AsRef<str>,
    {
        let mut clauses = Self::default();
        for condition in conditions {
            let condition = condition.as_ref();
            match classify(condition, sort_keywords) {
                ConditionKind::Filter => clauses.filters.push(condition.to_string()),
                ConditionKind::Sort => clauses.sorts.push(condition.to_string()),
                ConditionKind::Ignored => trace!(condition, "dropping unrecognised list condition"),
            }
        }
        clauses
    }

    /// Filter fragments in caller order.
    #[must_use]
    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    /// Sort fragments in caller order.
    #[must_use]
    pub fn sorts(&self) -> &[String] {
        &self.sorts
    }

    /// Returns `WHERE <f1> <f2> ...`, or an empty string without filters.
    ///
    /// Fragments are joined with a single space and nothing else; callers
    /// supply their own `AND`/`OR`.
    #[must_use]
    pub fn where_clause(&self) -> String {
        if self.filters.is_empty() {
            return String::new();
        }
        let mut clause = String::from("WHERE");
        for filter in &self.filters {
            clause.push(' ');
            clause.push_str(filter);
        }
        clause
    }

    /// Returns `ORDER BY <s1>,<s2>`, or an empty string without sorts.
    #[must_use]
    pub fn order_by_clause(&self) -> String {
        if self.sorts.is_empty() {
            String::new()
        } else {
            format!("ORDER BY {}", self.sorts.join(","))
        }
    }
}

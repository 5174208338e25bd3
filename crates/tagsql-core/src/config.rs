//! Generator configuration.

use serde::{Deserialize, Deserializer, Serialize};

use crate::condition::{is_blank_keyword, DEFAULT_SORT_KEYWORDS};

/// Settings for [`DefaultSqlGenerator`](crate::DefaultSqlGenerator).
///
/// Every field has a default, so a partial JSON document such as
/// `{"log_statements": false}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Substrings that mark a list condition as a sort fragment. Blank
    /// entries are dropped on load.
    #[serde(deserialize_with = "deserialize_sort_keywords")]
    pub sort_keywords: Vec<String>,
    /// Emit every generated statement as a debug event.
    pub log_statements: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sort_keywords: DEFAULT_SORT_KEYWORDS.iter().map(|k| (*k).to_string()).collect(),
            log_statements: true,
        }
    }
}

impl GeneratorConfig {
    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Replaces the sort keywords, dropping blank ones.
    #[must_use]
    pub fn sort_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort_keywords = keywords
            .into_iter()
            .map(Into::into)
            .filter(|keyword: &String| !is_blank_keyword(keyword))
            .collect();
        self
    }

    /// Enables or disables statement logging.
    #[must_use]
    pub const fn log_statements(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }
}

fn deserialize_sort_keywords<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let keywords = Vec::<String>::deserialize(deserializer)?;
    Ok(keywords
        .into_iter()
        .filter(|keyword| !is_blank_keyword(keyword))
        .collect())
}

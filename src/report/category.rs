use crate::error::{RecapError, Result};
use std::fmt;

/// Ordered, validated set of category keywords (e.g. `add`, `fix`, `todo`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    keywords: Vec<String>,
}

impl CategorySet {
    /// Build a category set, rejecting keywords that cannot act as tags
    pub fn new<I, S>(keywords: I, delimiter: char) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut validated: Vec<String> = Vec::new();

        for keyword in keywords {
            let keyword = keyword.into();

            if keyword.is_empty() {
                return Err(RecapError::invalid_category(keyword, "keyword is empty"));
            }
            if keyword.chars().any(char::is_whitespace) {
                return Err(RecapError::invalid_category(keyword, "contains whitespace"));
            }
            if keyword.contains(delimiter) {
                return Err(RecapError::invalid_category(
                    keyword,
                    format!("contains the delimiter {:?}", delimiter),
                ));
            }
            if validated.contains(&keyword) {
                return Err(RecapError::invalid_category(keyword, "listed twice"));
            }

            validated.push(keyword);
        }

        if validated.is_empty() {
            return Err(RecapError::config("at least one category is required"));
        }

        Ok(Self { keywords: validated })
    }

    /// Parse a pipe-delimited list such as `add|fix|todo`
    pub fn parse_list(list: &str, delimiter: char) -> Result<Self> {
        Self::new(list.split('|').map(str::trim), delimiter)
    }

    /// Keywords in configured order
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Regex alternation of the escaped keywords, longest first so that
    /// `prefix` wins over `pre` when both are configured
    pub fn alternation(&self) -> String {
        let mut sorted: Vec<&String> = self.keywords.iter().collect();
        sorted.sort_by(|a, b| b.len().cmp(&a.len()));

        sorted
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self {
            keywords: vec!["add".to_string(), "fix".to_string(), "todo".to_string()],
        }
    }
}

impl fmt::Display for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keywords.join("|"))
    }
}

use crate::error::Result;
use crate::report::category::CategorySet;
use crate::report::Aggregation;
use regex::Regex;
use tracing::{debug, trace};

/// Full-width colon, commonly typed by IME users instead of `:`
pub const FULLWIDTH_COLON: &str = "：";

/// A tagged piece of a commit message, e.g. `fix:crash on save`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub category: &'a str,
    pub message: &'a str,
}

/// Extracts category-tagged fragments from raw log text and tallies them
#[derive(Debug, Clone)]
pub struct Classifier {
    categories: CategorySet,
    delimiter: char,
    delimiter_variants: Vec<String>,
    quote_chars: Vec<char>,
    tag: Regex,
}

impl Classifier {
    /// Compile the tag rule for `categories` followed by `delimiter`
    pub fn new(categories: CategorySet, delimiter: char) -> Result<Self> {
        let pattern = format!(
            "(?:{}){}",
            categories.alternation(),
            regex::escape(&delimiter.to_string())
        );
        let tag = Regex::new(&pattern)?;

        debug!(%pattern, "compiled tag pattern");

        Ok(Self {
            categories,
            delimiter,
            delimiter_variants: vec![FULLWIDTH_COLON.to_string()],
            quote_chars: vec!['"'],
            tag,
        })
    }

    /// Set the strings that are rewritten to the delimiter before matching
    pub fn with_delimiter_variants(mut self, variants: Vec<String>) -> Self {
        self.delimiter_variants = variants.into_iter().filter(|v| !v.is_empty()).collect();
        self
    }

    /// Set the decorative quote characters stripped before matching
    pub fn with_quote_chars(mut self, quote_chars: Vec<char>) -> Self {
        self.quote_chars = quote_chars;
        self
    }

    /// Classify the whole log text in one pass
    pub fn classify(&self, log_text: &str) -> Aggregation {
        let normalized = self.normalize(log_text);
        let mut aggregation = Aggregation::empty(&self.categories);

        for raw in self.extract_fragments(&normalized) {
            match self.split_fragment(raw) {
                Some(fragment) => {
                    trace!(category = fragment.category, message = fragment.message, "fragment");
                    aggregation.record(fragment.category, fragment.message);
                }
                None => debug!(fragment = raw, "ignoring fragment with unknown category"),
            }
        }

        debug!(
            fragments = aggregation.total(),
            categories = self.categories.len(),
            "classified log text"
        );

        aggregation
    }

    /// Strip quote characters and rewrite delimiter variants to the delimiter
    pub fn normalize(&self, log_text: &str) -> String {
        let mut text: String = log_text
            .chars()
            .filter(|c| !self.quote_chars.contains(c))
            .collect();

        let delimiter = self.delimiter.to_string();
        for variant in &self.delimiter_variants {
            if text.contains(variant.as_str()) {
                text = text.replace(variant.as_str(), &delimiter);
            }
        }

        text
    }

    /// Find every tagged fragment, line by line.
    ///
    /// A fragment runs from its tag to the end of the line, or to the
    /// whitespace preceding the next tag on the same line.
    pub fn extract_fragments<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut fragments = Vec::new();

        for line in text.lines() {
            let starts: Vec<usize> = self
                .tag
                .find_iter(line)
                .map(|m| m.start())
                .filter(|&start| is_tag_position(line, start))
                .collect();

            for (i, &start) in starts.iter().enumerate() {
                let end = starts.get(i + 1).copied().unwrap_or(line.len());
                fragments.push(line[start..end].trim_end());
            }
        }

        fragments
    }

    /// Split a fragment at its first delimiter; `None` for unknown categories
    pub fn split_fragment<'a>(&self, fragment: &'a str) -> Option<Fragment<'a>> {
        let (category, message) = fragment.split_once(self.delimiter)?;

        if !self.categories.contains(category) {
            return None;
        }

        Some(Fragment {
            category,
            message: message.trim(),
        })
    }
}

/// A tag must not continue an ASCII word (`prefix:` is not a `fix` tag)
fn is_tag_position(line: &str, start: usize) -> bool {
    line[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '_'))
}

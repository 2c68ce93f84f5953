use crate::error::Result;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Placeholder syntax: `${identifier}`, identifier being anything but `}`
const PLACEHOLDER_PATTERN: &str = r"\$\{([^}]*)\}";

/// Key/value store used to fill template placeholders
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemplateParams {
    values: BTreeMap<String, String>,
}

impl TemplateParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value. Keys are expected to be written once per run; an
    /// overwrite keeps the newer value and is logged.
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();

        if let Some(previous) = self.values.get(&key) {
            if *previous != value {
                warn!(key = %key, "template parameter overwritten");
            }
        }

        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for TemplateParams {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Self::new();
        params.extend(iter);
        params
    }
}

/// Fills `${name}` placeholders from a [`TemplateParams`] store.
///
/// Missing keys render as the empty string. Substitution is a single pass
/// over the template, so a value that itself contains `${...}` is emitted
/// verbatim and never expanded again.
#[derive(Debug, Clone)]
pub struct Renderer {
    placeholder: Regex,
}

impl Renderer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            placeholder: Regex::new(PLACEHOLDER_PATTERN)?,
        })
    }

    /// Distinct placeholder identifiers in first-seen order
    pub fn placeholders<'t>(&self, template: &'t str) -> Vec<&'t str> {
        let mut seen: Vec<&'t str> = Vec::new();

        for caps in self.placeholder.captures_iter(template) {
            if let Some(key) = caps.get(1) {
                if !seen.contains(&key.as_str()) {
                    seen.push(key.as_str());
                }
            }
        }

        seen
    }

    /// Placeholders of `template` that `params` has no value for
    pub fn missing_keys(&self, template: &str, params: &TemplateParams) -> Vec<String> {
        self.placeholders(template)
            .into_iter()
            .filter(|key| !params.contains_key(key))
            .map(String::from)
            .collect()
    }

    /// Render `template` against `params`
    pub fn render(&self, template: &str, params: &TemplateParams) -> String {
        // Resolve each distinct placeholder once, then substitute every occurrence
        let resolved: HashMap<&str, &str> = self
            .placeholders(template)
            .into_iter()
            .map(|key| {
                let value = params.get(key).unwrap_or_else(|| {
                    debug!(key, "no value for placeholder, rendering empty");
                    ""
                });
                (key, value)
            })
            .collect();

        if resolved.is_empty() {
            return template.to_string();
        }

        self.placeholder
            .replace_all(template, |caps: &Captures| {
                let key = caps.get(1).map_or("", |m| m.as_str());
                resolved.get(key).copied().unwrap_or("").to_string()
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> TemplateParams {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_render_basic() {
        let renderer = Renderer::new().unwrap();
        let out = renderer.render(
            "【${projectName}】进度${projectProcess}%",
            &params(&[("projectName", "Demo"), ("projectProcess", "80")]),
        );
        assert_eq!(out, "【Demo】进度80%");
    }

    #[test]
    fn test_missing_key_renders_empty() {
        let renderer = Renderer::new().unwrap();
        assert_eq!(renderer.render("Name: ${missing}", &TemplateParams::new()), "Name: ");
    }

    #[test]
    fn test_no_placeholders_unchanged() {
        let renderer = Renderer::new().unwrap();
        let template = "plain text with $ and {braces}";
        assert_eq!(renderer.render(template, &params(&[("a", "b")])), template);
    }

    #[test]
    fn test_repeated_placeholder_gets_same_value() {
        let renderer = Renderer::new().unwrap();
        let out = renderer.render("${x}-${x}-${x}", &params(&[("x", "7")]));
        assert_eq!(out, "7-7-7");
    }

    #[test]
    fn test_values_are_not_expanded_again() {
        let renderer = Renderer::new().unwrap();
        let out = renderer.render(
            "${a} ${b}",
            &params(&[("a", "${b}"), ("b", "B")]),
        );
        assert_eq!(out, "${b} B");
    }

    #[test]
    fn test_empty_identifier_uses_empty_key() {
        let renderer = Renderer::new().unwrap();
        assert_eq!(renderer.render("[${}]", &TemplateParams::new()), "[]");
        assert_eq!(renderer.render("[${}]", &params(&[("", "e")])), "[e]");
    }

    #[test]
    fn test_render_is_idempotent() {
        let renderer = Renderer::new().unwrap();
        let store = params(&[("name", "Demo")]);
        let template = "${name} ${other}";
        let first = renderer.render(template, &store);
        let second = renderer.render(template, &store);
        assert_eq!(first, second);
        assert_eq!(store, params(&[("name", "Demo")]));
    }

    #[test]
    fn test_placeholders_and_missing_keys() {
        let renderer = Renderer::new().unwrap();
        let template = "${b} ${a} ${b} ${c}";
        assert_eq!(renderer.placeholders(template), vec!["b", "a", "c"]);
        assert_eq!(
            renderer.missing_keys(template, &params(&[("a", "1")])),
            vec!["b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_params_overwrite_keeps_latest() {
        let mut store = TemplateParams::new();
        store.insert("k", "1");
        store.insert("k", "2");
        assert_eq!(store.get("k"), Some("2"));
        assert_eq!(store.iter().count(), 1);
    }
}

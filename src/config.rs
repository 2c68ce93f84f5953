use crate::error::{RecapError, Result};
use crate::report::category::CategorySet;
use crate::report::classifier::FULLWIDTH_COLON;
use crate::report::{DEFAULT_DETAIL_TEMPLATE, DEFAULT_SUMMARY_SENTENCE, DEFAULT_SUMMARY_TEMPLATE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default author filter (name or email substring)
    pub default_author: Option<String>,

    /// Default timespan in days (default: 7 days / 1 week)
    #[serde(default = "default_timespan")]
    pub default_timespan_days: u32,

    /// Category keywords, in report order
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Separator between a category keyword and its message
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Strings rewritten to `delimiter` before matching
    #[serde(default = "default_delimiter_variants")]
    pub delimiter_variants: Vec<String>,

    /// Decorative quote characters stripped from the log
    #[serde(default = "default_quote_chars")]
    pub quote_chars: String,

    /// Separator used to join the messages of a category list
    #[serde(default = "default_list_separator")]
    pub list_separator: String,

    /// Template for the `totalMsg` sentence
    #[serde(default = "default_summary_sentence")]
    pub summary_sentence: String,

    /// Only use the first line of each commit message
    #[serde(default = "default_true")]
    pub subject_only: bool,

    /// Report templates
    #[serde(default)]
    pub templates: Templates,

    /// Extra template parameters (e.g. nextPlain, needHelp)
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// Summary and detail report templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Templates {
    #[serde(default = "default_summary_template")]
    pub summary: String,

    #[serde(default = "default_detail_template")]
    pub detail: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            summary: default_summary_template(),
            detail: default_detail_template(),
        }
    }
}

impl Config {
    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RecapError::config(format!(
                "Config file not found at: {}",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| RecapError::config("Could not determine home directory"))?;
        Ok(home.join(".config").join("weekly-recap").join("config.toml"))
    }

    /// Write a default configuration file to `path`
    pub fn create_default_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config = Self::default();
        let toml_string = toml::to_string_pretty(&config)?;
        fs::write(path, toml_string)?;

        Ok(config)
    }

    /// Load the default config file, falling back to built-in defaults
    /// when there is none
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Validated category set built from `categories`
    pub fn category_set(&self) -> Result<CategorySet> {
        CategorySet::new(self.categories.iter().cloned(), self.delimiter)
    }

    /// Quote characters as a list
    pub fn quote_char_list(&self) -> Vec<char> {
        self.quote_chars.chars().collect()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.delimiter.is_whitespace() {
            return Err(RecapError::config("delimiter must not be whitespace"));
        }

        self.category_set()?;

        if self.default_timespan_days == 0 {
            return Err(RecapError::config("default_timespan_days must be > 0"));
        }

        if self
            .delimiter_variants
            .iter()
            .any(|v| v.chars().any(char::is_whitespace))
        {
            return Err(RecapError::config(
                "delimiter_variants must not contain whitespace",
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_author: None,
            default_timespan_days: default_timespan(),
            categories: default_categories(),
            delimiter: default_delimiter(),
            delimiter_variants: default_delimiter_variants(),
            quote_chars: default_quote_chars(),
            list_separator: default_list_separator(),
            summary_sentence: default_summary_sentence(),
            subject_only: default_true(),
            templates: Templates::default(),
            params: BTreeMap::new(),
        }
    }
}

// Serde default functions
fn default_timespan() -> u32 {
    7 // 1 week
}

fn default_categories() -> Vec<String> {
    CategorySet::default().keywords().to_vec()
}

fn default_delimiter() -> char {
    ':'
}

fn default_delimiter_variants() -> Vec<String> {
    vec![FULLWIDTH_COLON.to_string()]
}

fn default_quote_chars() -> String {
    "\"".to_string()
}

fn default_list_separator() -> String {
    "\n".to_string()
}

fn default_summary_sentence() -> String {
    DEFAULT_SUMMARY_SENTENCE.to_string()
}

fn default_summary_template() -> String {
    DEFAULT_SUMMARY_TEMPLATE.to_string()
}

fn default_detail_template() -> String {
    DEFAULT_DETAIL_TEMPLATE.to_string()
}

fn default_true() -> bool {
    true
}

use crate::error::{RecapError, Result};
use crate::report::category::CategorySet;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "weekly-recap")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Turn tagged git commit messages into a weekly status report",
    long_about = "weekly-recap reads your commit messages for a time window, collects \
                  fragments tagged like `add:`, `fix:` or `todo:`, and fills a summary \
                  and a detail report template with the counts and message lists."
)]
pub struct Cli {
    /// Repository to read the log from (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Read log text from a file instead of git ("-" for stdin)
    #[arg(long, value_name = "FILE", conflicts_with = "path")]
    pub log_file: Option<PathBuf>,

    /// Author name or email to filter commits
    #[arg(short, long)]
    pub author: Option<String>,

    /// Number of days to look back
    #[arg(short, long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// Start date (YYYY-MM-DD format)
    #[arg(long)]
    pub since: Option<String>,

    /// End date (YYYY-MM-DD format)
    #[arg(long)]
    pub until: Option<String>,

    /// Project name
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// Project progress in percent
    #[arg(long, default_value = "")]
    pub process: String,

    /// Pipe-delimited category keywords, e.g. "add|fix|todo"
    #[arg(long, value_name = "LIST")]
    pub items: Option<String>,

    /// Extra template parameter (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Path to config file (default: ~/.config/weekly-recap/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output file path
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the report data as JSON instead of the rendered templates
    #[arg(long)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration
    Config,
}

impl Cli {
    /// Validate CLI arguments
    pub fn validate(&self) -> std::result::Result<(), String> {
        // Can't specify both --days and --since/--until
        if self.days.is_some() && (self.since.is_some() || self.until.is_some()) {
            return Err(
                "Cannot specify both --days and --since/--until. Choose one.".to_string()
            );
        }

        if self.days == Some(0) {
            return Err("--days must be > 0".to_string());
        }

        Ok(())
    }

    /// Categories from --items, validated against `delimiter`
    pub fn category_override(&self, delimiter: char) -> Result<Option<CategorySet>> {
        self.items
            .as_deref()
            .map(|list| CategorySet::parse_list(list, delimiter))
            .transpose()
    }

    /// Parsed --param pairs, in command-line order
    pub fn parsed_params(&self) -> Result<Vec<(String, String)>> {
        self.params
            .iter()
            .map(|raw| match raw.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    Ok((key.trim().to_string(), value.to_string()))
                }
                _ => Err(RecapError::InvalidParam(raw.clone())),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_basic() {
        let cli = Cli::parse_from(vec!["weekly-recap"]);
        assert!(cli.path.is_none());
        assert!(cli.author.is_none());
        assert!(cli.command.is_none());
        assert_eq!(cli.name, "");
        assert!(cli.params.is_empty());
    }

    #[test]
    fn test_cli_parse_with_options() {
        let cli = Cli::parse_from(vec![
            "weekly-recap",
            "--author",
            "test@example.com",
            "--since",
            "2024-03-04",
            "--name",
            "Demo",
            "--process",
            "80",
            "--items",
            "add|fix",
            "--param",
            "nextPlain=ship it",
            "--param",
            "needHelp=",
        ]);
        assert_eq!(cli.author, Some("test@example.com".to_string()));
        assert_eq!(cli.since, Some("2024-03-04".to_string()));
        assert_eq!(cli.name, "Demo");
        assert_eq!(cli.process, "80");
        assert!(cli.validate().is_ok());

        let categories = cli.category_override(':').unwrap().unwrap();
        assert_eq!(categories.keywords(), &["add", "fix"]);

        let params = cli.parsed_params().unwrap();
        assert_eq!(
            params,
            vec![
                ("nextPlain".to_string(), "ship it".to_string()),
                ("needHelp".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_cli_bad_param() {
        let cli = Cli::parse_from(vec!["weekly-recap", "--param", "novalue"]);
        assert!(matches!(cli.parsed_params(), Err(RecapError::InvalidParam(_))));

        let cli = Cli::parse_from(vec!["weekly-recap", "--param", "=x"]);
        assert!(cli.parsed_params().is_err());
    }

    #[test]
    fn test_cli_bad_items() {
        let cli = Cli::parse_from(vec!["weekly-recap", "--items", "add||fix"]);
        assert!(cli.category_override(':').is_err());

        let cli = Cli::parse_from(vec!["weekly-recap"]);
        assert!(cli.category_override(':').unwrap().is_none());
    }

    #[test]
    fn test_cli_init_command() {
        let cli = Cli::parse_from(vec!["weekly-recap", "init"]);
        assert!(matches!(cli.command, Some(Commands::Init { force: false })));
    }

    #[test]
    fn test_cli_validation_days_and_since() {
        let cli = Cli::parse_from(vec![
            "weekly-recap",
            "--days",
            "30",
            "--since",
            "2025-01-01",
        ]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_cli_log_file_conflicts_with_path() {
        let result = Cli::try_parse_from(vec![
            "weekly-recap",
            "--path",
            ".",
            "--log-file",
            "log.txt",
        ]);
        assert!(result.is_err());
    }
}

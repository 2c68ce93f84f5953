mod cli;
mod config;
mod error;
mod git;
mod orchestrator;
mod report;

use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use git::{LogQuery, LogSource, Timespan};
use indicatif::{ProgressBar, ProgressStyle};
use orchestrator::Orchestrator;
use report::ProjectInfo;
use std::path::PathBuf;
use tracing::{warn, Level};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Validate CLI arguments
    if let Err(e) = cli.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    init_tracing(cli.verbose);

    // Handle subcommands
    if let Some(command) = &cli.command {
        return handle_command(command, &cli);
    }

    // Load config
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load_or_default()?
    };

    // Apply CLI overrides to config
    let config = apply_cli_overrides(config, &cli)?;

    // Invalid categories abort here, before anything is read or rendered
    let orchestrator = Orchestrator::new(config)?;

    run_report(&orchestrator, &cli)
}

fn run_report(orchestrator: &Orchestrator, cli: &Cli) -> Result<()> {
    let extra = cli.parsed_params()?;
    let source = log_source(orchestrator.config(), cli)?;

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Reading {}...", source.describe()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    // A failed read still produces a report, with zero counts
    let log_text = match orchestrator.fetch_log(&source) {
        Ok(text) => {
            spinner.finish_and_clear();
            text
        }
        Err(e) if e.is_retrieval() => {
            spinner.finish_and_clear();
            warn!(error = %e, "could not read log, continuing with empty log");
            eprintln!("Warning: could not read {}: {}", source.describe(), e);
            String::new()
        }
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };

    let project = ProjectInfo::new(cli.name.clone(), cli.process.clone());
    let report = orchestrator.generate(&log_text, &project, &extra);

    let output = if cli.json {
        serde_json::to_string_pretty(&report)? + "\n"
    } else {
        report.to_text()
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, output)?;
            eprintln!("✓ Report written to: {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}

fn log_source(config: &Config, cli: &Cli) -> Result<LogSource> {
    if let Some(ref file) = cli.log_file {
        return Ok(LogSource::File(file.clone()));
    }

    let timespan = match cli.days {
        Some(days) => Timespan::days_back(days),
        None => Timespan::from_args(
            cli.since.as_deref(),
            cli.until.as_deref(),
            config.default_timespan_days,
        )?,
    };

    Ok(LogSource::Git {
        repo: cli.path.clone().unwrap_or_else(|| PathBuf::from(".")),
        query: LogQuery {
            author: config.default_author.clone(),
            timespan,
            subject_only: config.subject_only,
        },
    })
}

fn handle_command(command: &Commands, cli: &Cli) -> Result<()> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_config_path()?,
    };

    match command {
        Commands::Init { force } => {
            if config_path.exists() && !force {
                eprintln!(
                    "Config file already exists at: {}",
                    config_path.display()
                );
                eprintln!("Use --force to overwrite");
                std::process::exit(1);
            }

            Config::create_default_at(&config_path)?;
            println!("✓ Created config file at: {}", config_path.display());
        }
        Commands::Config => {
            let config = if config_path.exists() {
                Config::load_from(&config_path)?
            } else {
                Config::default()
            };
            let toml_str = toml::to_string_pretty(&config)?;
            println!("Current configuration:\n");
            println!("{}", toml_str);
        }
    }
    Ok(())
}

fn apply_cli_overrides(mut config: Config, cli: &Cli) -> Result<Config> {
    // Override author if provided
    if let Some(ref author) = cli.author {
        config.default_author = Some(author.clone());
    }

    // Override timespan if provided
    if let Some(days) = cli.days {
        config.default_timespan_days = days;
    }

    // Override categories if provided
    if let Some(categories) = cli.category_override(config.delimiter)? {
        config.categories = categories.keywords().to_vec();
    }

    Ok(config)
}

/// Log to stderr; -v for info, -vv for debug, -vvv for trace
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

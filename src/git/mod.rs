pub mod log;

use crate::error::{RecapError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use std::path::PathBuf;

/// Timespan for filtering commits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timespan {
    /// Start date (inclusive)
    pub start: DateTime<Utc>,
    /// End date (inclusive)
    pub end: DateTime<Utc>,
}

impl Timespan {
    /// Create a timespan from days back from now
    pub fn days_back(days: u32) -> Self {
        let end = Utc::now();
        let start = end - Duration::days(days as i64);
        Self { start, end }
    }

    /// Build a timespan from `--since`/`--until` strings (YYYY-MM-DD).
    ///
    /// A missing `since` falls back to `default_days` before `until`; a
    /// missing `until` means now. `until` covers its whole day.
    pub fn from_args(since: Option<&str>, until: Option<&str>, default_days: u32) -> Result<Self> {
        let end = match until {
            Some(date) => end_of_day(parse_date(date)?),
            None => Utc::now(),
        };
        let start = match since {
            Some(date) => start_of_day(parse_date(date)?),
            None => end - Duration::days(default_days as i64),
        };

        if start > end {
            return Err(RecapError::config(format!(
                "--since {} is after --until {}",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            )));
        }

        Ok(Self { start, end })
    }

    /// Check if a date is within this timespan
    pub fn contains(&self, date: &DateTime<Utc>) -> bool {
        date >= &self.start && date <= &self.end
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| RecapError::InvalidDate(value.to_string()))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::days(1) - Duration::seconds(1)
}

/// Commit filter applied while walking a repository
#[derive(Debug, Clone)]
pub struct LogQuery {
    /// Case-insensitive substring of the author name or email
    pub author: Option<String>,
    pub timespan: Timespan,
    /// Only the first line of each message, like `git log --pretty=%s`
    pub subject_only: bool,
}

/// Where the raw log text comes from
#[derive(Debug, Clone)]
pub enum LogSource {
    /// Walk a git repository from HEAD
    Git { repo: PathBuf, query: LogQuery },
    /// Read a text file; `-` reads stdin
    File(PathBuf),
}

impl LogSource {
    /// Fetch the raw log text blob
    pub fn read(&self) -> Result<String> {
        match self {
            LogSource::Git { repo, query } => log::LogReader::new(query.clone()).read_log(repo),
            LogSource::File(path) if path.as_os_str() == "-" => {
                let mut text = String::new();
                std::io::Read::read_to_string(&mut std::io::stdin(), &mut text)?;
                Ok(text)
            }
            LogSource::File(path) => Ok(std::fs::read_to_string(path)?),
        }
    }

    /// Human-readable description for progress output
    pub fn describe(&self) -> String {
        match self {
            LogSource::Git { repo, .. } => format!("git log of {}", repo.display()),
            LogSource::File(path) if path.as_os_str() == "-" => "stdin".to_string(),
            LogSource::File(path) => path.display().to_string(),
        }
    }
}

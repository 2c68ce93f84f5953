use crate::error::Result;
use crate::git::LogQuery;
use chrono::{DateTime, TimeZone, Utc};
use git2::Repository;
use std::path::Path;
use tracing::debug;

/// Reads commit messages from a repository, filtered by author and timespan
pub struct LogReader {
    query: LogQuery,
}

impl LogReader {
    pub fn new(query: LogQuery) -> Self {
        Self { query }
    }

    /// Collect matching commit messages, newest first, one entry per line
    pub fn read_messages(&self, repo_path: &Path) -> Result<Vec<String>> {
        let repo = Repository::open(repo_path)?;
        let mut revwalk = repo.revwalk()?;

        revwalk.push_head()?;
        revwalk.set_sorting(git2::Sort::TIME)?;

        let mut messages = Vec::new();
        let mut skipped = 0usize;

        for oid in revwalk {
            let commit = repo.find_commit(oid?)?;

            if !self.query.timespan.contains(&Self::convert_timestamp(&commit)) {
                skipped += 1;
                continue;
            }

            if !self.matches_author(&commit) {
                skipped += 1;
                continue;
            }

            let message = commit.message().unwrap_or("");
            let entry = if self.query.subject_only {
                Self::subject(message)
            } else {
                message.trim_end().to_string()
            };

            messages.push(entry);
        }

        debug!(
            repo = %repo_path.display(),
            kept = messages.len(),
            skipped,
            "read commit messages"
        );

        Ok(messages)
    }

    /// The log as a single text blob
    pub fn read_log(&self, repo_path: &Path) -> Result<String> {
        Ok(self.read_messages(repo_path)?.join("\n"))
    }

    fn matches_author(&self, commit: &git2::Commit) -> bool {
        let Some(ref filter) = self.query.author else {
            return true;
        };
        let filter = filter.to_lowercase();
        let author = commit.author();

        let matched = [author.name(), author.email()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&filter));
        matched
    }

    /// Convert git2 Time to DateTime<Utc>
    fn convert_timestamp(commit: &git2::Commit) -> DateTime<Utc> {
        Utc.timestamp_opt(commit.time().seconds(), 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// First line of a commit message
    fn subject(message: &str) -> String {
        message.lines().next().unwrap_or("").trim().to_string()
    }
}

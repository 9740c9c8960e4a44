//! The append-only marker file whose commits trigger a deployment.

use chrono::{DateTime, Local, TimeZone};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// File name of the deployment log, relative to the working copy root.
pub const DEPLOY_LOG_FILE: &str = "auto_deploy_log.txt";

/// Render a timestamp the way US-English locales print a date and time,
/// e.g. `10/18/2026, 3:04:05 PM`.
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Timestamp for "now" in the process-local time zone.
pub fn local_timestamp() -> String {
    format_timestamp(&Local::now())
}

pub fn entry_line(timestamp: &str, actor: &str) -> String {
    format!("Deploy triggered at {} by {}", timestamp, actor)
}

pub fn commit_message(timestamp: &str) -> String {
    format!("chore: auto deploy trigger @ {}", timestamp)
}

#[derive(Debug, Clone)]
pub struct DeployLog {
    path: PathBuf,
}

impl DeployLog {
    /// The deployment log inside the given working copy.
    pub fn in_working_copy(working_copy: &Path) -> Self {
        Self {
            path: working_copy.join(DEPLOY_LOG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry, creating the file if needed.
    ///
    /// Each entry is written as a newline followed by the entry text, so the
    /// last line of the file is always the most recent deployment.
    pub async fn append(&self, timestamp: &str, actor: &str) -> std::io::Result<()> {
        let line = format!("\n{}", entry_line(timestamp, actor));
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        debug!("Appended to {}: {}", self.path.display(), line.trim_start());
        Ok(())
    }
}

//! Git synchronization backend.
//!
//! The handler talks to git through the [`GitBackend`] trait. [`GitCli`]
//! implements it by running the `git` binary, one subprocess per operation.

use crate::config::BotIdentity;
use crate::error::{DeployError, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{self, debug, error, info};

pub const REMOTE: &str = "origin";
pub const BRANCH: &str = "main";

#[async_trait]
pub trait GitBackend: Send + Sync {
    /// Full clone of `remote_url` into `path`.
    async fn clone_repo(&self, remote_url: &SecretString, path: &Path) -> Result<()>;

    /// `git pull --rebase` of `branch` from `remote`.
    async fn pull_rebase(&self, path: &Path, remote: &str, branch: &str) -> Result<()>;

    /// Set the local `user.name`/`user.email` of the working copy.
    async fn set_identity(&self, path: &Path, identity: &BotIdentity) -> Result<()>;

    async fn add(&self, path: &Path, file: &str) -> Result<()>;

    async fn commit(&self, path: &Path, message: &str) -> Result<()>;

    async fn push(&self, path: &Path, remote: &str, branch: &str) -> Result<()>;
}

/// Runs the system `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
        }
    }

    #[cfg(test)]
    fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run one git command and return its stdout.
    ///
    /// `command_line` is what gets logged and reported in errors; it must never
    /// contain credentials.
    async fn run(
        &self,
        cwd: Option<&Path>,
        args: &[&str],
        command_line: &str,
    ) -> Result<String> {
        let cwd_label = cwd
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ".".to_string());
        info!("Running (cwd = '{}'): {}", cwd_label, command_line);

        let mut command = Command::new(&self.program);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        let output = command
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                error!("{} failed to start: {}", command_line, e);
                DeployError::git(command_line, format!("failed to start: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let msg = format!("exit status {}: {}", output.status, stderr.trim());
            error!("{} failed: {}", command_line, msg);
            return Err(DeployError::git(command_line, msg));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        debug!("{} output:\n{}", command_line, stdout);
        Ok(stdout)
    }
}

#[async_trait]
impl GitBackend for GitCli {
    async fn clone_repo(&self, remote_url: &SecretString, path: &Path) -> Result<()> {
        let target = path.to_string_lossy();
        let command_line = format!("git clone <remote> {}", target);
        self.run(None, &["clone", remote_url.expose_secret(), &*target], &command_line)
            .await
            .map(|_| ())
    }

    async fn pull_rebase(&self, path: &Path, remote: &str, branch: &str) -> Result<()> {
        let args = ["pull", "--rebase=true", remote, branch];
        self.run(Some(path), &args, &format!("git {}", args.join(" ")))
            .await
            .map(|_| ())
    }

    async fn set_identity(&self, path: &Path, identity: &BotIdentity) -> Result<()> {
        for (key, value) in [
            ("user.name", identity.name.as_str()),
            ("user.email", identity.email.as_str()),
        ] {
            let args = ["config", "--local", key, value];
            self.run(Some(path), &args, &format!("git config --local {}", key))
                .await?;
        }
        Ok(())
    }

    async fn add(&self, path: &Path, file: &str) -> Result<()> {
        self.run(Some(path), &["add", file], &format!("git add {}", file))
            .await
            .map(|_| ())
    }

    async fn commit(&self, path: &Path, message: &str) -> Result<()> {
        self.run(
            Some(path),
            &["commit", "-m", message],
            &format!("git commit -m {:?}", message),
        )
        .await
        .map(|_| ())
    }

    async fn push(&self, path: &Path, remote: &str, branch: &str) -> Result<()> {
        let args = ["push", remote, branch];
        self.run(Some(path), &args, &format!("git {}", args.join(" ")))
            .await
            .map(|_| ())
    }
}

//! Process configuration, read once from the environment at startup.

use crate::error::{DeployError, Result};
use secrecy::{ExposeSecret, SecretString};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_LOCAL_PATH: &str = "./repo";
pub const DEFAULT_BOT_NAME: &str = "auto-deploy-bot";
pub const DEFAULT_AUTHOR_EMAIL: &str = "auto-deploy-bot@users.noreply.github.com";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_MAX_FILES: usize = 5;

/// Name and email the automatic commits are authored with.
///
/// The name doubles as the loop-avoidance sentinel: pushes made by this
/// identity are never acted upon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub name: String,
    pub email: String,
}

#[derive(Debug)]
pub struct DeployConfig {
    pub github_token: SecretString,
    pub repo_url: String,
    pub local_path: PathBuf,
    pub bot: BotIdentity,
    pub port: u16,
    pub log_dir: Option<PathBuf>,
    /// How many rotated log files to keep in `log_dir`.
    pub log_max_files: usize,
}

impl DeployConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    /// Empty values are treated the same as missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let github_token = get("GITHUB_TOKEN").ok_or_else(|| {
            DeployError::ConfigError("GITHUB_TOKEN is not set in environment variables".into())
        })?;
        let repo_url = get("REPO_URL").ok_or_else(|| {
            DeployError::ConfigError("REPO_URL is not set in environment variables".into())
        })?;

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                DeployError::ConfigError(format!("PORT '{}' is not a valid port: {}", raw, e))
            })?,
            None => DEFAULT_PORT,
        };

        let log_max_files = match get("LOG_MAX_FILES") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(DeployError::ConfigError(format!(
                        "LOG_MAX_FILES '{}' must be a positive number",
                        raw
                    )));
                }
            },
            None => DEFAULT_LOG_MAX_FILES,
        };

        Ok(Self {
            github_token: SecretString::from(github_token),
            repo_url,
            local_path: get("LOCAL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_PATH)),
            bot: BotIdentity {
                name: get("BOT_NAME").unwrap_or_else(|| DEFAULT_BOT_NAME.to_string()),
                email: get("AUTHOR_EMAIL").unwrap_or_else(|| DEFAULT_AUTHOR_EMAIL.to_string()),
            },
            port,
            log_dir: get("LOG_DIR").map(PathBuf::from),
            log_max_files,
        })
    }

    /// Remote URL with the token embedded as the basic-auth user of the
    /// first `https://` scheme. URLs without one are returned unchanged.
    pub fn authenticated_remote_url(&self) -> SecretString {
        let with_token = self.repo_url.replacen(
            "https://",
            &format!("https://{}@", self.github_token.expose_secret()),
            1,
        );
        SecretString::from(with_token)
    }

    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

pub mod api;
pub mod config;
pub mod deploy_log;
pub mod error;
pub mod git;
pub mod logging;
pub mod webhook;

use config::DeployConfig;
use git::GitBackend;
use std::sync::Arc;

/// Everything a webhook delivery needs, built once at startup.
///
/// Nothing guards the working copy: overlapping deliveries run their git
/// sequences concurrently.
pub struct AppState {
    pub config: DeployConfig,
    pub git: Arc<dyn GitBackend>,
}

impl AppState {
    pub fn new(config: DeployConfig, git: Arc<dyn GitBackend>) -> Self {
        Self { config, git }
    }
}

pub type SharedState = Arc<AppState>;

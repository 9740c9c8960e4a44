use auto_deploy_trigger::config::DeployConfig;
use auto_deploy_trigger::git::GitCli;
use auto_deploy_trigger::logging::{FileLogger, setup_logging};
use auto_deploy_trigger::{AppState, api};
use std::sync::Arc;
use tracing::{self, error, info};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let config = match DeployConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let file_logger = config
        .log_dir
        .clone()
        .map(|dir| FileLogger::new(dir).with_max_files(config.log_max_files));
    let log_guard = match setup_logging(file_logger.as_ref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let bind_address = config.bind_address();
    info!("Working copy at {:?}", config.local_path);
    info!("Committing as {} <{}>", config.bot.name, config.bot.email);

    let state = Arc::new(AppState::new(config, Arc::new(GitCli::new())));
    let app = api::router(state);

    let listener = match tokio::net::TcpListener::bind(bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", bind_address, e);
            drop(log_guard);
            std::process::exit(1);
        }
    };
    info!("Listening on {} for push webhooks", bind_address);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        drop(log_guard);
        std::process::exit(1);
    }
}

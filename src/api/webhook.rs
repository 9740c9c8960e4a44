//! Webhook handler for push events

use axum::{
    body::Bytes,
    extract::State as AxumState,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::SharedState;
use crate::deploy_log::{DEPLOY_LOG_FILE, DeployLog, commit_message, local_timestamp};
use crate::error::{DeployError, Result};
use crate::git::{BRANCH, REMOTE};
use crate::webhook::PushNotification;

/// The two ways a delivery can succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Pushed by (or authored as) the bot; nothing was done.
    Ignored,
    /// Working copy synced, marker appended, commit pushed.
    Done,
}

impl DeliveryOutcome {
    pub fn body(self) -> &'static str {
        match self {
            DeliveryOutcome::Ignored => "Ignored bot commit",
            DeliveryOutcome::Done => "Auto commit done",
        }
    }
}

impl IntoResponse for DeliveryOutcome {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.body()).into_response()
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

/// Handles the push webhook POST request.
///
/// The delivery is processed on its own task: a client hanging up does not
/// cut a git sequence short, and a panic surfaces as a 500 instead of a
/// dropped connection.
pub async fn handle_webhook(
    AxumState(state): AxumState<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let delivery_id = Uuid::now_v7();
    let span = info_span!(
        "delivery",
        %delivery_id,
        github_delivery = header_str(&headers, "X-GitHub-Delivery"),
        github_event = header_str(&headers, "X-GitHub-Event"),
    );

    let notification = PushNotification::from_body(&body);
    let result = tokio::spawn(
        async move { process_push(&state, notification).await }.instrument(span.clone()),
    )
    .await
    .unwrap_or_else(|e| Err(DeployError::UnknownFailure(e.to_string())));

    span.in_scope(|| match result {
        Ok(outcome) => outcome.into_response(),
        Err(e @ DeployError::InvalidPayload(_)) => {
            warn!("Rejected webhook: {}", e);
            e.into_response()
        }
        Err(e) => {
            error!("Error in webhook handler: {}", e);
            e.into_response()
        }
    })
}

/// Run one push notification through validate, sync, log and publish.
pub async fn process_push(
    state: &SharedState,
    notification: PushNotification,
) -> Result<DeliveryOutcome> {
    let config = &state.config;
    info!(
        "Commit pushed by: {:?} Author: {:?}",
        notification.pusher_name, notification.commit_author_name
    );
    let actor = notification.actor().to_string();

    notification.validate()?;

    // Avoid infinite loops on our own commits
    if notification.is_from_bot(&config.bot.name) {
        info!("Ignored bot commit");
        return Ok(DeliveryOutcome::Ignored);
    }

    let working_copy = config.local_path.as_path();
    // Clone or pull, never both: a fresh clone is already at origin/main.
    let exists = tokio::fs::try_exists(working_copy).await.unwrap_or(false);
    if exists {
        state.git.pull_rebase(working_copy, REMOTE, BRANCH).await?;
    } else {
        info!("No working copy at {}, cloning", working_copy.display());
        state
            .git
            .clone_repo(&config.authenticated_remote_url(), working_copy)
            .await?;
    }
    debug!("Working copy synced");

    let timestamp = local_timestamp();
    DeployLog::in_working_copy(working_copy)
        .append(&timestamp, &actor)
        .await?;

    state.git.set_identity(working_copy, &config.bot).await?;
    state.git.add(working_copy, DEPLOY_LOG_FILE).await?;
    state
        .git
        .commit(working_copy, &commit_message(&timestamp))
        .await?;
    state.git.push(working_copy, REMOTE, BRANCH).await?;

    info!("Auto-commit pushed for {} at {}", actor, timestamp);
    Ok(DeliveryOutcome::Done)
}

//! Webhook related structures

use crate::error::{DeployError, Result};
use serde_json::Value;

/// Actor recorded when neither the commit author nor the pusher is known.
pub const UNKNOWN_ACTOR: &str = "unknown";

/// Fields of a push notification the deploy trigger cares about.
/// Anything else in the payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushNotification {
    pub pusher_name: Option<String>,
    pub commit_author_name: Option<String>,
}

impl PushNotification {
    /// Extract from a raw request body. Bodies that are not JSON objects
    /// yield an empty notification, which then fails validation.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice::<Value>(body)
            .map(|payload| Self::from_value(&payload))
            .unwrap_or_default()
    }

    pub fn from_value(payload: &Value) -> Self {
        let pusher_name = payload
            .get("pusher")
            .and_then(|p| p.get("name"))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(String::from);
        let commit_author_name = payload
            .get("head_commit")
            .and_then(|c| c.get("author"))
            .and_then(|a| a.get("name"))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(String::from);

        Self {
            pusher_name,
            commit_author_name,
        }
    }

    /// The pusher name, or `InvalidPayload` when there is none.
    pub fn validate(&self) -> Result<&str> {
        self.pusher_name
            .as_deref()
            .ok_or_else(|| DeployError::InvalidPayload("missing pusher.name".into()))
    }

    /// Who the deployment is attributed to: commit author first, then pusher.
    pub fn actor(&self) -> &str {
        self.commit_author_name
            .as_deref()
            .or(self.pusher_name.as_deref())
            .unwrap_or(UNKNOWN_ACTOR)
    }

    /// True when either the pusher or the commit author is the bot.
    /// Each name is checked on its own, so a human push whose head commit
    /// is authored as the bot is ignored too.
    pub fn is_from_bot(&self, bot_name: &str) -> bool {
        self.pusher_name.as_deref() == Some(bot_name)
            || self.commit_author_name.as_deref() == Some(bot_name)
    }
}

//! Push notifications and notification clicks.

use anime_core::{NotificationConfig, WorkerConfig};
use serde::Serialize;

/// Action id that opens the recommendations page.
pub const EXPLORE_ACTION: &str = "explore";
/// Action id that only dismisses the notification.
pub const CLOSE_ACTION: &str = "close";

/// A button on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// A notification shown in response to a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Build the notification for a push. Non-empty payload text replaces
    /// the configured body.
    pub fn from_push(config: &NotificationConfig, payload: Option<&str>) -> Self {
        let body = payload
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(config.body.as_str())
            .to_string();

        Self {
            title: config.title.clone(),
            body,
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            actions: vec![
                NotificationAction {
                    action: EXPLORE_ACTION.to_string(),
                    title: config.explore_title.clone(),
                },
                NotificationAction {
                    action: CLOSE_ACTION.to_string(),
                    title: config.close_title.clone(),
                },
            ],
        }
    }
}

/// What a click on a notification does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationClick {
    /// The `explore` action.
    Explore,
    /// The notification body.
    Body,
    /// `close` or an unknown action.
    Dismiss,
}

impl NotificationClick {
    /// Interpret the clicked action id. `None` or empty is a body click.
    pub fn from_action(action: Option<&str>) -> Self {
        match action {
            None | Some("") => Self::Body,
            Some(EXPLORE_ACTION) => Self::Explore,
            Some(_) => Self::Dismiss,
        }
    }

    /// Page to open, if any.
    pub fn target<'a>(&self, config: &'a WorkerConfig) -> Option<&'a str> {
        match self {
            Self::Explore | Self::Body => Some(config.recommendations_page.as_str()),
            Self::Dismiss => None,
        }
    }
}

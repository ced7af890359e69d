//! System notification options and the display primitive.
//!
//! Options use optional fields throughout so a caller's partial options can be
//! laid over defaults field by field.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Error;

/// A button shown on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl NotificationAction {
    pub fn new(action: impl Into<String>, title: impl Into<String>) -> Self {
        Self { action: action.into(), title: title.into(), icon: None }
    }
}

/// Data attached to a notification and handed back on click.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Display options for a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    /// Replacement key: a new notification with the same tag replaces the old one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_interaction: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibrate: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<NotificationAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<NotificationData>,
}

impl NotificationOptions {
    /// Fill every unset field from `defaults`.
    pub fn merged_over(self, defaults: &NotificationOptions) -> NotificationOptions {
        NotificationOptions {
            body: self.body.or_else(|| defaults.body.clone()),
            icon: self.icon.or_else(|| defaults.icon.clone()),
            badge: self.badge.or_else(|| defaults.badge.clone()),
            tag: self.tag.or_else(|| defaults.tag.clone()),
            require_interaction: self.require_interaction.or(defaults.require_interaction),
            silent: self.silent.or(defaults.silent),
            vibrate: self.vibrate.or_else(|| defaults.vibrate.clone()),
            actions: self.actions.or_else(|| defaults.actions.clone()),
            data: self.data.or_else(|| defaults.data.clone()),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.data = Some(NotificationData { url: Some(url.into()) });
        self
    }

    pub fn requiring_interaction(mut self) -> Self {
        self.require_interaction = Some(true);
        self
    }

    /// Target URL carried in the attached data, if any.
    pub fn url(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.url.as_deref())
    }
}

/// A notification currently displayed by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedNotification {
    pub title: String,
    pub options: NotificationOptions,
}

impl DisplayedNotification {
    pub fn tag(&self) -> Option<&str> {
        self.options.tag.as_deref()
    }
}

/// Platform display primitive for system notifications.
#[async_trait]
pub trait NotificationCenter: Send + Sync {
    /// Display a notification, replacing any shown one with the same tag.
    async fn show(&self, title: &str, options: NotificationOptions) -> Result<(), Error>;

    /// Close a displayed notification.
    async fn close(&self, notification: &DisplayedNotification) -> Result<(), Error>;

    /// Notifications currently on screen, oldest first.
    async fn displayed(&self) -> Result<Vec<DisplayedNotification>, Error>;
}

//! Push channel: turns push messages into system notifications and routes
//! notification clicks back to application windows.

use std::sync::Arc;

use cendres_core::{
    AppConfig, DisplayedNotification, Error, NotificationAction, NotificationCenter, NotificationData,
    NotificationOptions,
};
use serde::Deserialize;
use url::Url;

use crate::clients::Clients;
use crate::fetch::{canonicalize, resolve};

pub const DEFAULT_TAG: &str = "default";
pub const ACTION_OPEN: &str = "open";
pub const ACTION_CLOSE: &str = "close";

/// Optional fields a push message may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub require_interaction: Option<bool>,
    #[serde(default)]
    pub actions: Option<Vec<NotificationAction>>,
    #[serde(default)]
    pub data: Option<NotificationData>,
}

impl PushPayload {
    /// Parse push message text. Missing or malformed payloads yield the empty payload.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };
        match serde_json::from_str(raw) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "malformed push payload, using defaults");
                Self::default()
            }
        }
    }

    fn into_parts(self) -> (Option<String>, NotificationOptions) {
        let options = NotificationOptions {
            body: self.body,
            icon: self.icon,
            badge: self.badge,
            tag: self.tag,
            require_interaction: self.require_interaction,
            actions: self.actions,
            data: self.data,
            ..Default::default()
        };
        (self.title, options)
    }
}

/// Notification shown when a push carries no overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushDefaults {
    pub title: String,
    pub options: NotificationOptions,
}

impl PushDefaults {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            title: config.app_name.clone(),
            options: NotificationOptions {
                body: Some("New activity in the app".into()),
                icon: Some(config.icon.clone()),
                badge: Some(config.badge.clone()),
                tag: Some(DEFAULT_TAG.into()),
                require_interaction: Some(false),
                actions: Some(vec![
                    NotificationAction::new(ACTION_OPEN, "Open"),
                    NotificationAction::new(ACTION_CLOSE, "Close"),
                ]),
                data: Some(NotificationData { url: Some("/".into()) }),
                ..Default::default()
            },
        }
    }
}

/// What a notification click led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The close action; nothing beyond closing the notification.
    Dismissed,
    /// An existing window showing the target was focused.
    Focused(String),
    /// No window showed the target; a new one was opened.
    Opened(Url),
}

pub struct PushChannel {
    notifications: Arc<dyn NotificationCenter>,
    clients: Arc<dyn Clients>,
    defaults: PushDefaults,
    origin: Url,
}

impl PushChannel {
    pub fn new(
        notifications: Arc<dyn NotificationCenter>, clients: Arc<dyn Clients>, defaults: PushDefaults, origin: Url,
    ) -> Self {
        Self { notifications, clients, defaults, origin }
    }

    /// Show the notification for a push message.
    pub async fn on_push(&self, data: Option<&str>) -> Result<DisplayedNotification, Error> {
        let (title, options) = PushPayload::parse(data).into_parts();
        let title = title.unwrap_or_else(|| self.defaults.title.clone());
        let options = options.merged_over(&self.defaults.options);

        self.notifications.show(&title, options.clone()).await?;
        tracing::info!(tag = options.tag.as_deref().unwrap_or(""), title = %title, "push notification shown");

        Ok(DisplayedNotification { title, options })
    }

    /// Close the clicked notification and bring the user to its target.
    pub async fn on_notification_click(
        &self, notification: &DisplayedNotification, action: Option<&str>,
    ) -> Result<ClickOutcome, Error> {
        self.notifications.close(notification).await?;

        if action == Some(ACTION_CLOSE) {
            tracing::debug!(tag = notification.tag().unwrap_or(""), "notification dismissed");
            return Ok(ClickOutcome::Dismissed);
        }

        let target = resolve(&self.origin, notification.options.url().unwrap_or("/"))?;

        for client in self.clients.match_all(true).await? {
            let showing = canonicalize(client.url.as_str()).is_ok_and(|u| u == target);
            if showing {
                self.clients.focus(&client.id).await?;
                tracing::info!(client = %client.id, url = %target, "focused existing window");
                return Ok(ClickOutcome::Focused(client.id));
            }
        }

        self.clients.open_window(&target).await?;
        tracing::info!(url = %target, "opened window");
        Ok(ClickOutcome::Opened(target))
    }

    pub async fn on_notification_close(&self, notification: &DisplayedNotification) {
        tracing::debug!(tag = notification.tag().unwrap_or(""), "notification closed");
    }
}

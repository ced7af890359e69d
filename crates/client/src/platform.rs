//! Page-side platform ports: permission, push manager, notification display
//! and the page itself.

use std::sync::Arc;

use async_trait::async_trait;
use cendres_core::{Error, NotificationOptions, WorkerMessage};
use serde::{Deserialize, Serialize};

use crate::install::DisplayContext;
use crate::placement::PermissionState;

/// An opaque push endpoint handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
}

/// How a page-sent notification reaches the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayRoute {
    /// Through the service worker registration.
    ServiceWorker,
    /// Directly from the page.
    Direct,
}

#[async_trait]
pub trait NotificationPermission: Send + Sync {
    async fn permission(&self) -> PermissionState;

    /// Prompt the user. Resolves to the resulting permission; a dismissed
    /// prompt leaves it at `Default`.
    async fn request_permission(&self) -> Result<PermissionState, Error>;

    async fn show(&self, route: DisplayRoute, title: &str, options: NotificationOptions) -> Result<(), Error>;
}

/// Push manager of the current worker registration.
#[async_trait]
pub trait PushManager: Send + Sync {
    /// Wait until a push-capable worker is active.
    async fn ready(&self) -> Result<(), Error>;

    async fn subscribe(&self, application_server_key: &[u8]) -> Result<PushSubscription, Error>;

    async fn subscription(&self) -> Result<Option<PushSubscription>, Error>;

    /// Revoke a subscription. Returns false if it was already gone.
    async fn unsubscribe(&self, subscription: &PushSubscription) -> Result<bool, Error>;
}

/// The hosting page.
#[async_trait]
pub trait Page: Send + Sync {
    async fn display_context(&self) -> DisplayContext;

    /// Whether the browser currently reports network connectivity.
    async fn is_online(&self) -> bool;

    /// Post to the controlling worker. Returns false when no worker controls the page.
    async fn post_to_worker(&self, message: &WorkerMessage) -> Result<bool, Error>;

    async fn reload(&self) -> Result<(), Error>;
}

/// Platform collaborators the page talks to.
#[derive(Clone)]
pub struct ClientPlatform {
    pub permission: Arc<dyn NotificationPermission>,
    pub push: Arc<dyn PushManager>,
    pub page: Arc<dyn Page>,
}

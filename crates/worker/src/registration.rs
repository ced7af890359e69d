//! The service worker registration for one origin.
//!
//! Holds the active and waiting workers and drives every worker event
//! through [`Registration::handle`], which returns only once the event's
//! work has settled.

use std::sync::Arc;

use cendres_core::{
    AppConfig, ClientMessage, DisplayedNotification, Error, NotificationCenter, OriginDb, Request, WorkerMessage,
};
use url::Url;

use crate::cache_manager::{CacheManager, FetchOutcome};
use crate::clients::Clients;
use crate::fetch::Network;
use crate::lifecycle::{Worker, WorkerScript, WorkerState};
use crate::push::{ClickOutcome, PushChannel, PushDefaults};

/// Platform collaborators the worker talks to.
#[derive(Clone)]
pub struct WorkerPlatform {
    pub network: Arc<dyn Network>,
    pub clients: Arc<dyn Clients>,
    pub notifications: Arc<dyn NotificationCenter>,
}

/// Inbound worker events.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// A new script was fetched; install it.
    Update(WorkerScript),
    /// Raw message text posted by a page.
    Message(String),
    Fetch(Request),
    /// Push message text, if the push carried data.
    Push(Option<String>),
    NotificationClick { notification: DisplayedNotification, action: Option<String> },
    NotificationClose(DisplayedNotification),
}

/// Result of handling a worker event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// State of the worker the event acted on.
    Lifecycle(WorkerState),
    Fetch(FetchOutcome),
    Shown(DisplayedNotification),
    Click(ClickOutcome),
    Ignored,
}

pub struct Registration {
    db: Arc<OriginDb>,
    platform: WorkerPlatform,
    push: PushChannel,
    origin: Url,
    auto_skip_waiting: bool,
    active: Option<Worker>,
    waiting: Option<Worker>,
}

impl Registration {
    pub fn new(config: &AppConfig, db: OriginDb, platform: WorkerPlatform) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let push = PushChannel::new(
            platform.notifications.clone(),
            platform.clients.clone(),
            PushDefaults::from_config(config),
            origin.clone(),
        );
        Ok(Self {
            db: Arc::new(db),
            platform,
            push,
            origin,
            auto_skip_waiting: config.auto_skip_waiting,
            active: None,
            waiting: None,
        })
    }

    pub fn active(&self) -> Option<&Worker> {
        self.active.as_ref()
    }

    pub fn waiting(&self) -> Option<&Worker> {
        self.waiting.as_ref()
    }

    pub fn db(&self) -> &OriginDb {
        &self.db
    }

    /// Handle one event to completion.
    pub async fn handle(&mut self, event: WorkerEvent) -> Result<WorkerOutcome, Error> {
        match event {
            WorkerEvent::Update(script) => self.update(script).await.map(WorkerOutcome::Lifecycle),
            WorkerEvent::Message(raw) => match WorkerMessage::parse(&raw) {
                Some(WorkerMessage::SkipWaiting) => Ok(match self.activate_waiting().await? {
                    Some(state) => WorkerOutcome::Lifecycle(state),
                    None => WorkerOutcome::Ignored,
                }),
                None => Ok(WorkerOutcome::Ignored),
            },
            WorkerEvent::Fetch(request) => match &self.active {
                Some(worker) => worker.cache().handle_fetch(&request).await.map(WorkerOutcome::Fetch),
                None => Ok(WorkerOutcome::Fetch(FetchOutcome::Passthrough)),
            },
            WorkerEvent::Push(data) => self.push.on_push(data.as_deref()).await.map(WorkerOutcome::Shown),
            WorkerEvent::NotificationClick { notification, action } => self
                .push
                .on_notification_click(&notification, action.as_deref())
                .await
                .map(WorkerOutcome::Click),
            WorkerEvent::NotificationClose(notification) => {
                self.push.on_notification_close(&notification).await;
                Ok(WorkerOutcome::Ignored)
            }
        }
    }

    /// Install a new worker version.
    ///
    /// A failed install leaves the active worker in control. A successful one
    /// activates immediately when nothing is active yet or when
    /// `auto_skip_waiting` is set; otherwise it waits and pages are told an
    /// update is available.
    pub async fn update(&mut self, script: WorkerScript) -> Result<WorkerState, Error> {
        if let Some(active) = &self.active
            && active.version() == script.version
        {
            tracing::debug!(version = %script.version, "script unchanged");
            return Ok(active.state());
        }

        let cache = CacheManager::new(
            self.db.clone(),
            self.platform.network.clone(),
            script.version,
            script.manifest,
            self.origin.clone(),
        );
        let mut worker = Worker::new(cache);
        worker.transition(WorkerState::Installing);

        if let Err(e) = worker.cache().install().await {
            worker.transition(WorkerState::Redundant);
            tracing::error!(version = %worker.version(), error = %e, "install failed");
            return Err(e);
        }
        worker.transition(WorkerState::Installed);
        tracing::info!(version = %worker.version(), "installed");

        if let Some(mut previous) = self.waiting.replace(worker) {
            previous.transition(WorkerState::Redundant);
        }

        if self.active.is_none() || self.auto_skip_waiting {
            return Ok(self.activate_waiting().await?.unwrap_or(WorkerState::Redundant));
        }

        let version = self.waiting.as_ref().map(|w| w.version().to_string()).unwrap_or_default();
        if let Err(e) = self.platform.clients.post_message(&ClientMessage::UpdateAvailable { version }).await {
            tracing::warn!(error = %e, "failed to announce update");
        }
        Ok(WorkerState::Installed)
    }

    /// Promote the waiting worker, evict stale caches and claim open windows.
    ///
    /// Returns None when nothing was waiting.
    pub async fn activate_waiting(&mut self) -> Result<Option<WorkerState>, Error> {
        let Some(mut worker) = self.waiting.take() else {
            tracing::debug!("skip waiting with no waiting worker");
            return Ok(None);
        };

        worker.transition(WorkerState::Activating);
        if let Some(mut previous) = self.active.take() {
            previous.transition(WorkerState::Redundant);
        }

        if let Err(e) = worker.cache().activate().await {
            tracing::warn!(version = %worker.version(), error = %e, "stale cache cleanup failed");
        }

        match self.platform.clients.claim().await {
            Ok(claimed) => tracing::info!(version = %worker.version(), claimed, "activated"),
            Err(e) => tracing::warn!(version = %worker.version(), error = %e, "failed to claim clients"),
        }
        worker.transition(WorkerState::Activated);

        let message = ClientMessage::Activated { version: worker.version().to_string() };
        if let Err(e) = self.platform.clients.post_message(&message).await {
            tracing::warn!(error = %e, "failed to announce activation");
        }

        let state = worker.state();
        self.active = Some(worker);
        Ok(Some(state))
    }
}

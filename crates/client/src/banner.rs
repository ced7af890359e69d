//! "New version available" banner.

use std::sync::Arc;
use std::time::Duration;

use cendres_core::{AppConfig, ClientMessage, NotificationOptions, WorkerMessage};
use tokio::sync::Mutex;

use crate::controller::{NotificationKind, Priority, SendOptions, SubscriptionController};
use crate::platform::Page;
use crate::render::{BannerView, Renderer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BannerEvent {
    /// A message arrived from the worker.
    Worker(ClientMessage),
    Reload,
    Later,
}

pub struct UpdateBanner {
    controller: Arc<Mutex<SubscriptionController>>,
    page: Arc<dyn Page>,
    renderer: Arc<dyn Renderer>,
    reload_delay: Duration,
    visible: Option<BannerView>,
}

impl UpdateBanner {
    pub fn new(
        config: &AppConfig, controller: Arc<Mutex<SubscriptionController>>, page: Arc<dyn Page>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self { controller, page, renderer, reload_delay: config.reload_delay(), visible: None }
    }

    pub fn visible(&self) -> Option<&BannerView> {
        self.visible.as_ref()
    }

    pub async fn handle(&mut self, event: BannerEvent) {
        match event {
            BannerEvent::Worker(ClientMessage::UpdateAvailable { version }) => self.show(version).await,
            BannerEvent::Worker(ClientMessage::Activated { version }) => {
                tracing::debug!(%version, "worker activated");
            }
            BannerEvent::Reload => self.reload().await,
            BannerEvent::Later => self.hide(),
        }
    }

    async fn show(&mut self, version: String) {
        {
            let controller = self.controller.lock().await;
            if controller.preferences().enabled {
                let send = SendOptions::new(
                    NotificationOptions::default()
                        .with_body("A new version of the app is available!")
                        .requiring_interaction(),
                )
                .kind(NotificationKind::Update)
                .priority(Priority::High);
                let shown = controller.send_notification("Update available", send).await;
                tracing::debug!(shown, "update notification");
            }
        }

        tracing::info!(%version, "update available");
        let view = BannerView { version };
        self.renderer.update_banner(Some(&view));
        self.visible = Some(view);
    }

    /// Ask the waiting worker to take over, then reload regardless.
    ///
    /// Posting only queues the message, so a delivered request is followed by
    /// `reload_delay` before reloading.
    async fn reload(&mut self) {
        match self.page.post_to_worker(&WorkerMessage::SkipWaiting).await {
            Ok(true) => {
                tracing::info!("skip waiting requested");
                tokio::time::sleep(self.reload_delay).await;
            }
            Ok(false) => tracing::debug!("no controlling worker"),
            Err(e) => tracing::warn!(error = %e, "failed to post skip waiting"),
        }
        if let Err(e) = self.page.reload().await {
            tracing::error!(error = %e, "reload failed");
        }
    }

    fn hide(&mut self) {
        self.visible = None;
        self.renderer.update_banner(None);
    }
}

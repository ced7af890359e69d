//! Subscription controller: permission, push subscription and preferences.
//!
//! ### State
//! `Unsupported`, `Unasked`, `Denied`, `GrantedUnsubscribed` and
//! `GrantedSubscribed`, derived from the capability descriptor, the last
//! observed permission and the held subscription handle.
//!
//! ### Failure handling
//! Nothing here returns an error to the caller. Platform failures are logged
//! and surfaced as toasts; stored preferences change only after the platform
//! step they describe has succeeded.

use std::sync::Arc;
use std::time::Duration;

use cendres_core::keys::decode_application_server_key;
use cendres_core::{AppConfig, Error, Frequency, KeyValueStore, NotificationOptions, PreferenceStore, Preferences};
use tokio::task::JoinHandle;

use crate::capabilities::Capabilities;
use crate::placement::{Affordance, HeaderButton, HeaderLabel, Layout, PermissionState, place};
use crate::platform::{ClientPlatform, DisplayRoute, PushSubscription};
use crate::render::{ConnectionStatus, Renderer, Toast, ToastLevel};

pub const WELCOME_TAG: &str = "welcome";
pub const TEST_TAG: &str = "test";

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Unsupported,
    Unasked,
    Denied,
    GrantedUnsubscribed,
    GrantedSubscribed,
}

/// Notification category, filtered by the matching preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Update,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    Normal,
    High,
}

/// Options for [`SubscriptionController::send_notification`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub kind: Option<NotificationKind>,
    pub priority: Option<Priority>,
    pub options: NotificationOptions,
}

impl SendOptions {
    pub fn new(options: NotificationOptions) -> Self {
        Self { options, ..Default::default() }
    }

    pub fn kind(mut self, kind: NotificationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Inbound page events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Start,
    HeaderButtonClicked,
    RequestPermission,
    OpenSettings,
    CloseSettings,
    SaveSettings { updates: bool, events: bool, frequency: Frequency },
    SendTestNotification,
    Unsubscribe,
    /// The display mode changed; install status is re-read.
    DisplayModeChanged,
    /// Permission may have changed outside the app.
    PermissionChanged,
    /// The browser went online or offline.
    ConnectivityChanged { online: bool },
}

/// Fixed inputs taken from configuration.
#[derive(Debug, Clone)]
struct ControllerSettings {
    app_name: String,
    icon: String,
    badge: String,
    vibrate: Vec<u32>,
    welcome_delay: Duration,
    connection_status: Duration,
    application_server_key: Vec<u8>,
}

pub struct SubscriptionController {
    caps: Capabilities,
    settings: ControllerSettings,
    store: PreferenceStore,
    prefs: Preferences,
    permission: PermissionState,
    subscription: Option<PushSubscription>,
    installed: bool,
    settings_open: bool,
    platform: ClientPlatform,
    renderer: Arc<dyn Renderer>,
    welcome: Option<JoinHandle<()>>,
    connection_hide: Option<JoinHandle<()>>,
}

impl SubscriptionController {
    /// Build a controller. Fails only on an undecodable application-server key.
    pub fn new(
        config: &AppConfig, caps: Capabilities, store: Arc<dyn KeyValueStore>, platform: ClientPlatform,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Self, Error> {
        let application_server_key = decode_application_server_key(&config.application_server_key)?;
        let permission = if caps.is_supported() { PermissionState::Default } else { PermissionState::Denied };
        Ok(Self {
            caps,
            settings: ControllerSettings {
                app_name: config.app_name.clone(),
                icon: config.icon.clone(),
                badge: config.badge.clone(),
                vibrate: config.vibrate.clone(),
                welcome_delay: config.welcome_delay(),
                connection_status: config.connection_status_duration(),
                application_server_key,
            },
            store: PreferenceStore::new(store),
            prefs: Preferences::default(),
            permission,
            subscription: None,
            installed: false,
            settings_open: false,
            platform,
            renderer,
            welcome: None,
            connection_hide: None,
        })
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub fn subscription(&self) -> Option<&PushSubscription> {
        self.subscription.as_ref()
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn settings_open(&self) -> bool {
        self.settings_open
    }

    pub fn state(&self) -> ControllerState {
        if !self.caps.is_supported() {
            return ControllerState::Unsupported;
        }
        match self.permission {
            PermissionState::Denied => ControllerState::Denied,
            PermissionState::Default => ControllerState::Unasked,
            PermissionState::Granted if self.subscription.is_some() => ControllerState::GrantedSubscribed,
            PermissionState::Granted => ControllerState::GrantedUnsubscribed,
        }
    }

    /// Pending welcome notification, if one was scheduled.
    pub fn take_welcome(&mut self) -> Option<JoinHandle<()>> {
        self.welcome.take()
    }

    /// Pending removal of the "back online" indicator, if one was scheduled.
    pub fn take_connection_hide(&mut self) -> Option<JoinHandle<()>> {
        self.connection_hide.take()
    }

    /// Handle one page event to completion.
    pub async fn handle(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::Start => self.start().await,
            ClientEvent::HeaderButtonClicked => self.toggle().await,
            ClientEvent::RequestPermission => self.request_permission_and_subscribe().await,
            ClientEvent::OpenSettings => self.open_settings(),
            ClientEvent::CloseSettings => self.close_settings(),
            ClientEvent::SaveSettings { updates, events, frequency } => {
                self.save_settings(updates, events, frequency).await
            }
            ClientEvent::SendTestNotification => self.send_test_notification().await,
            ClientEvent::Unsubscribe => self.unsubscribe().await,
            ClientEvent::DisplayModeChanged => {
                self.installed = self.platform.page.display_context().await.is_installed();
                tracing::debug!(installed = self.installed, "display mode changed");
                self.relayout();
            }
            ClientEvent::PermissionChanged => {
                if self.caps.is_supported() {
                    self.permission = self.platform.permission.permission().await;
                }
                self.relayout();
            }
            ClientEvent::ConnectivityChanged { online } => self.connectivity_changed(online),
        }
    }

    /// Load preferences, read platform state, render and reconcile any
    /// existing subscription.
    pub async fn start(&mut self) {
        if !self.platform.page.is_online().await {
            self.connectivity_changed(false);
        }

        if !self.caps.is_supported() {
            tracing::warn!("notifications are not supported on this platform");
            self.renderer.render(&Layout::empty());
            return;
        }

        self.prefs = match self.store.load().await {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load preferences, using defaults");
                Preferences::default()
            }
        };
        self.permission = self.platform.permission.permission().await;
        self.installed = self.platform.page.display_context().await.is_installed();
        tracing::info!(installed = self.installed, permission = ?self.permission, "notification controller started");

        self.relayout();
        self.check_existing_subscription().await;
    }

    /// Adopt a subscription that survived a reload.
    pub async fn check_existing_subscription(&mut self) {
        if !self.caps.is_supported() || !self.caps.push {
            return;
        }
        let found = async {
            self.platform.push.ready().await?;
            self.platform.push.subscription().await
        }
        .await;

        match found {
            Ok(Some(subscription)) => {
                self.subscription = Some(subscription);
                if self.prefs.enabled {
                    tracing::info!("existing subscription found");
                    self.relayout();
                }
            }
            Ok(None) => tracing::debug!("no existing subscription"),
            Err(e) => tracing::warn!(error = %e, "failed to check existing subscription"),
        }
    }

    /// Header button: explain a block, open settings, or start subscribing.
    pub async fn toggle(&mut self) {
        if self.permission == PermissionState::Denied {
            self.toast(ToastLevel::Error, "Notifications are blocked. Allow them in your browser settings.");
            return;
        }
        if self.prefs.enabled {
            self.open_settings();
        } else {
            self.request_permission_and_subscribe().await;
        }
    }

    pub async fn request_permission_and_subscribe(&mut self) {
        if !self.caps.is_supported() {
            self.toast(ToastLevel::Error, "Notifications are not supported on this device");
            return;
        }

        match self.try_subscribe().await {
            Ok(PermissionState::Granted) => {
                tracing::info!(endpoint = ?self.subscription.as_ref().map(|s| &s.endpoint), "subscribed");
                self.toast(ToastLevel::Success, "Notifications enabled!");
                self.schedule_welcome();
            }
            Ok(permission) => {
                tracing::info!(?permission, "notification permission not granted");
                self.toast(ToastLevel::Warning, "Notification permission was not granted");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to enable notifications");
                self.toast(ToastLevel::Error, "Could not enable notifications");
            }
        }
        self.relayout();
    }

    async fn try_subscribe(&mut self) -> Result<PermissionState, Error> {
        if self.caps.needs_worker_ready {
            self.platform.push.ready().await?;
        }

        self.permission = self.platform.permission.request_permission().await?;
        if self.permission != PermissionState::Granted {
            return Ok(self.permission);
        }
        if !self.caps.push {
            return Err(Error::PlatformUnsupported("push subscriptions are unavailable".into()));
        }

        let subscription = self
            .platform
            .push
            .subscribe(&self.settings.application_server_key)
            .await
            .map_err(|e| match e {
                Error::SubscriptionFailed(_) => e,
                other => Error::SubscriptionFailed(other.to_string()),
            })?;
        self.subscription = Some(subscription);

        let updated = Preferences { enabled: true, ever_activated: true, ..self.prefs };
        self.store.save(&updated).await?;
        self.prefs = updated;
        Ok(PermissionState::Granted)
    }

    /// Revoke the subscription and turn notifications off.
    pub async fn unsubscribe(&mut self) {
        match self.try_unsubscribe().await {
            Ok(()) => {
                tracing::info!("unsubscribed");
                self.toast(ToastLevel::Info, "You are unsubscribed from notifications");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to unsubscribe");
                self.toast(ToastLevel::Error, "Could not unsubscribe");
            }
        }
        self.relayout();
    }

    async fn try_unsubscribe(&mut self) -> Result<(), Error> {
        if let Some(welcome) = self.welcome.take() {
            welcome.abort();
        }
        if let Some(subscription) = &self.subscription {
            self.platform.push.unsubscribe(subscription).await?;
        }
        self.subscription = None;

        let updated = Preferences { enabled: false, ..self.prefs };
        self.store.save(&updated).await?;
        self.prefs = updated;
        self.close_settings();
        Ok(())
    }

    pub async fn save_settings(&mut self, updates: bool, events: bool, frequency: Frequency) {
        let updated = Preferences { updates, events, frequency, ..self.prefs };
        match self.store.save(&updated).await {
            Ok(()) => {
                self.prefs = updated;
                if self.settings_open {
                    self.renderer.settings(Some(&self.prefs));
                }
                self.toast(ToastLevel::Success, "Settings saved!");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to save preferences");
                self.toast(ToastLevel::Error, "Could not save settings");
            }
        }
    }

    /// Show a notification if the user's preferences allow it.
    ///
    /// Returns whether it was actually shown.
    pub async fn send_notification(&self, title: &str, send: SendOptions) -> bool {
        if !self.prefs.enabled || self.permission != PermissionState::Granted {
            tracing::debug!(title, "notification dropped: not enabled");
            return false;
        }
        match send.kind {
            Some(NotificationKind::Update) if !self.prefs.updates => return false,
            Some(NotificationKind::Event) if !self.prefs.events => return false,
            _ => {}
        }
        if self.prefs.frequency == Frequency::Minimal && send.priority != Some(Priority::High) {
            tracing::debug!(title, "notification dropped: minimal frequency");
            return false;
        }

        let options = send.options.merged_over(&self.default_options());
        match self.platform.permission.show(self.route(), title, options).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(title, error = %e, "failed to show notification");
                false
            }
        }
    }

    /// Show a test notification, bypassing category and frequency filters.
    pub async fn send_test_notification(&mut self) {
        if self.permission != PermissionState::Granted {
            self.toast(ToastLevel::Warning, "Notifications are not allowed");
            return;
        }
        let options = NotificationOptions::default()
            .with_body("This is a test. Your notifications work.")
            .with_tag(TEST_TAG)
            .merged_over(&self.default_options());
        if let Err(e) = self.platform.permission.show(self.route(), "Test notification", options).await {
            tracing::warn!(error = %e, "failed to show test notification");
        }
    }

    /// Offline stays on screen until connectivity returns; "back online"
    /// hides itself after a short while.
    pub fn connectivity_changed(&mut self, online: bool) {
        if let Some(previous) = self.connection_hide.take() {
            previous.abort();
        }

        if !online {
            tracing::info!("connection lost, running from cache");
            self.renderer.connection_status(Some(ConnectionStatus::Offline));
            return;
        }

        tracing::info!("connection restored");
        self.renderer.connection_status(Some(ConnectionStatus::Online));
        let renderer = self.renderer.clone();
        let delay = self.settings.connection_status;
        self.connection_hide = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            renderer.connection_status(None);
        }));
    }

    pub fn open_settings(&mut self) {
        if !self.caps.is_supported() || self.permission == PermissionState::Denied {
            return;
        }
        self.settings_open = true;
        self.renderer.settings(Some(&self.prefs));
    }

    pub fn close_settings(&mut self) {
        self.settings_open = false;
        self.renderer.settings(None);
    }

    /// Current placement and header state.
    pub fn layout(&self) -> Layout {
        if !self.caps.is_supported() {
            return Layout::empty();
        }
        let affordance = place(self.installed, self.permission, self.prefs.ever_activated);
        let header = (affordance == Affordance::HeaderButton).then(|| HeaderButton {
            label: HeaderLabel::for_state(self.permission, self.prefs.enabled, self.subscription.is_some()),
            disabled: self.permission == PermissionState::Denied,
        });
        Layout { affordance, header, settings_available: self.permission != PermissionState::Denied }
    }

    fn relayout(&self) {
        self.renderer.render(&self.layout());
    }

    fn toast(&self, level: ToastLevel, message: &str) {
        self.renderer.toast(&Toast::new(level, message));
    }

    fn route(&self) -> DisplayRoute {
        if self.caps.worker_display { DisplayRoute::ServiceWorker } else { DisplayRoute::Direct }
    }

    fn default_options(&self) -> NotificationOptions {
        NotificationOptions {
            icon: Some(self.settings.icon.clone()),
            badge: Some(self.settings.badge.clone()),
            vibrate: Some(self.settings.vibrate.clone()),
            require_interaction: Some(false),
            silent: Some(false),
            ..Default::default()
        }
    }

    fn schedule_welcome(&mut self) {
        let permission = self.platform.permission.clone();
        let route = self.route();
        let delay = self.settings.welcome_delay;
        let title = self.settings.app_name.clone();
        let options = NotificationOptions::default()
            .with_body("Notifications enabled! You will receive important updates.")
            .with_tag(WELCOME_TAG)
            .merged_over(&self.default_options());

        if let Some(previous) = self.welcome.take() {
            previous.abort();
        }
        self.welcome = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if permission.permission().await != PermissionState::Granted {
                tracing::debug!("permission withdrawn before welcome notification");
                return;
            }
            if let Err(e) = permission.show(route, &title, options).await {
                tracing::warn!(error = %e, "failed to show welcome notification");
            }
        }));
    }
}

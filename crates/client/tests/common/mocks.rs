use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use cendres_client::{
    BannerView, ConnectionStatus, DisplayContext, DisplayRoute, Layout, NotificationPermission, Page,
    PermissionState, PushManager, PushSubscription, Renderer, Toast,
};
use cendres_core::{Error, NotificationOptions, Preferences, WorkerMessage};

/// A shown notification: route, title and options.
pub type Shown = (DisplayRoute, String, NotificationOptions);

/// Scriptable page platform: permission prompt, push manager and page.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakePlatform {
    pub permission: Mutex<PermissionState>,
    /// What the prompt resolves to.
    pub prompt_answer: Mutex<PermissionState>,
    pub prompts: AtomicUsize,
    pub shown: Mutex<Vec<Shown>>,
    pub subscription: Mutex<Option<PushSubscription>>,
    pub subscribe_fails: AtomicBool,
    pub subscribe_keys: Mutex<Vec<Vec<u8>>>,
    pub ready_calls: AtomicUsize,
    pub unsubscribes: AtomicUsize,
    pub display: Mutex<DisplayContext>,
    pub controlled: AtomicBool,
    pub post_fails: AtomicBool,
    pub posted: Mutex<Vec<WorkerMessage>>,
    pub posted_at: Mutex<Option<Instant>>,
    pub reloads: AtomicUsize,
    pub reloaded_at: Mutex<Option<Instant>>,
    pub offline: AtomicBool,
}

#[allow(dead_code)]
impl FakePlatform {
    /// Installed app, permission never asked, prompt will be granted.
    pub fn installed() -> Self {
        let platform = Self::default();
        *platform.display.lock().unwrap() = DisplayContext::standalone();
        *platform.prompt_answer.lock().unwrap() = PermissionState::Granted;
        platform
    }

    pub fn in_browser() -> Self {
        Self::default()
    }

    pub fn with_permission(self, permission: PermissionState) -> Self {
        *self.permission.lock().unwrap() = permission;
        self
    }

    pub fn answering(self, answer: PermissionState) -> Self {
        *self.prompt_answer.lock().unwrap() = answer;
        self
    }

    pub fn with_subscription(self, endpoint: &str) -> Self {
        *self.subscription.lock().unwrap() = Some(PushSubscription { endpoint: endpoint.into() });
        self
    }

    pub fn offline(self) -> Self {
        self.offline.store(true, Ordering::SeqCst);
        self
    }

    pub fn controlled(self) -> Self {
        self.controlled.store(true, Ordering::SeqCst);
        self
    }

    pub fn shown(&self) -> Vec<Shown> {
        self.shown.lock().unwrap().clone()
    }

    pub fn shown_tags(&self) -> Vec<Option<String>> {
        self.shown().into_iter().map(|(_, _, o)| o.tag).collect()
    }

    pub fn posted(&self) -> Vec<WorkerMessage> {
        self.posted.lock().unwrap().clone()
    }

    pub fn has_subscription(&self) -> bool {
        self.subscription.lock().unwrap().is_some()
    }
}

#[async_trait]
impl NotificationPermission for FakePlatform {
    async fn permission(&self) -> PermissionState {
        *self.permission.lock().unwrap()
    }

    async fn request_permission(&self) -> Result<PermissionState, Error> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        let answer = *self.prompt_answer.lock().unwrap();
        *self.permission.lock().unwrap() = answer;
        Ok(answer)
    }

    async fn show(&self, route: DisplayRoute, title: &str, options: NotificationOptions) -> Result<(), Error> {
        self.shown.lock().unwrap().push((route, title.to_string(), options));
        Ok(())
    }
}

#[async_trait]
impl PushManager for FakePlatform {
    async fn ready(&self) -> Result<(), Error> {
        self.ready_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn subscribe(&self, application_server_key: &[u8]) -> Result<PushSubscription, Error> {
        self.subscribe_keys.lock().unwrap().push(application_server_key.to_vec());
        if self.subscribe_fails.load(Ordering::SeqCst) {
            return Err(Error::SubscriptionFailed("push service rejected the key".into()));
        }
        let subscription = PushSubscription { endpoint: "https://push.example/sub/1".into() };
        *self.subscription.lock().unwrap() = Some(subscription.clone());
        Ok(subscription)
    }

    async fn subscription(&self) -> Result<Option<PushSubscription>, Error> {
        Ok(self.subscription.lock().unwrap().clone())
    }

    async fn unsubscribe(&self, _subscription: &PushSubscription) -> Result<bool, Error> {
        self.unsubscribes.fetch_add(1, Ordering::SeqCst);
        Ok(self.subscription.lock().unwrap().take().is_some())
    }
}

#[async_trait]
impl Page for FakePlatform {
    async fn display_context(&self) -> DisplayContext {
        self.display.lock().unwrap().clone()
    }

    async fn is_online(&self) -> bool {
        !self.offline.load(Ordering::SeqCst)
    }

    async fn post_to_worker(&self, message: &WorkerMessage) -> Result<bool, Error> {
        if self.post_fails.load(Ordering::SeqCst) {
            return Err(Error::Storage("message channel closed".into()));
        }
        if !self.controlled.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.posted.lock().unwrap().push(message.clone());
        *self.posted_at.lock().unwrap() = Some(Instant::now());
        Ok(true)
    }

    async fn reload(&self) -> Result<(), Error> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        *self.reloaded_at.lock().unwrap() = Some(Instant::now());
        Ok(())
    }
}

/// Renderer that records every call.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingRenderer {
    layouts: Mutex<Vec<Layout>>,
    toasts: Mutex<Vec<Toast>>,
    settings: Mutex<Option<Preferences>>,
    banner: Mutex<Option<BannerView>>,
    connection: Mutex<Vec<Option<ConnectionStatus>>>,
}

#[allow(dead_code)]
impl RecordingRenderer {
    pub fn last_layout(&self) -> Option<Layout> {
        self.layouts.lock().unwrap().last().copied()
    }

    pub fn layouts(&self) -> Vec<Layout> {
        self.layouts.lock().unwrap().clone()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }

    pub fn last_toast(&self) -> Option<Toast> {
        self.toasts.lock().unwrap().last().cloned()
    }

    /// Preferences shown in the open settings panel, if it is open.
    pub fn open_settings(&self) -> Option<Preferences> {
        *self.settings.lock().unwrap()
    }

    pub fn banner(&self) -> Option<BannerView> {
        self.banner.lock().unwrap().clone()
    }

    /// Connectivity indicator as currently shown.
    pub fn connection(&self) -> Option<ConnectionStatus> {
        self.connection.lock().unwrap().last().copied().flatten()
    }

    pub fn connection_history(&self) -> Vec<Option<ConnectionStatus>> {
        self.connection.lock().unwrap().clone()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, layout: &Layout) {
        self.layouts.lock().unwrap().push(*layout);
    }

    fn toast(&self, toast: &Toast) {
        self.toasts.lock().unwrap().push(toast.clone());
    }

    fn settings(&self, prefs: Option<&Preferences>) {
        *self.settings.lock().unwrap() = prefs.copied();
    }

    fn update_banner(&self, banner: Option<&BannerView>) {
        *self.banner.lock().unwrap() = banner.cloned();
    }

    fn connection_status(&self, status: Option<ConnectionStatus>) {
        self.connection.lock().unwrap().push(status);
    }
}

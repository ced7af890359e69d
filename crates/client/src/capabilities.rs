//! What the page's platform can do, computed once at startup.

/// Platform capability descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// System notifications are available.
    pub notifications: bool,
    /// A service worker can be registered.
    pub service_worker: bool,
    /// Push subscriptions are available.
    pub push: bool,
    /// The worker registration can display notifications for the page.
    pub worker_display: bool,
    /// The push manager is only usable once the worker is ready.
    pub needs_worker_ready: bool,
}

impl Capabilities {
    /// Everything available.
    pub const fn full() -> Self {
        Self { notifications: true, service_worker: true, push: true, worker_display: true, needs_worker_ready: true }
    }

    /// Nothing available.
    pub const fn none() -> Self {
        Self {
            notifications: false,
            service_worker: false,
            push: false,
            worker_display: false,
            needs_worker_ready: false,
        }
    }

    /// Whether the notification subsystem can run at all.
    pub fn is_supported(&self) -> bool {
        self.notifications && self.service_worker
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::full()
    }
}

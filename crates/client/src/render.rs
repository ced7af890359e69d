//! Rendering surface port.
//!
//! The controller describes what should be on screen; a renderer applies it.

use cendres_core::Preferences;

use crate::placement::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn new(level: ToastLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into() }
    }
}

/// The update banner as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerView {
    pub version: String,
}

/// Network connectivity indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Online,
    Offline,
}

impl ConnectionStatus {
    pub fn text(self) -> &'static str {
        match self {
            ConnectionStatus::Online => "Back online",
            ConnectionStatus::Offline => "Offline mode",
        }
    }
}

pub trait Renderer: Send + Sync {
    /// Replace the notification affordance with `layout`.
    fn render(&self, layout: &Layout);

    fn toast(&self, toast: &Toast);

    /// Show the settings panel filled from `prefs`, or hide it with `None`.
    fn settings(&self, prefs: Option<&Preferences>);

    /// Show or hide the update banner.
    fn update_banner(&self, banner: Option<&BannerView>);

    /// Show the connectivity indicator, or hide it with `None`.
    fn connection_status(&self, status: Option<ConnectionStatus>);
}

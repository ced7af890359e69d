//! Where the notification affordance goes.
//!
//! Placement is a pure function of install status, permission and activation
//! history. It is recomputed on every display-mode change and after every
//! permission or subscription change.

use serde::Serialize;

/// Notification permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
    /// Never asked, or the prompt was dismissed.
    #[default]
    Default,
}

/// Content of the footer surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FooterContent {
    /// How to re-enable blocked notifications.
    Blocked,
    /// Notifications were activated before; links to settings.
    Settings,
}

/// Which affordance is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "content")]
pub enum Affordance {
    None,
    HeaderButton,
    Footer(FooterContent),
}

/// Placement decision.
pub fn place(installed: bool, permission: PermissionState, ever_activated: bool) -> Affordance {
    if !installed {
        return Affordance::None;
    }
    match (permission, ever_activated) {
        (PermissionState::Denied, _) => Affordance::Footer(FooterContent::Blocked),
        (_, true) => Affordance::Footer(FooterContent::Settings),
        (_, false) => Affordance::HeaderButton,
    }
}

/// Header button text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderLabel {
    Blocked,
    Active,
    Activate,
}

impl HeaderLabel {
    pub fn for_state(permission: PermissionState, enabled: bool, subscribed: bool) -> Self {
        if permission == PermissionState::Denied {
            HeaderLabel::Blocked
        } else if enabled && subscribed {
            HeaderLabel::Active
        } else {
            HeaderLabel::Activate
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            HeaderLabel::Blocked => "Notifications blocked",
            HeaderLabel::Active => "Notifications on",
            HeaderLabel::Activate => "Turn on notifications",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderButton {
    pub label: HeaderLabel,
    pub disabled: bool,
}

/// Everything the renderer needs to draw the notification UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub affordance: Affordance,
    /// Present when the affordance is the header button.
    pub header: Option<HeaderButton>,
    /// The settings panel exists (it may still be closed).
    pub settings_available: bool,
}

impl Layout {
    /// Nothing rendered, for unsupported platforms.
    pub fn empty() -> Self {
        Self { affordance: Affordance::None, header: None, settings_available: false }
    }
}

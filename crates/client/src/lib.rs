//! Page-side notification UI for the Cendres offline shell.
//!
//! This crate provides the capability descriptor, install detection, the
//! affordance placement policy, the render and platform ports, the
//! subscription controller and the update banner.

pub mod banner;
pub mod capabilities;
pub mod controller;
pub mod install;
pub mod placement;
pub mod platform;
pub mod render;

pub use banner::{BannerEvent, UpdateBanner};
pub use capabilities::Capabilities;
pub use controller::{
    ClientEvent, ControllerState, NotificationKind, Priority, SendOptions, SubscriptionController,
};
pub use install::DisplayContext;
pub use placement::{Affordance, FooterContent, HeaderButton, HeaderLabel, Layout, PermissionState, place};
pub use platform::{ClientPlatform, DisplayRoute, NotificationPermission, Page, PushManager, PushSubscription};
pub use render::{BannerView, ConnectionStatus, Renderer, Toast, ToastLevel};

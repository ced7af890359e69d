//! Window clients the worker can see and drive.

use async_trait::async_trait;
use cendres_core::{ClientMessage, Error};
use url::Url;

/// An open application window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClient {
    pub id: String,
    pub url: Url,
    /// Whether this worker controls the window.
    pub controlled: bool,
    pub focused: bool,
}

/// Platform port over the worker's window clients.
#[async_trait]
pub trait Clients: Send + Sync {
    /// List open windows. Uncontrolled ones are included only on request.
    async fn match_all(&self, include_uncontrolled: bool) -> Result<Vec<WindowClient>, Error>;

    /// Bring a window to the front.
    async fn focus(&self, id: &str) -> Result<(), Error>;

    /// Open a new window, returning its id.
    async fn open_window(&self, url: &Url) -> Result<String, Error>;

    /// Take control of every uncontrolled window. Returns how many were claimed.
    async fn claim(&self) -> Result<usize, Error>;

    /// Post a message to every controlled window.
    async fn post_message(&self, message: &ClientMessage) -> Result<(), Error>;
}

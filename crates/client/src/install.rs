//! Detecting whether the app runs as an installed PWA.

/// Signals the page can read about how it was launched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayContext {
    /// The `(display-mode: standalone)` media query matches.
    pub standalone: bool,
    /// iOS `navigator.standalone`.
    pub ios_standalone: bool,
    pub referrer: Option<String>,
    /// Launch query string, with or without the leading `?`.
    pub query: String,
}

impl DisplayContext {
    pub fn standalone() -> Self {
        Self { standalone: true, ..Default::default() }
    }

    pub fn browser() -> Self {
        Self::default()
    }

    /// Whether any install signal is present.
    pub fn is_installed(&self) -> bool {
        self.standalone
            || self.ios_standalone
            || self.referrer.as_deref().is_some_and(|r| r.starts_with("android-app://"))
            || self.launched_from_homescreen()
    }

    fn launched_from_homescreen(&self) -> bool {
        let query = self.query.trim_start_matches('?');
        url::form_urlencoded::parse(query.as_bytes()).any(|(k, v)| k == "homescreen" && v == "1")
    }
}

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use cendres_core::{
    ClientMessage, DisplayedNotification, Error, NotificationCenter, NotificationOptions, Request, ResponseSnapshot,
};
use cendres_worker::{Clients, Network, WindowClient};
use url::Url;

/// Network double serving canned bodies by URL, with an offline switch.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeNetwork {
    responses: Mutex<HashMap<String, ResponseSnapshot>>,
    failing: Mutex<Vec<String>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeNetwork {
    pub fn serving(paths: &[String]) -> Self {
        let network = Self::default();
        for path in paths {
            network.serve(path, &format!("body of {path}"));
        }
        network
    }

    pub fn serve(&self, path: &str, body: &str) {
        let url = super::url(path);
        let content_type = if path == "/" { "text/html" } else { "application/octet-stream" };
        let response = ResponseSnapshot::ok(url.clone(), content_type, body.to_string());
        self.responses.lock().unwrap().insert(url, response);
    }

    /// Make one path fail at the transport level.
    pub fn fail(&self, path: &str) {
        self.failing.lock().unwrap().push(super::url(path));
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<ResponseSnapshot, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = request.url.as_str().to_string();
        if self.offline.load(Ordering::SeqCst) || self.failing.lock().unwrap().contains(&url) {
            return Err(Error::Fetch(format!("connection refused: {url}")));
        }
        match self.responses.lock().unwrap().get(&url) {
            Some(response) => Ok(response.clone()),
            None => {
                let mut missing = ResponseSnapshot::ok(url, "text/plain", "not found");
                missing.status = 404;
                missing.status_text = "Not Found".into();
                Ok(missing)
            }
        }
    }
}

/// Window clients that record focus, open, claim and message calls.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingClients {
    pub windows: Mutex<Vec<WindowClient>>,
    pub focused: Mutex<Vec<String>>,
    pub opened: Mutex<Vec<Url>>,
    pub messages: Mutex<Vec<ClientMessage>>,
    pub claims: AtomicUsize,
}

#[allow(dead_code)]
impl RecordingClients {
    pub fn add_window(&self, id: &str, path: &str, controlled: bool) {
        self.windows.lock().unwrap().push(WindowClient {
            id: id.to_string(),
            url: Url::parse(&super::url(path)).unwrap(),
            controlled,
            focused: false,
        });
    }

    pub fn messages(&self) -> Vec<ClientMessage> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clients for RecordingClients {
    async fn match_all(&self, include_uncontrolled: bool) -> Result<Vec<WindowClient>, Error> {
        let windows = self.windows.lock().unwrap();
        Ok(windows
            .iter()
            .filter(|w| include_uncontrolled || w.controlled)
            .cloned()
            .collect())
    }

    async fn focus(&self, id: &str) -> Result<(), Error> {
        self.focused.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn open_window(&self, url: &Url) -> Result<String, Error> {
        let mut opened = self.opened.lock().unwrap();
        opened.push(url.clone());
        Ok(format!("window-{}", opened.len()))
    }

    async fn claim(&self) -> Result<usize, Error> {
        self.claims.fetch_add(1, Ordering::SeqCst);
        let mut windows = self.windows.lock().unwrap();
        let mut claimed = 0;
        for window in windows.iter_mut().filter(|w| !w.controlled) {
            window.controlled = true;
            claimed += 1;
        }
        Ok(claimed)
    }

    async fn post_message(&self, message: &ClientMessage) -> Result<(), Error> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Notification tray with tag replacement.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingNotifications {
    shown: Mutex<Vec<DisplayedNotification>>,
}

#[async_trait]
impl NotificationCenter for RecordingNotifications {
    async fn show(&self, title: &str, options: NotificationOptions) -> Result<(), Error> {
        let mut shown = self.shown.lock().unwrap();
        if let Some(tag) = options.tag.as_deref() {
            shown.retain(|n| n.tag() != Some(tag));
        }
        shown.push(DisplayedNotification { title: title.to_string(), options });
        Ok(())
    }

    async fn close(&self, notification: &DisplayedNotification) -> Result<(), Error> {
        let mut shown = self.shown.lock().unwrap();
        match notification.tag() {
            Some(tag) => shown.retain(|n| n.tag() != Some(tag)),
            None => {
                if let Some(pos) = shown.iter().position(|n| n == notification) {
                    shown.remove(pos);
                }
            }
        }
        Ok(())
    }

    async fn displayed(&self) -> Result<Vec<DisplayedNotification>, Error> {
        Ok(self.shown.lock().unwrap().clone())
    }
}

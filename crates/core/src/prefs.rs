//! Notification preferences and their persistence.
//!
//! Preferences are stored as individual string items so they stay readable
//! by anything else sharing the origin's key/value store.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::storage::KeyValueStore;

pub const KEY_ENABLED: &str = "notifications-enabled";
pub const KEY_UPDATES: &str = "notifications-updates";
pub const KEY_EVENTS: &str = "notifications-events";
pub const KEY_FREQUENCY: &str = "notifications-frequency";
pub const KEY_EVER_ACTIVATED: &str = "notifications-ever-activated";

/// How many notifications the user wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Only high-priority notifications.
    Minimal,
    #[default]
    Normal,
    Frequent,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Minimal => "minimal",
            Frequency::Normal => "normal",
            Frequency::Frequent => "frequent",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimal" => Ok(Frequency::Minimal),
            "normal" => Ok(Frequency::Normal),
            "frequent" => Ok(Frequency::Frequent),
            other => Err(format!("unknown frequency: {other}")),
        }
    }
}

/// User notification settings plus activation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// A subscription was created and not revoked since.
    /// Does not prove the subscription is still valid.
    pub enabled: bool,
    pub updates: bool,
    pub events: bool,
    pub frequency: Frequency,
    /// Notifications were turned on at least once.
    pub ever_activated: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self { enabled: false, updates: true, events: true, frequency: Frequency::Normal, ever_activated: false }
    }
}

/// Loads and saves [`Preferences`] through a key/value store.
#[derive(Clone)]
pub struct PreferenceStore {
    store: Arc<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read preferences, filling in defaults for anything missing.
    pub async fn load(&self) -> Result<Preferences, Error> {
        let enabled = self.store.get_item(KEY_ENABLED).await?;
        let updates = self.store.get_item(KEY_UPDATES).await?;
        let events = self.store.get_item(KEY_EVENTS).await?;
        let frequency = self.store.get_item(KEY_FREQUENCY).await?;
        let ever_activated = self.store.get_item(KEY_EVER_ACTIVATED).await?;

        let frequency = match frequency.as_deref().map(Frequency::from_str) {
            Some(Ok(f)) => f,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "ignoring stored frequency");
                Frequency::default()
            }
            None => Frequency::default(),
        };

        Ok(Preferences {
            enabled: enabled.as_deref() == Some("true"),
            updates: updates.as_deref() != Some("false"),
            events: events.as_deref() != Some("false"),
            frequency,
            ever_activated: ever_activated.as_deref() == Some("true"),
        })
    }

    /// Write every preference.
    pub async fn save(&self, prefs: &Preferences) -> Result<(), Error> {
        self.store.set_item(KEY_ENABLED, bool_str(prefs.enabled)).await?;
        self.store.set_item(KEY_UPDATES, bool_str(prefs.updates)).await?;
        self.store.set_item(KEY_EVENTS, bool_str(prefs.events)).await?;
        self.store.set_item(KEY_FREQUENCY, prefs.frequency.as_str()).await?;
        self.store
            .set_item(KEY_EVER_ACTIVATED, bool_str(prefs.ever_activated))
            .await?;
        tracing::debug!(?prefs, "preferences saved");
        Ok(())
    }
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

//! Application configuration with layered loading.
//!
//! Configuration is assembled with figment from, lowest to highest priority:
//!
//! 1. Built-in defaults
//! 2. TOML config file (if CENDRES_CONFIG_FILE set)
//! 3. Environment variables (CENDRES_*, `__` separates nested keys)

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Public VAPID key the push service expects subscriptions to be created with.
pub const DEFAULT_APPLICATION_SERVER_KEY: &str =
    "BEl62iUYgUivxIkv69yViEuiBIa40HI9stpf_kznoHRBSTtfn2H-YsGnVeRWqf_w8D8tVbp_r1pSUjT0HDkQZC0";

/// Application configuration shared by the worker, the page and the origin server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Display name, used as the default notification title.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Origin the app is served from; manifest paths resolve against it.
    ///
    /// Set via CENDRES_ORIGIN.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Name of the current cache store. Bump it to ship a new version.
    ///
    /// Set via CENDRES_CACHE_VERSION.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Root-relative paths precached on install and served cache-first.
    #[serde(default = "default_static_assets")]
    pub static_assets: Vec<String>,

    /// Base64url-encoded VAPID public key.
    ///
    /// Set via CENDRES_APPLICATION_SERVER_KEY.
    #[serde(default = "default_application_server_key")]
    pub application_server_key: String,

    /// Path to the per-origin SQLite database.
    ///
    /// Set via CENDRES_DB_PATH.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent for worker network requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Network timeout in milliseconds. Unset means wait on the network stack.
    #[serde(default)]
    pub fetch_timeout_ms: Option<u64>,

    /// Activate a new worker as soon as it installs instead of waiting
    /// for a skip-waiting message.
    #[serde(default)]
    pub auto_skip_waiting: bool,

    /// Notification icon path.
    #[serde(default = "default_icon")]
    pub icon: String,

    /// Notification badge path.
    #[serde(default = "default_icon")]
    pub badge: String,

    /// Vibration pattern for page-sent notifications.
    #[serde(default = "default_vibrate")]
    pub vibrate: Vec<u32>,

    /// Delay before the welcome notification after subscribing.
    #[serde(default = "default_welcome_delay_ms")]
    pub welcome_delay_ms: u64,

    /// How long the "back online" indicator stays up.
    #[serde(default = "default_connection_status_ms")]
    pub connection_status_ms: u64,

    /// Pause between asking the waiting worker to take over and reloading
    /// the page, so the reload is answered by the new worker.
    #[serde(default = "default_reload_delay_ms")]
    pub reload_delay_ms: u64,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Origin server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Set via CENDRES_SERVER__PORT.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served under `/static`; must contain `index.html`.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Directory served under `/zplace`.
    #[serde(default = "default_zplace_dir")]
    pub zplace_dir: PathBuf,
}

fn default_app_name() -> String {
    "Cendres Incandescentes".into()
}

fn default_origin() -> String {
    "http://localhost:3000".into()
}

fn default_cache_version() -> String {
    "cendres-incandescentes-v3.0.0".into()
}

fn default_static_assets() -> Vec<String> {
    vec!["/".into(), "/zplace/ZPlace_Logo_C.I.png".into(), "/manifest.json".into()]
}

fn default_application_server_key() -> String {
    DEFAULT_APPLICATION_SERVER_KEY.into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./cendres-origin.sqlite")
}

fn default_user_agent() -> String {
    "cendres/0.1".into()
}

fn default_icon() -> String {
    "/Logo-Cendres_Incandescentes-Fond_transparent.png".into()
}

fn default_vibrate() -> Vec<u32> {
    vec![200, 100, 200]
}

fn default_welcome_delay_ms() -> u64 {
    1_000
}

fn default_connection_status_ms() -> u64 {
    3_000
}

fn default_reload_delay_ms() -> u64 {
    500
}

fn default_bind() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_zplace_dir() -> PathBuf {
    PathBuf::from("ZPlace")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            public_dir: default_public_dir(),
            zplace_dir: default_zplace_dir(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            origin: default_origin(),
            cache_version: default_cache_version(),
            static_assets: default_static_assets(),
            application_server_key: default_application_server_key(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            fetch_timeout_ms: None,
            auto_skip_waiting: false,
            icon: default_icon(),
            badge: default_icon(),
            vibrate: default_vibrate(),
            welcome_delay_ms: default_welcome_delay_ms(),
            connection_status_ms: default_connection_status_ms(),
            reload_delay_ms: default_reload_delay_ms(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Network timeout, if one is configured.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    pub fn welcome_delay(&self) -> Duration {
        Duration::from_millis(self.welcome_delay_ms)
    }

    pub fn connection_status_duration(&self) -> Duration {
        Duration::from_millis(self.connection_status_ms)
    }

    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }

    /// The configured origin as a URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin does not parse.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.origin).map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("CENDRES_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("CENDRES_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

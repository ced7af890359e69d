pub mod mocks;

#[allow(unused_imports)]
pub use mocks::{FakePlatform, RecordingRenderer};

use std::sync::Arc;

use cendres_client::{Capabilities, ClientPlatform, SubscriptionController};
use cendres_core::{AppConfig, MemoryStore};

#[allow(dead_code)]
pub struct Harness {
    pub controller: SubscriptionController,
    pub platform: Arc<FakePlatform>,
    pub renderer: Arc<RecordingRenderer>,
    pub store: Arc<MemoryStore>,
}

#[allow(dead_code)]
pub fn config() -> AppConfig {
    AppConfig { welcome_delay_ms: 0, connection_status_ms: 0, reload_delay_ms: 0, ..AppConfig::default() }
}

#[allow(dead_code)]
pub fn harness(platform: FakePlatform, store: MemoryStore) -> Harness {
    harness_with(platform, store, Capabilities::full())
}

#[allow(dead_code)]
pub fn harness_with(platform: FakePlatform, store: MemoryStore, caps: Capabilities) -> Harness {
    harness_configured(&config(), platform, store, caps)
}

#[allow(dead_code)]
pub fn harness_configured(
    config: &AppConfig, platform: FakePlatform, store: MemoryStore, caps: Capabilities,
) -> Harness {
    let platform = Arc::new(platform);
    let store = Arc::new(store);
    let renderer = Arc::new(RecordingRenderer::default());
    let ports = ClientPlatform { permission: platform.clone(), push: platform.clone(), page: platform.clone() };
    let controller = SubscriptionController::new(config, caps, store.clone(), ports, renderer.clone()).unwrap();
    Harness { controller, platform, renderer, store }
}

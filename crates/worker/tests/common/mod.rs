pub mod mocks;

#[allow(unused_imports)]
pub use mocks::{FakeNetwork, RecordingClients, RecordingNotifications};

use std::sync::Arc;

use cendres_core::{AppConfig, OriginDb};
use cendres_worker::{Registration, WorkerPlatform};

pub const ORIGIN: &str = "http://localhost:3000";

#[allow(dead_code)]
pub struct Harness {
    pub registration: Registration,
    pub network: Arc<FakeNetwork>,
    pub clients: Arc<RecordingClients>,
    pub notifications: Arc<RecordingNotifications>,
}

/// A registration over an in-memory database with every default asset served.
#[allow(dead_code)]
pub async fn harness(config: &AppConfig) -> Harness {
    let network = Arc::new(FakeNetwork::serving(&config.static_assets));
    let clients = Arc::new(RecordingClients::default());
    let notifications = Arc::new(RecordingNotifications::default());
    let platform = WorkerPlatform {
        network: network.clone(),
        clients: clients.clone(),
        notifications: notifications.clone(),
    };
    let db = OriginDb::open_in_memory().await.unwrap();
    let registration = Registration::new(config, db, platform).unwrap();
    Harness { registration, network, clients, notifications }
}

#[allow(dead_code)]
pub fn url(path: &str) -> String {
    format!("{ORIGIN}{path}")
}

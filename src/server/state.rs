use std::sync::Arc;

use super::proxy::ProxyClient;
use crate::application::DiscoveryService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub discovery: Arc<DiscoveryService>,
    pub proxy: Arc<ProxyClient>,
}

impl AppState {
    pub fn new(discovery: Arc<DiscoveryService>, proxy: ProxyClient) -> Self {
        Self {
            discovery,
            proxy: Arc::new(proxy),
        }
    }
}

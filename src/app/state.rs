use std::sync::Arc;

use crate::adapters::{assets::LocalAssets, network, tunnel::TunnelState};
use crate::config::ServerConfig;
use crate::core::{AssetStore, LivePoll};

pub const VOTE_PAGE: &str = "/vote.html";

/// Everything a request handler may touch. One per running server.
#[derive(Clone)]
pub struct AppState {
    pub poll: Arc<LivePoll>,
    pub tunnel: TunnelState,
    pub assets: Arc<dyn AssetStore>,
    pub port: u16,
}

impl AppState {
    pub fn new(
        poll: Arc<LivePoll>,
        tunnel: TunnelState,
        assets: Arc<dyn AssetStore>,
        port: u16,
    ) -> Self {
        Self {
            poll,
            tunnel,
            assets,
            port,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            Arc::new(LivePoll::new(config.subscriber_buffer)),
            TunnelState::new(),
            Arc::new(LocalAssets::new(&config.static_dir)),
            config.port,
        )
    }

    pub fn local_base_url(&self) -> String {
        format!("http://{}:{}", network::resolve(), self.port)
    }

    /// Link for the QR code: the tunnel when there is one, else the LAN address.
    pub fn vote_url(&self) -> String {
        let base = self
            .tunnel
            .current()
            .unwrap_or_else(|| self.local_base_url());
        format!("{}{}", base, VOTE_PAGE)
    }
}

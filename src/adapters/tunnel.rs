use crate::utils::error::Result;
use reqwest::Client;
use serde::Deserialize;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_TUNNEL_API: &str = "http://127.0.0.1:4040/api/tunnels";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
pub struct TunnelList {
    #[serde(default)]
    pub tunnels: Vec<TunnelDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TunnelDescriptor {
    #[serde(default)]
    pub proto: String,
    #[serde(default)]
    pub public_url: String,
}

/// Public base URL of the tunnel, if one has been seen.
#[derive(Debug, Clone, Default)]
pub struct TunnelState {
    url: Arc<RwLock<Option<String>>>,
}

impl TunnelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<String> {
        self.url
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Store `url`; returns whether it differs from what was there.
    pub fn set(&self, url: String) -> bool {
        let mut current = self.url.write().unwrap_or_else(PoisonError::into_inner);
        if current.as_deref() == Some(url.as_str()) {
            return false;
        }
        *current = Some(url);
        true
    }
}

/// Public URL of the first `https` tunnel, trailing slash removed.
pub fn select_public_url(tunnels: &[TunnelDescriptor]) -> Option<String> {
    tunnels
        .iter()
        .find(|t| t.proto == "https")
        .map(|t| t.public_url.trim_end_matches('/'))
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

/// Polls the local tunnel agent's API for a public URL.
///
/// Every failure is expected (the agent is usually not running) and leaves
/// the stored URL untouched.
#[derive(Debug, Clone)]
pub struct TunnelDetector {
    client: Client,
    endpoint: String,
    state: TunnelState,
}

impl TunnelDetector {
    pub fn new(endpoint: impl Into<String>, state: TunnelState) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint: endpoint.into(),
            state,
        }
    }

    pub async fn fetch(&self) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await?
            .error_for_status()?;

        let list: TunnelList = response.json().await?;
        Ok(select_public_url(&list.tunnels))
    }

    /// One detection round. Returns the URL seen this round, if any.
    pub async fn poll(&self) -> Option<String> {
        match self.fetch().await {
            Ok(Some(url)) => {
                if self.state.set(url.clone()) {
                    tracing::info!("Tunnel detected: {}", url);
                    tracing::info!("Voting page:     {}/vote.html", url);
                }
                Some(url)
            }
            Ok(None) => {
                tracing::debug!("Tunnel agent reachable but no https tunnel is open");
                None
            }
            Err(e) => {
                tracing::debug!("Tunnel agent not available: {}", e);
                None
            }
        }
    }

    /// Poll now, then every `interval`, until the returned task is aborted.
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                self.poll().await;
            }
        })
    }
}

use crate::adapters::tunnel::{DEFAULT_POLL_INTERVAL, DEFAULT_TUNNEL_API};
use crate::core::hub::DEFAULT_SUBSCRIBER_BUFFER;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "live-poll")]
#[command(about = "Live audience polling server with real-time results")]
pub struct ServerConfig {
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Directory holding index.html, vote.html and friends
    #[arg(long, env = "STATIC_DIR", default_value = ".")]
    pub static_dir: String,

    #[arg(long, env = "TUNNEL_API", default_value = DEFAULT_TUNNEL_API)]
    pub tunnel_api: String,

    #[arg(long, env = "TUNNEL_INTERVAL_SECS", default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    pub tunnel_interval_secs: u64,

    #[arg(long, help = "Do not look for a public tunnel")]
    pub no_tunnel: bool,

    /// Snapshots a results viewer may lag behind before it is dropped
    #[arg(long, env = "SUBSCRIBER_BUFFER", default_value_t = DEFAULT_SUBSCRIBER_BUFFER)]
    pub subscriber_buffer: usize,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn tunnel_interval(&self) -> Duration {
        Duration::from_secs(self.tunnel_interval_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            static_dir: ".".to_string(),
            tunnel_api: DEFAULT_TUNNEL_API.to_string(),
            tunnel_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            no_tunnel: false,
            subscriber_buffer: DEFAULT_SUBSCRIBER_BUFFER,
            verbose: false,
            log_json: false,
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("host", &self.host)?;
        validate_path("static_dir", &self.static_dir)?;
        validate_positive_number("subscriber_buffer", self.subscriber_buffer as u64, 1)?;

        if !self.no_tunnel {
            validate_url("tunnel_api", &self.tunnel_api)?;
            validate_positive_number("tunnel_interval_secs", self.tunnel_interval_secs, 1)?;
        }

        Ok(())
    }
}

pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use app::{router, AppState, PollServer};
pub use config::ServerConfig;
pub use crate::core::{LivePoll, Snapshot, Subscription};
pub use utils::error::{PollError, Result};

pub mod hub;
pub mod ledger;
pub mod poll;

pub use crate::domain::model::{ResetToken, Snapshot};
pub use crate::domain::ports::AssetStore;
pub use crate::utils::error::Result;
pub use hub::{BroadcastHub, SubscriberId};
pub use ledger::Ledger;
pub use poll::{LivePoll, Subscription};

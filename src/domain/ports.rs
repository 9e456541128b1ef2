use crate::utils::error::Result;
use async_trait::async_trait;

/// Source of the static presentation and vote pages.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// `path` is relative to the store root and already checked for traversal.
    async fn read_asset(&self, path: &str) -> Result<Vec<u8>>;
}

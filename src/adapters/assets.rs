use crate::domain::ports::AssetStore;
use crate::utils::error::{PollError, Result};
use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

const INDEX_PAGE: &str = "index.html";

/// Serves pages straight from a directory on disk.
#[derive(Debug, Clone)]
pub struct LocalAssets {
    root: PathBuf,
}

impl LocalAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetStore for LocalAssets {
    async fn read_asset(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.root.join(path);

        tokio::fs::read(&full_path).await.map_err(|e| {
            tracing::debug!("Asset {} unavailable: {}", full_path.display(), e);
            PollError::NotFound {
                path: path.to_string(),
            }
        })
    }
}

/// Turn a request path into a path relative to the asset root.
///
/// Returns `None` for anything that could step outside the root.
pub fn resolve_request_path(request_path: &str) -> Option<String> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;

    let mut segments = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\\') || s.contains('\0') => return None,
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Some(INDEX_PAGE.to_string());
    }
    Some(segments.join("/"))
}

pub fn content_type(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("html") => "text/html",
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

use crate::foundation::error::{BoothError, BoothResult};

/// Opaque handle to a loadable overlay image.
///
/// For filesystem sources this is a path relative to the asset root.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AssetRef(String);

impl AssetRef {
    /// Wrap a handle string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the handle string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Load-on-demand byte source for overlay assets with unknown latency.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Fetch the encoded bytes behind `asset`.
    async fn load(&self, asset: &AssetRef) -> BoothResult<Vec<u8>>;
}

/// Normalize and validate asset-root-relative paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> BoothResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(BoothError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(BoothError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(BoothError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(BoothError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

/// Reads assets from files below a root directory.
#[derive(Clone, Debug)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetSource for FsAssetSource {
    async fn load(&self, asset: &AssetRef) -> BoothResult<Vec<u8>> {
        let rel = normalize_rel_path(asset.as_str())?;
        let path = self.root.join(&rel);
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("read asset '{}'", path.display()))?;
        Ok(bytes)
    }
}

/// In-memory source, optionally with simulated per-asset latency.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetSource {
    entries: HashMap<AssetRef, Vec<u8>>,
    delays: HashMap<AssetRef, Duration>,
}

impl MemoryAssetSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes for `asset`.
    pub fn insert(&mut self, asset: impl Into<AssetRef>, bytes: Vec<u8>) {
        self.entries.insert(asset.into(), bytes);
    }

    /// Delay every load of `asset` by `delay`.
    pub fn set_delay(&mut self, asset: impl Into<AssetRef>, delay: Duration) {
        self.delays.insert(asset.into(), delay);
    }
}

#[async_trait]
impl AssetSource for MemoryAssetSource {
    async fn load(&self, asset: &AssetRef) -> BoothResult<Vec<u8>> {
        if let Some(delay) = self.delays.get(asset) {
            tokio::time::sleep(*delay).await;
        }
        self.entries
            .get(asset)
            .cloned()
            .ok_or_else(|| BoothError::asset(format!("unknown asset '{asset}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;

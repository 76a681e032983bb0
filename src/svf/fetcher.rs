//! The boundary the core reads through (spec §6): `fetch(uri) -> bytes |
//! NotFound | TransportError`. Everything upstream of this trait — APS
//! auth, HTTP retry/chunking — is an external collaborator out of scope
//! for this crate; only the abstraction and the recovery policy around it
//! (§7: a 404 on an image is non-fatal) live here.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("transport error fetching {uri}: {source}")]
    Transport {
        uri: String,
        #[source]
        source: anyhow::Error,
    },
}

#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError>;
}

/// A fetcher over assets already materialized as files under one
/// directory, used by the CLI in lieu of a real APS download (§6: CLI is
/// an external collaborator specified only for completeness).
pub struct LocalDirFetcher {
    root: std::path::PathBuf,
}

impl LocalDirFetcher {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        LocalDirFetcher { root: root.into() }
    }
}

#[async_trait]
impl AssetFetcher for LocalDirFetcher {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.root.join(uri);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::NotFound(uri.to_string())),
            Err(e) => Err(FetchError::Transport { uri: uri.to_string(), source: e.into() }),
        }
    }
}

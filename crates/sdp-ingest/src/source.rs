//! Provider abstraction
//!
//! A provider is anywhere PDRs and their data files live. Every transport
//! implements the same two primitives, listing and fetching, and everything
//! above this layer is protocol-agnostic.

use async_trait::async_trait;
use sdp_common::{Result, SdpError};
use serde::Serialize;

/// One entry in a provider directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteEntry {
    /// Name relative to the listed path
    pub name: String,
    /// Size in bytes, when the protocol reports one
    pub size: Option<u64>,
    pub is_directory: bool,
}

/// A remote location that serves PDRs and the files they announce
#[async_trait]
pub trait PdrSource: Send + Sync {
    /// List the entries under a provider path
    async fn list(&self, path: &str) -> Result<Vec<RemoteEntry>>;

    /// Fetch a file's full contents
    async fn fetch(&self, path: &str) -> Result<Vec<u8>>;

    /// Fetch a file and decode it as UTF-8 text
    async fn fetch_text(&self, path: &str) -> Result<String> {
        let bytes = self.fetch(path).await?;
        String::from_utf8(bytes)
            .map_err(|e| SdpError::Network(format!("{} is not valid UTF-8: {}", path, e)))
    }
}

/// Join a provider directory and an entry name into a fetchable path
pub fn join_remote(directory: &str, name: &str) -> String {
    let directory = directory.trim_end_matches('/');
    if directory.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", directory, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_remote() {
        assert_eq!(join_remote("/pdrs/", "a.PDR"), "/pdrs/a.PDR");
        assert_eq!(join_remote("/pdrs", "a.PDR"), "/pdrs/a.PDR");
        assert_eq!(join_remote("", "a.PDR"), "a.PDR");
    }
}

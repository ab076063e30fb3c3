//! PDR discovery
//!
//! A provider directory holds a mix of manifests, data, and clutter; only
//! entries with a `.PDR` extension (any case) are manifests. Results are
//! sorted by name so repeated discovery runs see a stable order.

use crate::source::{PdrSource, RemoteEntry};
use sdp_common::Result;
use tracing::info;

/// Whether a provider entry name looks like a PDR manifest
pub fn is_pdr_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdr")
}

/// List the PDR manifests under a provider path
pub async fn discover_pdrs(source: &dyn PdrSource, path: &str) -> Result<Vec<RemoteEntry>> {
    let mut pdrs: Vec<RemoteEntry> = source
        .list(path)
        .await?
        .into_iter()
        .filter(|entry| !entry.is_directory && is_pdr_name(&entry.name))
        .collect();

    pdrs.sort_by(|a, b| a.name.cmp(&b.name));

    info!("Discovered {} PDRs under {}", pdrs.len(), path);
    Ok(pdrs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sdp_common::SdpError;

    struct FixedListing(Vec<RemoteEntry>);

    #[async_trait]
    impl PdrSource for FixedListing {
        async fn list(&self, _path: &str) -> Result<Vec<RemoteEntry>> {
            Ok(self.0.clone())
        }

        async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
            Err(SdpError::Network(format!("no such file: {}", path)))
        }
    }

    fn file(name: &str) -> RemoteEntry {
        RemoteEntry {
            name: name.to_string(),
            size: None,
            is_directory: false,
        }
    }

    #[tokio::test]
    async fn test_discovery_filters_and_sorts() {
        let source = FixedListing(vec![
            file("notes.txt"),
            file("b.pdr"),
            file("A.PDR"),
            RemoteEntry {
                name: "archive.pdr".to_string(),
                size: None,
                is_directory: true,
            },
        ]);

        let pdrs = discover_pdrs(&source, "/pdrs").await.unwrap();
        let names: Vec<&str> = pdrs.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A.PDR", "b.pdr"]);
    }

    #[test]
    fn test_is_pdr_name() {
        assert!(is_pdr_name("PDN.ID1611071307.PDR"));
        assert!(is_pdr_name("lowercase.pdr"));
        assert!(!is_pdr_name("data.hdf"));
        assert!(!is_pdr_name("pdr"));
    }
}

//! Provider and collection configuration
//!
//! Providers come from environment variables, collections from a JSON file.
//! `SDP_PROVIDER_PROTOCOL` selects the transport; each transport reads its
//! own variables beyond that.

use crate::ftp::{FtpConfig, FtpSource};
use crate::http::{HttpConfig, HttpSource};
use crate::object_store::{S3Config, S3Source};
use crate::source::PdrSource;
use sdp_common::{Result, SdpError};
use sdp_parser::{CollectionRegistry, GranuleIdExtractor};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Transport-specific provider settings
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    Ftp(FtpConfig),
    Http(HttpConfig),
    S3(S3Config),
}

impl ProviderConfig {
    /// Load provider settings from the environment
    ///
    /// | Variable | Meaning |
    /// |----------|---------|
    /// | `SDP_PROVIDER_PROTOCOL` | `ftp`, `http`, or `s3` |
    /// | `SDP_FTP_HOST`, `SDP_FTP_PORT`, `SDP_FTP_USERNAME`, `SDP_FTP_PASSWORD` | FTP connection |
    /// | `SDP_HTTP_BASE_URL`, `SDP_HTTP_TIMEOUT_SECS` | HTTP provider |
    /// | `SDP_S3_BUCKET`, `SDP_S3_REGION`, `SDP_S3_ENDPOINT`, `SDP_S3_ACCESS_KEY`, `SDP_S3_SECRET_KEY`, `SDP_S3_PATH_STYLE` | S3 provider |
    pub fn from_env() -> Result<Self> {
        let protocol = require_env("SDP_PROVIDER_PROTOCOL")?;

        match protocol.to_ascii_lowercase().as_str() {
            "ftp" => {
                let defaults = FtpConfig::default();
                Ok(Self::Ftp(FtpConfig {
                    host: require_env("SDP_FTP_HOST")?,
                    port: env_parsed("SDP_FTP_PORT", defaults.port)?,
                    username: optional_env("SDP_FTP_USERNAME").unwrap_or(defaults.username),
                    password: optional_env("SDP_FTP_PASSWORD").unwrap_or(defaults.password),
                }))
            },
            "http" => {
                let mut config = HttpConfig::new(require_env("SDP_HTTP_BASE_URL")?);
                config.timeout_secs = env_parsed("SDP_HTTP_TIMEOUT_SECS", config.timeout_secs)?;
                Ok(Self::Http(config))
            },
            "s3" => Ok(Self::S3(S3Config {
                bucket: require_env("SDP_S3_BUCKET")?,
                region: optional_env("SDP_S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                endpoint: optional_env("SDP_S3_ENDPOINT"),
                access_key: optional_env("SDP_S3_ACCESS_KEY"),
                secret_key: optional_env("SDP_S3_SECRET_KEY"),
                path_style: env_parsed("SDP_S3_PATH_STYLE", false)?,
            })),
            other => Err(SdpError::Config(format!(
                "unknown provider protocol: {} (expected ftp, http, or s3)",
                other
            ))),
        }
    }

    /// Build the source for this provider
    pub async fn connect(&self) -> Result<Box<dyn PdrSource>> {
        match self {
            Self::Ftp(config) => Ok(Box::new(FtpSource::new(config.clone()))),
            Self::Http(config) => Ok(Box::new(HttpSource::new(config.clone())?)),
            Self::S3(config) => Ok(Box::new(S3Source::new(config.clone()).await?)),
        }
    }
}

/// One collection's granule grouping settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// FILE_GROUP DATA_TYPE this applies to; None makes it the default
    pub data_type: Option<String>,
    /// Granule id extraction regex for file names of this collection
    pub granule_id_extraction: String,
}

/// Load collection settings from a JSON file
pub fn load_collections(path: impl AsRef<Path>) -> Result<Vec<CollectionConfig>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    serde_json::from_str(&text).map_err(|e| {
        SdpError::Config(format!(
            "invalid collection config {}: {}",
            path.as_ref().display(),
            e
        ))
    })
}

/// Compile collection settings into a registry
pub fn build_registry(collections: &[CollectionConfig]) -> Result<CollectionRegistry> {
    let mut registry = CollectionRegistry::new();

    for collection in collections {
        let extractor = GranuleIdExtractor::new(&collection.granule_id_extraction)?;
        match &collection.data_type {
            Some(data_type) => registry.insert(data_type.clone(), extractor),
            None => registry.set_default(extractor),
        }
    }

    Ok(registry)
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| SdpError::Config(format!("{} must be set", name)))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match optional_env(name) {
        Some(value) => value
            .parse()
            .map_err(|_| SdpError::Config(format!("invalid value for {}: {}", name, value))),
        None => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_collections_and_build_registry() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"data_type": "MOD09GQ", "granule_id_extraction": "^(.*)\\.hdf"}},
                {{"data_type": null, "granule_id_extraction": "^(.*)\\.dat"}}
            ]"#
        )
        .unwrap();

        let collections = load_collections(file.path()).unwrap();
        assert_eq!(collections.len(), 2);

        let registry = build_registry(&collections).unwrap();
        let extractor = registry.resolve(Some("MOD09GQ")).unwrap();
        assert_eq!(extractor.extract("a.hdf").as_deref(), Some("a"));

        // unknown data type falls through to the default
        let fallback = registry.resolve(Some("OTHER")).unwrap();
        assert_eq!(fallback.extract("a.dat").as_deref(), Some("a"));
    }

    #[test]
    fn test_invalid_collection_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            load_collections(file.path()).unwrap_err(),
            SdpError::Config(_)
        ));
    }

    #[test]
    fn test_invalid_extraction_regex() {
        let collections = vec![CollectionConfig {
            data_type: None,
            granule_id_extraction: "(unclosed".to_string(),
        }];
        assert!(matches!(
            build_registry(&collections).unwrap_err(),
            SdpError::Config(_)
        ));
    }
}

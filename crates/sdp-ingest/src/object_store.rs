//! S3 provider
//!
//! Some providers stage PDRs in an S3 bucket rather than behind a server.
//! Paths map to object keys; a "directory" is just a key prefix. Static
//! credentials are used when configured, otherwise the ambient AWS
//! credential chain.

use crate::source::{PdrSource, RemoteEntry};
use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::Client;
use sdp_common::{Result, SdpError};
use tracing::{debug, info};

/// S3 provider settings
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for MinIO and other S3-compatible stores
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Path-style addressing, required by most S3-compatible stores
    pub path_style: bool,
}

/// S3-backed [`PdrSource`]
pub struct S3Source {
    client: Client,
    bucket: String,
}

impl S3Source {
    pub async fn new(config: S3Config) -> Result<Self> {
        debug!("Initializing S3 client for bucket: {}", config.bucket);

        let client = match (&config.access_key, &config.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                let credentials =
                    Credentials::new(access_key, secret_key, None, None, "sdp-ingest");

                let mut builder = aws_sdk_s3::Config::builder()
                    .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
                    .credentials_provider(credentials)
                    .region(Region::new(config.region.clone()))
                    .force_path_style(config.path_style);

                if let Some(endpoint) = &config.endpoint {
                    builder = builder.endpoint_url(endpoint);
                }

                Client::from_conf(builder.build())
            },
            _ => {
                let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
                    .region(Region::new(config.region.clone()))
                    .load()
                    .await;

                let mut builder = aws_sdk_s3::config::Builder::from(&shared)
                    .force_path_style(config.path_style);

                if let Some(endpoint) = &config.endpoint {
                    builder = builder.endpoint_url(endpoint);
                }

                Client::from_conf(builder.build())
            },
        };

        info!("S3 client initialized for bucket: {}", config.bucket);

        Ok(Self {
            client,
            bucket: config.bucket,
        })
    }

    fn key_for(path: &str) -> &str {
        path.trim_start_matches('/')
    }
}

#[async_trait]
impl PdrSource for S3Source {
    async fn list(&self, path: &str) -> Result<Vec<RemoteEntry>> {
        let prefix = {
            let key = Self::key_for(path).trim_end_matches('/');
            if key.is_empty() {
                String::new()
            } else {
                format!("{}/", key)
            }
        };

        let mut entries = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&prefix)
                .delimiter("/");

            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(|e| {
                SdpError::Network(format!(
                    "failed to list s3://{}/{}: {}",
                    self.bucket, prefix, e
                ))
            })?;

            for common_prefix in response.common_prefixes() {
                if let Some(sub) = common_prefix.prefix() {
                    let name = sub
                        .strip_prefix(&prefix)
                        .unwrap_or(sub)
                        .trim_end_matches('/')
                        .to_string();
                    if !name.is_empty() {
                        entries.push(RemoteEntry {
                            name,
                            size: None,
                            is_directory: true,
                        });
                    }
                }
            }

            for object in response.contents() {
                let Some(key) = object.key() else {
                    continue;
                };
                let name = key.strip_prefix(&prefix).unwrap_or(key).to_string();
                if name.is_empty() {
                    continue;
                }
                entries.push(RemoteEntry {
                    name,
                    size: object.size().and_then(|s| u64::try_from(s).ok()),
                    is_directory: false,
                });
            }

            match response.next_continuation_token() {
                Some(token) => continuation_token = Some(token.to_string()),
                None => break,
            }
        }

        info!(
            "Listed s3://{}/{} ({} entries)",
            self.bucket,
            prefix,
            entries.len()
        );
        Ok(entries)
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let key = Self::key_for(path);
        debug!("Downloading s3://{}/{}", self.bucket, key);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                SdpError::Network(format!("failed to fetch s3://{}/{}: {}", self.bucket, key, e))
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| SdpError::Network(format!("failed to read body of {}: {}", key, e)))?
            .into_bytes()
            .to_vec();

        info!("Fetched s3://{}/{} ({} bytes)", self.bucket, key, data.len());
        Ok(data)
    }
}

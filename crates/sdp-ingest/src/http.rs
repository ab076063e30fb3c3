//! HTTP provider
//!
//! Providers without FTP expose a web server with autoindex-style directory
//! listings. Listing means fetching the directory page and scraping its
//! anchor tags; S3 static sites, Apache, and nginx all render listings as
//! plain `<a href>` links, so one selector covers them.

use crate::source::{PdrSource, RemoteEntry};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use sdp_common::{Result, SdpError};
use std::time::Duration;
use tracing::{debug, info};

/// HTTP provider settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL everything else is resolved against, e.g. `https://data.example.gov/pdrs`
    pub base_url: String,
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 30,
        }
    }
}

/// HTTP-backed [`PdrSource`]
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("sdp-ingest/0.1")
            .build()
            .map_err(|e| SdpError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SdpError::Network(format!("GET {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(SdpError::Network(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl PdrSource for HttpSource {
    async fn list(&self, path: &str) -> Result<Vec<RemoteEntry>> {
        // Directory listings need the trailing slash or most servers redirect
        let mut url = self.url_for(path);
        if !url.ends_with('/') {
            url.push('/');
        }

        let html = self
            .get(&url)
            .await?
            .text()
            .await
            .map_err(|e| SdpError::Network(format!("failed to read listing body: {}", e)))?;

        let entries = parse_listing(&html);
        info!("Listed {} ({} entries)", url, entries.len());
        Ok(entries)
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url_for(path);
        let bytes = self
            .get(&url)
            .await?
            .bytes()
            .await
            .map_err(|e| SdpError::Network(format!("failed to read body of {}: {}", url, e)))?;

        info!("Fetched {} ({} bytes)", url, bytes.len());
        Ok(bytes.to_vec())
    }
}

/// Scrape the anchors of an autoindex page into directory entries
///
/// Parent links, absolute links, and sort-order query links are navigation,
/// not content, and are dropped.
fn parse_listing(html: &str) -> Vec<RemoteEntry> {
    let document = Html::parse_document(html);
    let anchors = match Selector::parse("a") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let mut entries = Vec::new();
    for element in document.select(&anchors) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if href.is_empty()
            || href.starts_with('?')
            || href.starts_with('#')
            || href.starts_with('/')
            || href.contains("://")
            || href == "../"
            || href == ".."
        {
            continue;
        }

        let is_directory = href.ends_with('/');
        let name = href.trim_end_matches('/').to_string();
        if name.is_empty() {
            continue;
        }

        entries.push(RemoteEntry {
            name,
            size: None,
            is_directory,
        });
    }

    entries
}

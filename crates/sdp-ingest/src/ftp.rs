//! FTP provider
//!
//! Many providers still publish PDRs over plain FTP. The client library is
//! blocking, so every operation runs on the blocking thread pool and retries
//! with linear backoff before giving up. Extended Passive Mode is used
//! throughout for NAT/firewall compatibility.

use crate::source::{PdrSource, RemoteEntry};
use async_trait::async_trait;
use sdp_common::{Result, SdpError};
use std::io::Read;
use std::time::Duration;
use suppaftp::FtpStream;
use tracing::{debug, info, warn};

/// Maximum number of attempts per FTP operation
pub const MAX_RETRIES: u32 = 3;

/// Base delay between attempts; actual delay is this times the attempt number
pub const RETRY_DELAY_SECS: u64 = 5;

/// FTP connection settings
#[derive(Debug, Clone)]
pub struct FtpConfig {
    pub host: String,
    pub port: u16,
    /// Typically "anonymous" for public servers
    pub username: String,
    /// Typically an email address for anonymous access
    pub password: String,
}

impl Default for FtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 21,
            username: "anonymous".to_string(),
            password: "user@example.com".to_string(),
        }
    }
}

/// FTP-backed [`PdrSource`] with per-operation retry
pub struct FtpSource {
    config: FtpConfig,
}

impl FtpSource {
    pub fn new(config: FtpConfig) -> Self {
        Self { config }
    }

    /// Run a blocking FTP operation with retries
    async fn with_retry<T, F>(&self, what: &str, path: &str, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: Fn(&FtpConfig, &str) -> Result<T> + Clone + Send + Sync + 'static,
    {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            debug!("FTP {} attempt {}/{} for: {}", what, attempt, MAX_RETRIES, path);

            let config = self.config.clone();
            let path_owned = path.to_string();
            let op = op.clone();

            match tokio::task::spawn_blocking(move || op(&config, &path_owned)).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => {
                    if attempt < MAX_RETRIES {
                        let delay = RETRY_DELAY_SECS * attempt as u64;
                        warn!(
                            "FTP {} attempt {}/{} failed: {}. Retrying in {}s...",
                            what, attempt, MAX_RETRIES, e, delay
                        );
                        tokio::time::sleep(Duration::from_secs(delay)).await;
                        last_error = Some(e);
                    } else {
                        return Err(SdpError::Network(format!(
                            "FTP {} of {} failed after {} attempts: {}",
                            what, path, MAX_RETRIES, e
                        )));
                    }
                },
                Err(e) => {
                    return Err(SdpError::Network(format!("FTP {} task panicked: {}", what, e)));
                },
            }
        }

        Err(last_error
            .unwrap_or_else(|| SdpError::Network(format!("FTP {} of {} failed", what, path))))
    }

    fn connect(config: &FtpConfig) -> Result<FtpStream> {
        debug!("Connecting to FTP server: {}:{}", config.host, config.port);

        let mut stream = FtpStream::connect(format!("{}:{}", config.host, config.port))
            .map_err(|e| SdpError::Network(format!("FTP connect failed: {}", e)))?;

        stream.set_mode(suppaftp::Mode::ExtendedPassive);

        stream
            .login(&config.username, &config.password)
            .map_err(|e| SdpError::Network(format!("FTP login failed: {}", e)))?;

        Ok(stream)
    }

    fn fetch_sync(config: &FtpConfig, path: &str) -> Result<Vec<u8>> {
        let mut stream = Self::connect(config)?;

        stream
            .transfer_type(suppaftp::types::FileType::Binary)
            .map_err(|e| SdpError::Network(format!("FTP binary mode failed: {}", e)))?;

        let mut reader = stream
            .retr_as_buffer(path)
            .map_err(|e| SdpError::Network(format!("FTP download of {} failed: {}", path, e)))?;

        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        debug!("Downloaded {} bytes from {}", data.len(), path);

        if let Err(e) = stream.quit() {
            warn!("Failed to quit FTP session gracefully: {}", e);
        }

        Ok(data)
    }

    fn list_sync(config: &FtpConfig, path: &str) -> Result<Vec<RemoteEntry>> {
        let mut stream = Self::connect(config)?;

        debug!("Listing directory: {}", path);
        let lines = stream
            .list(Some(path))
            .map_err(|e| SdpError::Network(format!("FTP LIST of {} failed: {}", path, e)))?;

        let entries = lines.iter().filter_map(|line| parse_list_line(line)).collect();

        if let Err(e) = stream.quit() {
            warn!("Failed to quit FTP session gracefully: {}", e);
        }

        Ok(entries)
    }
}

#[async_trait]
impl PdrSource for FtpSource {
    async fn list(&self, path: &str) -> Result<Vec<RemoteEntry>> {
        let entries = self.with_retry("LIST", path, Self::list_sync).await?;
        info!("Listed {} ({} entries)", path, entries.len());
        Ok(entries)
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let data = self.with_retry("RETR", path, Self::fetch_sync).await?;
        info!("Fetched {} ({} bytes)", path, data.len());
        Ok(data)
    }
}

/// Parse one Unix-style FTP LIST line
///
/// `-rw-r--r--   1 ftp ftp  1234 Jan 15 12:00 PDN.ID1611071307.PDR`
fn parse_list_line(line: &str) -> Option<RemoteEntry> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return None;
    }

    let is_directory = parts[0].starts_with('d');
    let name = parts.last()?.to_string();
    let size = if parts.len() >= 5 { parts[4].parse().ok() } else { None };

    Some(RemoteEntry {
        name,
        size,
        is_directory,
    })
}

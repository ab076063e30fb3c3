//! SDP Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling, logging bootstrap, and checksum algorithms for the
//! SDP workspace.
//!
//! # Overview
//!
//! This crate provides functionality used across all SDP workspace members:
//!
//! - **Error Handling**: the `SdpError` taxonomy and `Result` alias
//! - **Checksums**: streaming POSIX CKSUM and MD5 computation
//! - **Logging**: tracing subscriber initialization
//!
//! # Example
//!
//! ```no_run
//! use sdp_common::checksum::cksum_reader;
//! use sdp_common::Result;
//!
//! fn checksum_file(path: &str) -> Result<u32> {
//!     let mut file = std::fs::File::open(path)?;
//!     cksum_reader(&mut file)
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{Result, SdpError};

//! SDP Ingest
//!
//! Remote side of PDR processing: discovering manifests on a provider,
//! fetching their text, and validating the announced files against their
//! checksums. All provider protocols sit behind the [`PdrSource`] trait, so
//! discovery and validation never know whether bytes came over FTP, HTTP,
//! or an object store.

pub mod config;
pub mod discovery;
pub mod ftp;
pub mod http;
pub mod object_store;
pub mod source;
pub mod validate;

pub use config::{CollectionConfig, ProviderConfig};
pub use discovery::discover_pdrs;
pub use ftp::{FtpConfig, FtpSource};
pub use http::{HttpConfig, HttpSource};
pub use object_store::{S3Config, S3Source};
pub use source::{PdrSource, RemoteEntry};
pub use validate::{validate_granules, CheckStatus, FileCheck, ValidationSummary};

//! Domain types produced by a PDR parse

use sdp_common::checksum::ChecksumAlgorithm;
use serde::{Deserialize, Serialize};

/// Checksum type label from a FILE_SPEC
///
/// Known labels map to a supported algorithm; anything else is preserved
/// verbatim so the record round-trips, but validation will skip it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChecksumType {
    Cksum,
    Md5,
    Other(String),
}

impl ChecksumType {
    /// Parse a provider label, case-insensitively
    pub fn from_label(label: &str) -> Self {
        match ChecksumAlgorithm::from_label(label) {
            Some(ChecksumAlgorithm::Cksum) => ChecksumType::Cksum,
            Some(ChecksumAlgorithm::Md5) => ChecksumType::Md5,
            None => ChecksumType::Other(label.to_string()),
        }
    }

    /// The algorithm to verify with, if this label is recognized
    pub fn algorithm(&self) -> Option<ChecksumAlgorithm> {
        match self {
            ChecksumType::Cksum => Some(ChecksumAlgorithm::Cksum),
            ChecksumType::Md5 => Some(ChecksumAlgorithm::Md5),
            ChecksumType::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ChecksumType::Cksum => "CKSUM",
            ChecksumType::Md5 => "MD5",
            ChecksumType::Other(label) => label,
        }
    }
}

impl From<String> for ChecksumType {
    fn from(label: String) -> Self {
        ChecksumType::from_label(&label)
    }
}

impl From<ChecksumType> for String {
    fn from(value: ChecksumType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for ChecksumType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Checksum value from a FILE_SPEC: a bare number for CKSUM, a string for MD5
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChecksumValue {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for ChecksumValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChecksumValue::Number(n) => write!(f, "{}", n),
            ChecksumValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Manifest checksum for one file, always a complete type/value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChecksum {
    pub checksum_type: ChecksumType,
    pub value: ChecksumValue,
}

/// Role of a file within its granule, from the FILE_TYPE field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Data,
    Metadata,
    Browse,
    Qa,
}

impl FileType {
    /// Map a FILE_TYPE label to its role. Unknown labels are rejected by the
    /// extractor; this returns None for them.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "HDF" | "HDF-EOS" | "HDF5" | "SCIENCE" => Some(FileType::Data),
            "METADATA" | "MET" => Some(FileType::Metadata),
            "BROWSE" => Some(FileType::Browse),
            "QA" | "PRODHIST" => Some(FileType::Qa),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FileType::Data => "data",
            FileType::Metadata => "metadata",
            FileType::Browse => "browse",
            FileType::Qa => "qa",
        }
    }
}

/// Normalized record for one FILE_SPEC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Provider-side directory the file lives in
    pub directory: String,

    /// File name within the directory
    pub name: String,

    /// Announced size in bytes
    pub size_bytes: u64,

    /// Role of the file within the granule, when announced
    pub file_type: Option<FileType>,

    /// Manifest checksum; both halves present or neither
    pub checksum: Option<FileChecksum>,
}

/// One granule: the files that share a granule id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Granule {
    pub granule_id: String,

    /// DATA_TYPE from the enclosing FILE_GROUP, when announced
    pub data_type: Option<String>,

    /// DATA_VERSION from the enclosing FILE_GROUP, when announced
    pub data_version: Option<String>,

    /// NODE_NAME from the enclosing FILE_GROUP, when announced
    pub node_name: Option<String>,

    /// Sum of this granule's file sizes in bytes
    pub granule_size: u64,

    /// Files in manifest order; never empty
    pub files: Vec<FileRecord>,
}

/// Aggregated result of parsing one PDR
///
/// Immutable once built. The counts are accumulated while records are
/// attached, so they always agree with the granule list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Granules in first-seen order, unique by granule id
    pub granules: Vec<Granule>,

    /// Total files attached across all granules
    pub files_count: u64,

    /// Number of granules
    pub granules_count: u64,

    /// Total announced bytes across all files
    pub total_size_bytes: u64,

    /// Files dropped because the extraction regex did not match. Non-zero
    /// with zero granules usually means a misconfigured regex.
    pub skipped_files: u64,
}

//! Granule grouping
//!
//! File records become granules by running the collection's extraction regex
//! over each file name. Files that do not match are sidecars without a
//! granule id; they are dropped from the result but counted, so a regex typo
//! shows up as a large `skipped_files` instead of a silent empty success.

use crate::types::{FileRecord, Granule, ParseResult};
use regex::Regex;
use sdp_common::{Result, SdpError};
use std::collections::HashMap;
use tracing::debug;

/// Compiled granule-id-extraction regex
///
/// With capture groups, group 1 is the granule id; without, the entire match
/// is.
#[derive(Debug, Clone)]
pub struct GranuleIdExtractor {
    regex: Regex,
}

impl GranuleIdExtractor {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            SdpError::Config(format!("invalid granule id extraction regex: {}", e))
        })?;
        Ok(Self { regex })
    }

    /// Derive the granule id for a file name, or None when it does not match
    pub fn extract(&self, file_name: &str) -> Option<String> {
        let captures = self.regex.captures(file_name)?;
        captures
            .get(1)
            .or_else(|| captures.get(0))
            .map(|m| m.as_str().to_string())
    }
}

/// Per-collection extraction config, keyed by FILE_GROUP DATA_TYPE
///
/// Multi-collection PDRs announce granules of several data types in one
/// manifest, each with its own extraction regex.
#[derive(Debug, Clone, Default)]
pub struct CollectionRegistry {
    default: Option<GranuleIdExtractor>,
    by_data_type: HashMap<String, GranuleIdExtractor>,
}

impl CollectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a single extractor applied to every FILE_GROUP
    pub fn with_default(extractor: GranuleIdExtractor) -> Self {
        Self {
            default: Some(extractor),
            by_data_type: HashMap::new(),
        }
    }

    pub fn insert(&mut self, data_type: impl Into<String>, extractor: GranuleIdExtractor) {
        self.by_data_type.insert(data_type.into(), extractor);
    }

    /// Set the extractor used when no data-type-specific one matches
    pub fn set_default(&mut self, extractor: GranuleIdExtractor) {
        self.default = Some(extractor);
    }

    /// Find the extractor for a FILE_GROUP's data type
    pub fn resolve(&self, data_type: Option<&str>) -> Result<&GranuleIdExtractor> {
        data_type
            .and_then(|dt| self.by_data_type.get(dt))
            .or(self.default.as_ref())
            .ok_or_else(|| {
                SdpError::Config(format!(
                    "no granule id extraction configured for data type {}",
                    data_type.unwrap_or("<none>")
                ))
            })
    }
}

/// FILE_GROUP-level metadata carried onto each granule
#[derive(Debug, Clone, Default)]
pub(crate) struct GroupMeta {
    pub data_type: Option<String>,
    pub data_version: Option<String>,
    pub node_name: Option<String>,
}

/// Accumulates granules and summary counts in one pass
///
/// Counts are updated as each record is attached, never recomputed, so the
/// published totals cannot drift from the granule list.
#[derive(Debug, Default)]
pub(crate) struct ResultBuilder {
    granules: Vec<Granule>,
    index: HashMap<String, usize>,
    files_count: u64,
    total_size_bytes: u64,
    skipped_files: u64,
}

impl ResultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a record to its granule, creating the granule on first sight
    pub fn attach(&mut self, granule_id: String, meta: &GroupMeta, record: FileRecord) {
        let idx = match self.index.get(&granule_id) {
            Some(&idx) => idx,
            None => {
                self.granules.push(Granule {
                    granule_id: granule_id.clone(),
                    data_type: meta.data_type.clone(),
                    data_version: meta.data_version.clone(),
                    node_name: meta.node_name.clone(),
                    granule_size: 0,
                    files: Vec::new(),
                });
                self.index.insert(granule_id, self.granules.len() - 1);
                self.granules.len() - 1
            },
        };

        let granule = &mut self.granules[idx];
        granule.granule_size += record.size_bytes;
        self.files_count += 1;
        self.total_size_bytes += record.size_bytes;
        granule.files.push(record);
    }

    /// Drop a record whose name carries no granule id
    pub fn skip(&mut self, file_name: &str) {
        self.skipped_files += 1;
        debug!(file = %file_name, "File name does not match granule id extraction, skipping");
    }

    pub fn finish(self) -> ParseResult {
        ParseResult {
            granules_count: self.granules.len() as u64,
            granules: self.granules,
            files_count: self.files_count,
            total_size_bytes: self.total_size_bytes,
            skipped_files: self.skipped_files,
        }
    }
}

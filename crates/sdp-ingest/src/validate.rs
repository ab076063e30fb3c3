//! Granule file validation
//!
//! After a PDR is parsed, each announced file is fetched from the provider
//! and checked against its declared size and checksum. Files are checked
//! concurrently up to a caller-chosen limit; one bad file never stops the
//! others, it is recorded in the summary instead.

use crate::source::{join_remote, PdrSource};
use futures::stream::{self, StreamExt};
use sdp_common::checksum::{verify_async, ChecksumOutcome};
use sdp_parser::{ChecksumValue, FileRecord, Granule};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of checking one announced file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckStatus {
    Valid,
    /// Checksum did not match the manifest
    Invalid { expected: String, actual: String },
    /// Fetched byte count did not match FILE_SIZE
    SizeMismatch { expected: u64, actual: u64 },
    /// No checksum announced, or an unrecognized checksum type
    Skipped,
    /// The file could not be fetched or read
    Error { message: String },
}

/// One file's validation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCheck {
    pub granule_id: String,
    pub path: String,
    #[serde(flatten)]
    pub status: CheckStatus,
}

/// Tally of a validation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationSummary {
    pub checked: u64,
    pub valid: u64,
    pub invalid: u64,
    pub skipped: u64,
    pub errors: u64,
    /// Every non-valid, non-skipped check
    pub failures: Vec<FileCheck>,
}

impl ValidationSummary {
    pub fn all_valid(&self) -> bool {
        self.invalid == 0 && self.errors == 0
    }

    fn record(&mut self, check: FileCheck) {
        self.checked += 1;
        match &check.status {
            CheckStatus::Valid => {
                self.valid += 1;
                return;
            },
            CheckStatus::Skipped => {
                self.skipped += 1;
                return;
            },
            CheckStatus::Invalid { expected, actual } => {
                self.invalid += 1;
                warn!(
                    path = %check.path,
                    expected = %expected,
                    actual = %actual,
                    "Checksum mismatch"
                );
            },
            CheckStatus::SizeMismatch { expected, actual } => {
                self.invalid += 1;
                warn!(
                    path = %check.path,
                    expected = expected,
                    actual = actual,
                    "Size mismatch"
                );
            },
            CheckStatus::Error { message } => {
                self.errors += 1;
                warn!(path = %check.path, error = %message, "Validation failed");
            },
        }
        self.failures.push(check);
    }
}

/// Validate every file of every granule against the provider
///
/// `concurrency` bounds how many files are in flight at once.
pub async fn validate_granules(
    source: &dyn PdrSource,
    granules: &[Granule],
    concurrency: usize,
) -> ValidationSummary {
    let files: Vec<(String, String, &FileRecord)> = granules
        .iter()
        .flat_map(|granule| {
            granule.files.iter().map(|record| {
                (
                    granule.granule_id.clone(),
                    join_remote(&record.directory, &record.name),
                    record,
                )
            })
        })
        .collect();

    info!(
        "Validating {} files across {} granules (concurrency={})",
        files.len(),
        granules.len(),
        concurrency
    );

    let checks: Vec<FileCheck> = stream::iter(files)
        .map(|(granule_id, path, record)| async move {
            let status = check_file(source, &path, record).await;
            FileCheck {
                granule_id,
                path,
                status,
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut summary = ValidationSummary::default();
    for check in checks {
        summary.record(check);
    }

    info!(
        "Validation complete: {} valid, {} invalid, {} skipped, {} errors",
        summary.valid, summary.invalid, summary.skipped, summary.errors
    );
    summary
}

async fn check_file(source: &dyn PdrSource, path: &str, record: &FileRecord) -> CheckStatus {
    let Some(checksum) = &record.checksum else {
        debug!(path = %path, "No checksum announced, skipping");
        return CheckStatus::Skipped;
    };

    let Some(algorithm) = checksum.checksum_type.algorithm() else {
        debug!(
            path = %path,
            checksum_type = %checksum.checksum_type,
            "Unrecognized checksum type, skipping"
        );
        return CheckStatus::Skipped;
    };

    let bytes = match source.fetch(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return CheckStatus::Error {
                message: e.to_string(),
            }
        },
    };

    if bytes.len() as u64 != record.size_bytes {
        return CheckStatus::SizeMismatch {
            expected: record.size_bytes,
            actual: bytes.len() as u64,
        };
    }

    let expected = match &checksum.value {
        ChecksumValue::Number(n) => n.to_string(),
        ChecksumValue::Text(s) => s.clone(),
    };

    match verify_async(algorithm, &expected, &mut bytes.as_slice()).await {
        Ok(ChecksumOutcome::Valid) => CheckStatus::Valid,
        Ok(ChecksumOutcome::Invalid { expected, actual }) => {
            CheckStatus::Invalid { expected, actual }
        },
        Ok(ChecksumOutcome::Skipped) => CheckStatus::Skipped,
        Err(e) => CheckStatus::Error {
            message: e.to_string(),
        },
    }
}

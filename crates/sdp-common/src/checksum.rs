//! Checksum algorithms for file verification
//!
//! PDR manifests announce one checksum per file, either `CKSUM` (the POSIX
//! 32-bit CRC with a length-dependent finalization) or `MD5`. Both hashers
//! here are streaming: bytes are folded in as they arrive and nothing
//! requires the full file in memory.

use crate::error::{Result, SdpError};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Read buffer size for the checksum helpers
const CHUNK_SIZE: usize = 8192;

/// Checksum algorithm named in a PDR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChecksumAlgorithm {
    Cksum,
    Md5,
}

impl ChecksumAlgorithm {
    /// Match a provider's checksum-type label, case-insensitively
    pub fn from_label(label: &str) -> Option<Self> {
        if label.eq_ignore_ascii_case("CKSUM") {
            Some(ChecksumAlgorithm::Cksum)
        } else if label.eq_ignore_ascii_case("MD5") {
            Some(ChecksumAlgorithm::Md5)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChecksumAlgorithm::Cksum => write!(f, "CKSUM"),
            ChecksumAlgorithm::Md5 => write!(f, "MD5"),
        }
    }
}

/// Outcome of verifying one file against its manifest checksum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumOutcome {
    Valid,
    Invalid { expected: String, actual: String },
    /// No checksum in the manifest, or an unrecognized checksum type
    Skipped,
}

impl ChecksumOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ChecksumOutcome::Valid)
    }
}

/// Polynomial for the POSIX cksum CRC (MSB-first, unreflected)
const CKSUM_POLY: u32 = 0x04c1_1db7;

const CKSUM_TABLE: [u32; 256] = build_cksum_table();

const fn build_cksum_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ CKSUM_POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Streaming POSIX `cksum` state
///
/// Finalization appends the message length (least-significant octet first,
/// minimal octet count) to the CRC before complementing, which is what
/// distinguishes CKSUM from an ordinary CRC-32.
#[derive(Debug, Clone, Default)]
pub struct Cksum {
    crc: u32,
    len: u64,
}

impl Cksum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.crc = (self.crc << 8) ^ CKSUM_TABLE[(((self.crc >> 24) as u8) ^ byte) as usize];
        }
        self.len += data.len() as u64;
    }

    pub fn finalize(self) -> u32 {
        let mut crc = self.crc;
        let mut len = self.len;
        while len > 0 {
            let octet = (len & 0xff) as u8;
            len >>= 8;
            crc = (crc << 8) ^ CKSUM_TABLE[(((crc >> 24) as u8) ^ octet) as usize];
        }
        !crc
    }
}

/// Compute the POSIX cksum of any readable source
pub fn cksum_reader<R: Read>(reader: &mut R) -> Result<u32> {
    let mut hasher = Cksum::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}

/// Compute the lowercase-hex MD5 digest of any readable source
pub fn md5_reader<R: Read>(reader: &mut R) -> Result<String> {
    let mut context = md5::Context::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        context.consume(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", context.compute()))
}

/// Compute the POSIX cksum of an async byte stream
pub async fn cksum_async<R: AsyncRead + Unpin>(reader: &mut R) -> Result<u32> {
    let mut hasher = Cksum::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}

/// Compute the lowercase-hex MD5 digest of an async byte stream
pub async fn md5_async<R: AsyncRead + Unpin>(reader: &mut R) -> Result<String> {
    let mut context = md5::Context::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        context.consume(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", context.compute()))
}

/// Verify an async byte stream against a manifest checksum value
///
/// `expected` is the manifest's value rendered as a string: a decimal
/// integer for CKSUM, a hex digest for MD5 (compared case-insensitively).
pub async fn verify_async<R: AsyncRead + Unpin>(
    algorithm: ChecksumAlgorithm,
    expected: &str,
    reader: &mut R,
) -> Result<ChecksumOutcome> {
    let actual = match algorithm {
        ChecksumAlgorithm::Cksum => cksum_async(reader).await?.to_string(),
        ChecksumAlgorithm::Md5 => md5_async(reader).await?,
    };

    let matches = match algorithm {
        ChecksumAlgorithm::Cksum => actual == expected,
        ChecksumAlgorithm::Md5 => actual.eq_ignore_ascii_case(expected),
    };

    if matches {
        Ok(ChecksumOutcome::Valid)
    } else {
        Ok(ChecksumOutcome::Invalid {
            expected: expected.to_string(),
            actual,
        })
    }
}

/// Verify a local file against a manifest checksum value
pub async fn verify_file(
    path: impl AsRef<Path>,
    algorithm: ChecksumAlgorithm,
    expected: &str,
) -> Result<ChecksumOutcome> {
    let mut file = tokio::fs::File::open(path.as_ref()).await.map_err(|e| {
        SdpError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.as_ref().display(), e),
        ))
    })?;
    verify_async(algorithm, expected, &mut file).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    // Reference values from the coreutils cksum / md5sum tools.

    #[test]
    fn test_cksum_empty() {
        assert_eq!(Cksum::new().finalize(), 4294967295);
    }

    #[test]
    fn test_cksum_known_values() {
        let mut cursor = Cursor::new(b"123456789");
        assert_eq!(cksum_reader(&mut cursor).unwrap(), 930766865);

        let mut cursor = Cursor::new(b"hello world");
        assert_eq!(cksum_reader(&mut cursor).unwrap(), 1135714720);

        let mut cursor = Cursor::new(b"The quick brown fox jumps over the lazy dog");
        assert_eq!(cksum_reader(&mut cursor).unwrap(), 2074844392);
    }

    #[test]
    fn test_cksum_incremental_matches_oneshot() {
        let mut split = Cksum::new();
        split.update(b"hello ");
        split.update(b"world");

        let mut whole = Cksum::new();
        whole.update(b"hello world");

        assert_eq!(split.finalize(), whole.finalize());
    }

    #[test]
    fn test_md5_known_value() {
        let mut cursor = Cursor::new(b"hello world");
        assert_eq!(
            md5_reader(&mut cursor).unwrap(),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[test]
    fn test_algorithm_from_label() {
        assert_eq!(
            ChecksumAlgorithm::from_label("cksum"),
            Some(ChecksumAlgorithm::Cksum)
        );
        assert_eq!(
            ChecksumAlgorithm::from_label("Md5"),
            Some(ChecksumAlgorithm::Md5)
        );
        assert_eq!(ChecksumAlgorithm::from_label("SHA256"), None);
    }

    #[tokio::test]
    async fn test_verify_valid() {
        let mut reader = Cursor::new(b"hello world".to_vec());
        let outcome = verify_async(ChecksumAlgorithm::Cksum, "1135714720", &mut reader)
            .await
            .unwrap();
        assert_eq!(outcome, ChecksumOutcome::Valid);

        let mut reader = Cursor::new(b"hello world".to_vec());
        let outcome = verify_async(
            ChecksumAlgorithm::Md5,
            "5EB63BBBE01EEED093CB22BB8F5ACDC3",
            &mut reader,
        )
        .await
        .unwrap();
        assert_eq!(outcome, ChecksumOutcome::Valid);
    }

    #[tokio::test]
    async fn test_verify_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("granule.hdf");
        tokio::fs::write(&path, b"hello world").await.unwrap();

        let outcome = verify_file(&path, ChecksumAlgorithm::Cksum, "1135714720")
            .await
            .unwrap();
        assert_eq!(outcome, ChecksumOutcome::Valid);

        let missing = dir.path().join("missing.hdf");
        let err = verify_file(&missing, ChecksumAlgorithm::Md5, "00").await;
        assert!(matches!(err, Err(SdpError::Io(_))));
    }

    #[tokio::test]
    async fn test_verify_bit_flip_is_invalid() {
        // "hemlo" differs from "hello" by a single bit in the third byte
        let mut reader = Cursor::new(b"hemlo world".to_vec());
        let outcome = verify_async(ChecksumAlgorithm::Cksum, "1135714720", &mut reader)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ChecksumOutcome::Invalid {
                expected: "1135714720".to_string(),
                actual: "3273720263".to_string(),
            }
        );

        let mut reader = Cursor::new(b"hemlo world".to_vec());
        let outcome = verify_async(
            ChecksumAlgorithm::Md5,
            "5eb63bbbe01eeed093cb22bb8f5acdc3",
            &mut reader,
        )
        .await
        .unwrap();
        assert!(matches!(outcome, ChecksumOutcome::Invalid { .. }));
    }
}

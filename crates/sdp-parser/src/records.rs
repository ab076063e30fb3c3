//! FILE_SPEC record extraction
//!
//! Providers disagree on field names for the same concept, so every concept
//! resolves through a static synonym table. Directory, filename, and size are
//! required; checksum fields must come as a complete pair.

use crate::tree::Group;
use crate::types::{ChecksumType, ChecksumValue, FileChecksum, FileRecord, FileType};
use sdp_common::{Result, SdpError};
use tracing::warn;

/// Accepted field names per concept; first one present wins.
const DIRECTORY_FIELDS: &[&str] = &["DIRECTORY_ID", "DIRECTORY"];
const NAME_FIELDS: &[&str] = &["FILE_ID", "FILE_NAME"];
const SIZE_FIELDS: &[&str] = &["FILE_SIZE", "FILE_BYTES"];
const CKSUM_TYPE_FIELDS: &[&str] = &["FILE_CKSUM_TYPE", "CHECKSUM_TYPE"];
const CKSUM_VALUE_FIELDS: &[&str] = &["FILE_CKSUM_VALUE", "CHECKSUM"];

/// Convert one FILE_SPEC group into a normalized file record
pub fn extract_file_record(spec: &Group) -> Result<FileRecord> {
    if let Some(child) = spec.children.first() {
        return Err(SdpError::MalformedManifest {
            line: child.line,
            message: format!("unexpected OBJECT = {} inside FILE_SPEC", child.name),
        });
    }

    let directory = required(spec, DIRECTORY_FIELDS)?.text.clone();
    let name = required(spec, NAME_FIELDS)?.text.clone();

    let size_value = required(spec, SIZE_FIELDS)?;
    let size_bytes: u64 = size_value.text.parse().map_err(|_| SdpError::MalformedManifest {
        line: spec.line,
        message: format!(
            "{} is not a non-negative integer: {}",
            SIZE_FIELDS[0], size_value.text
        ),
    })?;

    let file_type = match spec.field(&["FILE_TYPE"]) {
        Some(value) => Some(
            FileType::from_label(&value.text)
                .ok_or_else(|| SdpError::InvalidFileType(value.text.clone()))?,
        ),
        None => None,
    };

    let checksum = extract_checksum(spec, &name)?;

    Ok(FileRecord {
        directory,
        name,
        size_bytes,
        file_type,
        checksum,
    })
}

fn required<'a>(spec: &'a Group, names: &[&str]) -> Result<&'a crate::tokenizer::Value> {
    spec.field(names).ok_or_else(|| SdpError::MissingRequiredField {
        field: names[0].to_string(),
    })
}

fn extract_checksum(spec: &Group, file_name: &str) -> Result<Option<FileChecksum>> {
    let type_field = spec.field(CKSUM_TYPE_FIELDS);
    let value_field = spec.field(CKSUM_VALUE_FIELDS);

    let (type_field, value_field) = match (type_field, value_field) {
        (None, None) => return Ok(None),
        (Some(_), None) => {
            return Err(SdpError::MissingRequiredField {
                field: CKSUM_VALUE_FIELDS[0].to_string(),
            })
        },
        (None, Some(_)) => {
            return Err(SdpError::MissingRequiredField {
                field: CKSUM_TYPE_FIELDS[0].to_string(),
            })
        },
        (Some(t), Some(v)) => (t, v),
    };

    let checksum_type = ChecksumType::from_label(&type_field.text);

    // PVL typing carries meaning here: CKSUM values are bare decimal
    // integers, MD5 values are strings. The reverse indicates a mangled
    // manifest.
    let value = match checksum_type {
        ChecksumType::Cksum => {
            if value_field.quoted {
                return Err(SdpError::InvalidChecksumValue {
                    checksum_type: "CKSUM".to_string(),
                    want: "number",
                    value: value_field.text.clone(),
                });
            }
            let number = value_field.text.parse::<u64>().map_err(|_| {
                SdpError::InvalidChecksumValue {
                    checksum_type: "CKSUM".to_string(),
                    want: "number",
                    value: value_field.text.clone(),
                }
            })?;
            ChecksumValue::Number(number)
        },
        ChecksumType::Md5 => {
            if !value_field.quoted && value_field.text.parse::<u64>().is_ok() {
                return Err(SdpError::InvalidChecksumValue {
                    checksum_type: "MD5".to_string(),
                    want: "string",
                    value: value_field.text.clone(),
                });
            }
            ChecksumValue::Text(value_field.text.clone())
        },
        ChecksumType::Other(ref label) => {
            // Not fatal: one provider's nonstandard label must not abort
            // discovery of every other file. The validator will skip it.
            warn!(
                file = %file_name,
                checksum_type = %label,
                "Unrecognized checksum type, validation will be skipped"
            );
            if !value_field.quoted && value_field.text.parse::<u64>().is_ok() {
                ChecksumValue::Number(value_field.text.parse::<u64>().unwrap_or_default())
            } else {
                ChecksumValue::Text(value_field.text.clone())
            }
        },
    };

    Ok(Some(FileChecksum {
        checksum_type,
        value,
    }))
}

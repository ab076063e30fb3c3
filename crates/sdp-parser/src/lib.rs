//! SDP PDR Parser
//!
//! Pure parsing core for Product Delivery Records: provider-published
//! manifests announcing a batch of files ready for retrieval. Raw manifest
//! text flows through the tokenizer, group builder, file record extractor,
//! and granule grouper into an aggregated [`ParseResult`].
//!
//! Every stage is a synchronous transformation with no I/O and no shared
//! state, so parses may run concurrently without coordination. How the
//! manifest text was fetched (FTP, HTTP, object store) is the `sdp-ingest`
//! crate's concern; this crate never sees a protocol.
//!
//! # Example
//!
//! ```
//! use sdp_parser::{parse_pdr, GranuleIdExtractor};
//!
//! let manifest = "\
//! OBJECT = FILE_GROUP;
//!   DATA_TYPE = MOD09GQ;
//!   OBJECT = FILE_SPEC;
//!     DIRECTORY_ID = /data;
//!     FILE_ID = G1.001.hdf;
//!     FILE_SIZE = 10;
//!   END_OBJECT = FILE_SPEC;
//! END_OBJECT = FILE_GROUP;
//! ";
//!
//! let extractor = GranuleIdExtractor::new(r"^(.*)\.hdf").unwrap();
//! let result = parse_pdr(manifest, &extractor).unwrap();
//! assert_eq!(result.granules_count, 1);
//! assert_eq!(result.granules[0].granule_id, "G1.001");
//! ```

pub mod granules;
pub mod records;
pub mod tokenizer;
pub mod tree;
pub mod types;

pub use granules::{CollectionRegistry, GranuleIdExtractor};
pub use types::{
    ChecksumType, ChecksumValue, FileChecksum, FileRecord, FileType, Granule, ParseResult,
};

use granules::{GroupMeta, ResultBuilder};
use sdp_common::{Result, SdpError};
use tokenizer::Tokenizer;
use tree::Group;

/// Parse a PDR with a single granule-id-extraction regex
pub fn parse_pdr(text: &str, extractor: &GranuleIdExtractor) -> Result<ParseResult> {
    parse_pdr_with_registry(
        text,
        &CollectionRegistry::with_default(extractor.clone()),
    )
}

/// Parse a PDR resolving the extraction regex per FILE_GROUP data type
///
/// A manifest with zero FILE_GROUP entries parses to an empty result: a
/// provider may legitimately announce no work.
pub fn parse_pdr_with_registry(
    text: &str,
    registry: &CollectionRegistry,
) -> Result<ParseResult> {
    let manifest = tree::build_tree(Tokenizer::new(text))?;
    let mut builder = ResultBuilder::new();

    for group in &manifest.groups {
        if group.name != "FILE_GROUP" {
            return Err(SdpError::MalformedManifest {
                line: group.line,
                message: format!("expected OBJECT = FILE_GROUP, found {}", group.name),
            });
        }

        let meta = group_meta(group);
        let extractor = registry.resolve(meta.data_type.as_deref())?;

        for spec in &group.children {
            if spec.name != "FILE_SPEC" {
                return Err(SdpError::MalformedManifest {
                    line: spec.line,
                    message: format!(
                        "expected OBJECT = FILE_SPEC inside FILE_GROUP, found {}",
                        spec.name
                    ),
                });
            }

            let record = records::extract_file_record(spec)?;
            match extractor.extract(&record.name) {
                Some(granule_id) => builder.attach(granule_id, &meta, record),
                None => builder.skip(&record.name),
            }
        }
    }

    Ok(builder.finish())
}

fn group_meta(group: &Group) -> GroupMeta {
    GroupMeta {
        data_type: group.field(&["DATA_TYPE"]).map(|v| v.text.clone()),
        data_version: group.field(&["DATA_VERSION"]).map(|v| v.text.clone()),
        node_name: group.field(&["NODE_NAME"]).map(|v| v.text.clone()),
    }
}

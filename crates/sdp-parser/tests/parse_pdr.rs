//! End-to-end parser tests against sample provider manifests

use sdp_common::SdpError;
use sdp_parser::{
    parse_pdr, parse_pdr_with_registry, ChecksumType, ChecksumValue, CollectionRegistry,
    FileType, GranuleIdExtractor, ParseResult,
};

const MOD09GQ_PDR: &str = include_str!("fixtures/MOD09GQ.PDR");

fn extractor(pattern: &str) -> GranuleIdExtractor {
    GranuleIdExtractor::new(pattern).unwrap()
}

fn assert_sums_hold(result: &ParseResult) {
    let files: u64 = result.granules.iter().map(|g| g.files.len() as u64).sum();
    let bytes: u64 = result
        .granules
        .iter()
        .flat_map(|g| &g.files)
        .map(|f| f.size_bytes)
        .sum();
    assert_eq!(result.files_count, files);
    assert_eq!(result.total_size_bytes, bytes);
    assert_eq!(result.granules_count, result.granules.len() as u64);
}

#[test]
fn parses_simple_pdr() {
    let result = parse_pdr(MOD09GQ_PDR, &extractor(r"^(.*)\.hdf")).unwrap();

    assert_eq!(result.files_count, 2);
    assert_eq!(result.granules_count, 1);
    assert_eq!(result.granules.len(), 1);
    assert_eq!(result.total_size_bytes, 17909733);
    assert_eq!(result.skipped_files, 0);
    assert_sums_hold(&result);

    let granule = &result.granules[0];
    assert_eq!(
        granule.granule_id,
        "MOD09GQ.A2017224.h09v02.006.2017227165020"
    );
    assert_eq!(granule.data_type.as_deref(), Some("MOD09GQ"));
    assert_eq!(granule.data_version.as_deref(), Some("006"));
    assert_eq!(granule.granule_size, 17909733);

    let hdf = granule
        .files
        .iter()
        .find(|f| f.name == "MOD09GQ.A2017224.h09v02.006.2017227165020.hdf")
        .unwrap();
    assert_eq!(hdf.directory, "/MODOPS/MODAPS/EDC/CUMULUS/FPROC/DATA");
    assert_eq!(hdf.size_bytes, 17865615);
    assert_eq!(hdf.file_type, Some(FileType::Data));
    let checksum = hdf.checksum.as_ref().unwrap();
    assert_eq!(checksum.checksum_type, ChecksumType::Cksum);
    assert_eq!(checksum.value, ChecksumValue::Number(4208254019));

    let met = granule
        .files
        .iter()
        .find(|f| f.name == "MOD09GQ.A2017224.h09v02.006.2017227165020.hdf.met")
        .unwrap();
    assert_eq!(met.directory, "/MODOPS/MODAPS/EDC/CUMULUS/FPROC/DATA");
    assert_eq!(met.size_bytes, 44118);
    assert_eq!(met.file_type, Some(FileType::Metadata));
    assert!(met.checksum.is_none());
}

#[test]
fn result_serializes_to_json() {
    let result = parse_pdr(MOD09GQ_PDR, &extractor(r"^(.*)\.hdf")).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["granules_count"], 1);
    assert_eq!(json["total_size_bytes"], 17909733);
    assert_eq!(json["granules"][0]["data_type"], "MOD09GQ");
    assert_eq!(json["granules"][0]["files"][0]["file_type"], "data");
    // CKSUM values stay numeric, MD5 digests stay strings
    assert_eq!(json["granules"][0]["files"][0]["checksum"]["value"], 4208254019u64);
}

#[test]
fn parsing_is_idempotent() {
    let ex = extractor(r"^(.*)\.hdf");
    let first = parse_pdr(MOD09GQ_PDR, &ex).unwrap();
    let second = parse_pdr(MOD09GQ_PDR, &ex).unwrap();
    assert_eq!(first, second);
}

#[test]
fn empty_manifest_is_valid() {
    let result = parse_pdr(
        "TOTAL_FILE_COUNT = 0;\nEXPIRATION_TIME = 2017-08-22T20:07:21;\n",
        &extractor(r"^(.*)\.hdf"),
    )
    .unwrap();

    assert!(result.granules.is_empty());
    assert_eq!(result.files_count, 0);
    assert_eq!(result.granules_count, 0);
    assert_eq!(result.total_size_bytes, 0);
}

#[test]
fn missing_end_object_fails_without_partial_result() {
    let truncated = MOD09GQ_PDR
        .rsplit_once("END_OBJECT = FILE_GROUP;")
        .map(|(head, _)| head)
        .unwrap();

    let err = parse_pdr(truncated, &extractor(r"^(.*)\.hdf")).unwrap_err();
    match err {
        SdpError::MalformedManifest { line, message } => {
            assert_eq!(line, 4);
            assert!(message.contains("FILE_GROUP"));
        },
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn regex_grouping_collects_sidecars_and_drops_non_matches() {
    let manifest = "\
OBJECT = FILE_GROUP;
  DATA_TYPE = TEST;
  OBJECT = FILE_SPEC;
    DIRECTORY_ID = /data;
    FILE_ID = G1.001.hdf;
    FILE_SIZE = 100;
  END_OBJECT = FILE_SPEC;
  OBJECT = FILE_SPEC;
    DIRECTORY_ID = /data;
    FILE_ID = G1.001.hdf.met;
    FILE_SIZE = 10;
  END_OBJECT = FILE_SPEC;
  OBJECT = FILE_SPEC;
    DIRECTORY_ID = /data;
    FILE_ID = README.txt;
    FILE_SIZE = 1;
  END_OBJECT = FILE_SPEC;
END_OBJECT = FILE_GROUP;
";

    let result = parse_pdr(manifest, &extractor(r"^(.*)\.hdf")).unwrap();

    assert_eq!(result.granules_count, 1);
    assert_eq!(result.granules[0].granule_id, "G1.001");
    assert_eq!(result.granules[0].files.len(), 2);
    assert_eq!(result.files_count, 2);
    assert_eq!(result.skipped_files, 1);
    assert!(result
        .granules[0]
        .files
        .iter()
        .all(|f| f.name != "README.txt"));
    assert_sums_hold(&result);
}

#[test]
fn multi_data_type_pdr_resolves_per_collection() {
    let manifest = "\
OBJECT = FILE_GROUP;
  DATA_TYPE = MOD09GQ;
  OBJECT = FILE_SPEC;
    DIRECTORY_ID = /data;
    FILE_ID = MOD09GQ.A2017224.hdf;
    FILE_SIZE = 100;
  END_OBJECT = FILE_SPEC;
END_OBJECT = FILE_GROUP;
OBJECT = FILE_GROUP;
  DATA_TYPE = MOD87GQ;
  OBJECT = FILE_SPEC;
    DIRECTORY_ID = /data;
    FILE_ID = PENS-MOD87GQ.A2017224.hdf;
    FILE_SIZE = 200;
  END_OBJECT = FILE_SPEC;
END_OBJECT = FILE_GROUP;
";

    let mut registry = CollectionRegistry::new();
    registry.insert("MOD09GQ", extractor(r"^(.*)\.hdf"));
    registry.insert("MOD87GQ", extractor(r"^PENS-(.*)\.hdf"));

    let result = parse_pdr_with_registry(manifest, &registry).unwrap();

    assert_eq!(result.granules_count, 2);
    assert_eq!(result.files_count, 2);
    assert_eq!(result.total_size_bytes, 300);
    assert_eq!(result.granules[0].granule_id, "MOD09GQ.A2017224");
    assert_eq!(result.granules[1].granule_id, "MOD87GQ.A2017224");
    assert_sums_hold(&result);
}

#[test]
fn unknown_data_type_without_default_is_config_error() {
    let manifest = "\
OBJECT = FILE_GROUP;
  DATA_TYPE = UNKNOWN;
  OBJECT = FILE_SPEC;
    DIRECTORY_ID = /data;
    FILE_ID = f.hdf;
    FILE_SIZE = 1;
  END_OBJECT = FILE_SPEC;
END_OBJECT = FILE_GROUP;
";

    let mut registry = CollectionRegistry::new();
    registry.insert("MOD09GQ", extractor(r"^(.*)\.hdf"));
    let err = parse_pdr_with_registry(manifest, &registry).unwrap_err();
    assert!(matches!(err, SdpError::Config(_)));
}

//! Tests for batch decoding from slices and files.

use std::io::{BufReader, Write};

use inovibe_frame::{BatchConfig, BatchDecoder, Payload};
use tempfile::NamedTempFile;

const FRAMES: &str = "\
# gateway export
0302f411150092100064003bff07ffe3016801044c01000101010c0102060301020223

030316641e009d520bc201040004000c6f
0303db5c1d00a2800a2604ff0fc2fe6dfef80fdafe8afee10fe3fe6afefb100ffe6cfee3100ffe80fee51007fe6cfeea0ff3fe78feec0fdefe72fed367
0402f411150092100064
0302f411150092100064003bff07ffe3016801044c01000101010c010206030102
  03031b641e009b500bb20402010255
";

/// Tests decoding a file of frames with comments and blank lines.
#[test]
fn test_decode_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(FRAMES.as_bytes()).unwrap();

    let reader = BufReader::new(file.reopen().unwrap());
    let mut decoder = BatchDecoder::new(BatchConfig::default());
    let frames = decoder.decode_reader(reader).unwrap();

    assert_eq!(frames.len(), 4);
    assert!(matches!(frames[0].payload, Payload::Alive(_)));
    assert!(matches!(frames[1].payload, Payload::Notice(_)));
    assert!(matches!(frames[2].payload, Payload::Wave(_)));
    assert!(matches!(frames[3].payload, Payload::Notice(_)));

    let stats = decoder.stats();
    assert_eq!(stats.total, 6);
    assert_eq!(stats.decoded, 4);
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.failures.get("unsupported_version"), Some(&1));
    assert_eq!(stats.failures.get("malformed_frame"), Some(&1));
    assert_eq!(stats.payload_types.get("notice"), Some(&2));
    assert_eq!(stats.payload_types.get("wave"), Some(&1));
}

/// Tests that checksum verification rejects corrupted frames.
#[test]
fn test_decode_file_with_checksum() {
    let mut decoder = BatchDecoder::new(BatchConfig {
        verify_checksum: true,
        ..BatchConfig::default()
    });
    let frames = decoder.decode_reader(FRAMES.as_bytes()).unwrap();

    // The truncated alive frame now fails its checksum before the payload is walked
    assert_eq!(frames.len(), 3);
    assert_eq!(decoder.stats().failures.get("invalid_checksum"), Some(&2));
    assert_eq!(decoder.stats().failures.get("malformed_frame"), None);
}

/// Tests that the stats serialize for reporting.
#[test]
fn test_stats_json() {
    let mut decoder = BatchDecoder::new(BatchConfig::default());
    decoder.decode_all(["030316641e009d520bc201040004000c6f", "zz"]);

    let json = serde_json::to_value(decoder.stats()).unwrap();
    assert_eq!(json["total"], 2);
    assert_eq!(json["failures"]["short_frame"], 1);
    assert_eq!(json["payload_types"]["notice"], 1);
}

/// Tests that decoding an empty input yields nothing.
#[test]
fn test_empty_input() {
    let mut decoder = BatchDecoder::new(BatchConfig::default());
    assert!(decoder.decode_reader("\n\n# nothing\n".as_bytes()).unwrap().is_empty());
    assert_eq!(decoder.stats().total, 0);
}

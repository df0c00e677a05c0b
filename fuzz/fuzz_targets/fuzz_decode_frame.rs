#![no_main]

use libfuzzer_sys::fuzz_target;
use inovibe_frame::FrameParser;

fuzz_target!(|data: &[u8]| {
    // Arbitrary text must never panic
    if let Ok(raw) = std::str::from_utf8(data) {
        if let Ok(parser) = FrameParser::new(raw) {
            let _ = parser.verify_checksum();
            if let Ok(frame) = parser.decode_header() {
                let _ = frame.payload();
                let _ = frame.payload_fields();
            }
        }
    }

    // Arbitrary bytes as a well-formed hex frame with a valid version byte
    if data.len() >= 9 {
        let mut raw = String::from("03");
        for byte in data {
            raw.push_str(&format!("{byte:02x}"));
        }
        if let Ok(parser) = FrameParser::new(&raw) {
            if let Ok(frame) = parser.decode_header() {
                let _ = frame.alive();
                let _ = frame.wave();
                let _ = frame.notice();
            }
        }
    }
});

#![no_main]

use libfuzzer_sys::fuzz_target;
use inovibe_frame::FrameSpec;

fuzz_target!(|data: &[u8]| {
    // Malformed or deeply nested spec documents must fail cleanly
    if let Ok(document) = std::str::from_utf8(data) {
        let _ = FrameSpec::from_json(document);
    }
});

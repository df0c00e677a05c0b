//! Tests for the logging helpers.

use inovibe_frame::logging::{init_logger, log_info, log_warn};
use inovibe_frame::util::logging::{log_frame_hex, span_frame_decode, LogThrottle};

/// Tests that the logging helpers do not panic after init.
#[test]
fn test_logging() {
    init_logger();
    log_warn("This is a warning message");
    log_info("This is an info message");
}

/// Tests that the logger can be initialized more than once.
#[test]
fn test_init_logger_twice() {
    init_logger();
    init_logger();
}

/// Tests the throttle from outside the crate, including its macro.
#[test]
fn test_throttled_macros() {
    let mut throttle = LogThrottle::new(60_000, 2);
    for i in 0..5 {
        inovibe_frame::log_warn_throttled!(throttle, "warning {i}");
    }
    inovibe_frame::log_error_throttled!(throttle, "one more");
    assert_eq!(throttle.suppressed(), 4);
}

/// Tests hex dumps and the decode span helper.
#[test]
fn test_frame_hex_and_span() {
    init_logger();
    log_frame_hex("Frame", &[0x03, 0x02, 0xf4]);
    let _span = span_frame_decode("alive");
}

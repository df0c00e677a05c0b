//! # Logging Helpers
//!
//! Rate limiting for per-frame warnings, bounded hex dumps of raw frames, and
//! optional tracing spans around a frame decode.
//!
//! A gateway can forward thousands of frames from a misconfigured device
//! fleet, all failing the same way. `LogThrottle` caps how many of those
//! warnings reach the log per time window.
//!
//! ## Usage
//!
//! ```rust
//! use inovibe_frame::util::logging::{log_frame_hex, LogThrottle};
//!
//! let mut throttle = LogThrottle::new(1000, 5); // 5 messages per second
//! if throttle.allow() {
//!     log::warn!("Frame rejected");
//! }
//!
//! log_frame_hex("Received frame", &[0x03, 0x02, 0xf4]);
//! ```

use std::time::Instant;

use serde::Serialize;

/// Window/cap rate limiter for log messages.
#[derive(Debug)]
pub struct LogThrottle {
    window_ms: u64,
    cap: u32,
    count: u32,
    suppressed: u64,
    t0: Instant,
}

impl LogThrottle {
    /// Allow at most `cap` messages per `window_ms` milliseconds.
    pub fn new(window_ms: u64, cap: u32) -> Self {
        Self {
            window_ms,
            cap,
            count: 0,
            suppressed: 0,
            t0: Instant::now(),
        }
    }

    /// Returns `true` if the next message may be logged.
    pub fn allow(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.t0).as_millis() as u64 > self.window_ms {
            self.t0 = now;
            self.count = 0;
        }

        self.count = self.count.saturating_add(1);
        let allowed = self.count <= self.cap;
        if !allowed {
            self.suppressed += 1;
        }
        allowed
    }

    /// Messages dropped since creation.
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    pub fn stats(&self) -> ThrottleStats {
        ThrottleStats {
            window_ms: self.window_ms,
            cap: self.cap,
            count: self.count,
            suppressed: self.suppressed,
            window_remaining_ms: self
                .window_ms
                .saturating_sub(self.t0.elapsed().as_millis() as u64),
        }
    }

    /// Start a new window immediately.
    pub fn reset(&mut self) {
        self.t0 = Instant::now();
        self.count = 0;
    }
}

/// Snapshot of a [`LogThrottle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThrottleStats {
    pub window_ms: u64,
    pub cap: u32,
    pub count: u32,
    pub suppressed: u64,
    pub window_remaining_ms: u64,
}

/// Log frame bytes in hex at debug level, truncated to 64 bytes.
pub fn log_frame_hex(prefix: &str, data: &[u8]) {
    const MAX_LOG_BYTES: usize = 64;

    if !log::log_enabled!(log::Level::Debug) {
        return;
    }

    let shown = &data[..data.len().min(MAX_LOG_BYTES)];
    let hex_str = crate::util::hex::encode_hex(shown);
    let suffix = if data.len() > MAX_LOG_BYTES {
        format!(" ... ({} bytes total)", data.len())
    } else {
        String::new()
    };

    log::debug!(target: "inovibe::frame", "{prefix}: {hex_str}{suffix}");
}

/// Span covering one frame decode.
#[cfg(feature = "tracing")]
pub fn span_frame_decode(payload_type: &str) -> tracing::Span {
    tracing::info_span!("frame_decode", payload_type = payload_type)
}

#[cfg(not(feature = "tracing"))]
pub fn span_frame_decode(_payload_type: &str) {}

/// Span covering a checksum check.
#[cfg(feature = "tracing")]
pub fn span_checksum(expected: u8, calculated: u8) -> tracing::Span {
    tracing::debug_span!("checksum", expected = expected, calculated = calculated)
}

#[cfg(not(feature = "tracing"))]
pub fn span_checksum(_expected: u8, _calculated: u8) {}

/// Log a warning through a [`LogThrottle`]
#[macro_export]
macro_rules! log_warn_throttled {
    ($throttle:expr, $($arg:tt)*) => {
        if $throttle.allow() {
            log::warn!($($arg)*);
        }
    };
}

/// Log an error through a [`LogThrottle`]
#[macro_export]
macro_rules! log_error_throttled {
    ($throttle:expr, $($arg:tt)*) => {
        if $throttle.allow() {
            log::error!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_throttle_basic() {
        let mut throttle = LogThrottle::new(1000, 3);

        assert!(throttle.allow());
        assert!(throttle.allow());
        assert!(throttle.allow());

        assert!(!throttle.allow());
        assert!(!throttle.allow());
        assert_eq!(throttle.suppressed(), 2);
    }

    #[test]
    fn test_log_throttle_reset() {
        let mut throttle = LogThrottle::new(1000, 2);
        assert!(throttle.allow());
        assert!(throttle.allow());
        assert!(!throttle.allow());

        throttle.reset();
        assert!(throttle.allow());
        assert!(throttle.allow());
        assert!(!throttle.allow());
    }

    #[test]
    fn test_log_throttle_zero_cap() {
        let mut throttle = LogThrottle::new(1000, 0);
        assert!(!throttle.allow());
        assert_eq!(throttle.suppressed(), 1);
    }

    #[test]
    fn test_throttle_stats() {
        let mut throttle = LogThrottle::new(1000, 5);
        throttle.allow();
        throttle.allow();

        let stats = throttle.stats();
        assert_eq!(stats.window_ms, 1000);
        assert_eq!(stats.cap, 5);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.suppressed, 0);
    }

    #[test]
    fn test_throttled_macro() {
        let mut throttle = LogThrottle::new(1000, 1);
        log_warn_throttled!(throttle, "first {}", 1);
        log_warn_throttled!(throttle, "second {}", 2);
        assert_eq!(throttle.suppressed(), 1);
    }

    #[test]
    fn test_log_frame_hex_long_input() {
        let data = vec![0xAB; 200];
        log_frame_hex("Long frame", &data);
    }
}

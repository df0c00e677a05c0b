//! # Batch Decoding
//!
//! Decodes a stream of frames, such as a gateway export, skipping frames
//! that fail and counting outcomes. Failure warnings are rate limited so a
//! fleet sending one bad firmware variant does not flood the log.
//!
//! ```rust
//! use inovibe_frame::batch::{BatchConfig, BatchDecoder};
//!
//! let mut decoder = BatchDecoder::new(BatchConfig::default());
//! let frames = decoder.decode_all([
//!     "030316641e009d520bc201040004000c6f",
//!     "0402f411150092100064",
//! ]);
//! assert_eq!(frames.len(), 1);
//! assert_eq!(decoder.stats().failed, 1);
//! ```

use std::collections::BTreeMap;
use std::io::BufRead;

use serde::Serialize;

use crate::error::FrameError;
use crate::frame::{DecodedFrame, FrameParser};
use crate::util::logging::{LogThrottle, ThrottleStats};
use crate::{log_error_throttled, log_warn_throttled};

/// Batch decoder settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Reject frames whose trailing checksum byte does not match
    pub verify_checksum: bool,
    /// Failure warning window in milliseconds
    pub warn_window_ms: u64,
    /// Failure warnings allowed per window
    pub warn_cap: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            verify_checksum: false,
            warn_window_ms: 1000,
            warn_cap: 5,
        }
    }
}

/// Outcome counters of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub total: u64,
    pub decoded: u64,
    pub failed: u64,
    /// Failures by [`FrameError::kind`]
    pub failures: BTreeMap<&'static str, u64>,
    /// Decoded frames by payload type
    pub payload_types: BTreeMap<&'static str, u64>,
}

#[derive(Debug)]
pub struct BatchDecoder {
    config: BatchConfig,
    throttle: LogThrottle,
    stats: BatchStats,
}

impl BatchDecoder {
    pub fn new(config: BatchConfig) -> Self {
        let throttle = LogThrottle::new(config.warn_window_ms, config.warn_cap);
        Self {
            config,
            throttle,
            stats: BatchStats::default(),
        }
    }

    /// Decodes one frame and records the outcome.
    pub fn decode(&mut self, raw: &str) -> Result<DecodedFrame, FrameError> {
        self.stats.total += 1;

        match self.decode_inner(raw) {
            Ok(frame) => {
                self.stats.decoded += 1;
                *self
                    .stats
                    .payload_types
                    .entry(frame.header.payload.kind.spec_key())
                    .or_insert(0) += 1;
                Ok(frame)
            }
            Err(e) => {
                self.stats.failed += 1;
                *self.stats.failures.entry(e.kind()).or_insert(0) += 1;
                if e.is_spec_defect() {
                    log_error_throttled!(self.throttle, "Frame spec defect while decoding {raw}: {e}");
                } else {
                    log_warn_throttled!(self.throttle, "Skipping frame {raw}: {e}");
                }
                Err(e)
            }
        }
    }

    /// Decodes every frame, keeping only the ones that succeed.
    pub fn decode_all<'r, I>(&mut self, frames: I) -> Vec<DecodedFrame>
    where
        I: IntoIterator<Item = &'r str>,
    {
        frames
            .into_iter()
            .filter_map(|raw| self.decode(raw).ok())
            .collect()
    }

    /// Decodes one frame per line. Blank lines and `#` comments are skipped.
    pub fn decode_reader<R: BufRead>(&mut self, reader: R) -> std::io::Result<Vec<DecodedFrame>> {
        let mut frames = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let raw = line.trim();
            if raw.is_empty() || raw.starts_with('#') {
                continue;
            }
            if let Ok(frame) = self.decode(raw) {
                frames.push(frame);
            }
        }
        Ok(frames)
    }

    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }

    /// Failure warnings dropped by the rate limiter.
    pub fn suppressed_warnings(&self) -> u64 {
        self.throttle.suppressed()
    }

    /// Current state of the failure warning rate limiter.
    pub fn throttle_stats(&self) -> ThrottleStats {
        self.throttle.stats()
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    fn decode_inner(&self, raw: &str) -> Result<DecodedFrame, FrameError> {
        let parser = FrameParser::new(raw)?;
        if self.config.verify_checksum {
            parser.verify_checksum()?;
        }
        let frame = parser.decode_header()?;
        let payload = frame.payload()?;
        Ok(DecodedFrame {
            header: frame.into_header(),
            payload,
        })
    }
}

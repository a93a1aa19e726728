//! Polling and capture configuration constants.
//!
//! The offset chain itself is external configuration (see `crate::offset`);
//! these are the fixed timing and sizing parameters of the capture pipeline.

/// Timing constants for the capture loop and pointer-chain cache.
pub mod timing {
    use std::time::Duration;

    /// Interval between combat log polls.
    pub const LOG_POLL_INTERVAL: Duration = Duration::from_secs(1);

    /// Back-off after a failed poll cycle (resolver or reader error).
    pub const ERROR_BACKOFF: Duration = Duration::from_secs(5);

    /// How long a resolved pointer-chain address stays valid before the
    /// chain is walked again. The log buffer address is stable for seconds
    /// at a time but moves across loads and zone transitions.
    pub const CHAIN_CACHE_VALIDITY: Duration = Duration::from_secs(5);
}

/// Sizing constants for the combat log ring buffer.
pub mod capture {
    /// Number of entry slots in the combat log ring buffer.
    pub const LOG_SLOT_COUNT: usize = 600;

    /// Bytes read per log entry payload. Lines are truncated at the
    /// sentence boundary, so over-reading is harmless.
    pub const LOG_TEXT_READ_SIZE: usize = 512;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_constants() {
        assert_eq!(timing::LOG_POLL_INTERVAL.as_secs(), 1);
        assert_eq!(timing::ERROR_BACKOFF.as_secs(), 5);
        assert_eq!(timing::CHAIN_CACHE_VALIDITY.as_secs(), 5);
    }

    #[test]
    fn test_capture_constants() {
        assert_eq!(capture::LOG_SLOT_COUNT, 600);
        assert_eq!(capture::LOG_TEXT_READ_SIZE, 512);
    }
}

//! Mock Timer implementation for testing

use crate::platform::{traits::TimerInterface, Result};

/// Mock Timer implementation
///
/// Uses simulated time: delays return at once and only advance a counter.
#[derive(Debug, Default)]
pub struct MockTimer {
    elapsed_ms: u64,
    delay_calls: u32,
}

impl MockTimer {
    /// Create a new mock timer at t = 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Total simulated time spent in delays
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Number of delays requested so far
    pub fn delay_calls(&self) -> u32 {
        self.delay_calls
    }
}

impl TimerInterface for MockTimer {
    fn delay_ms(&mut self, ms: u32) -> Result<()> {
        self.elapsed_ms += u64::from(ms);
        self.delay_calls += 1;
        Ok(())
    }
}

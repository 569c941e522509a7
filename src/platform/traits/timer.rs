//! Timer interface trait
//!
//! Blocking delays used to hold a signal line for the pulse duration.

use crate::platform::Result;

/// Timer interface trait
///
/// The vault is single-threaded and synchronous: a pulse blocks command
/// processing for its whole duration, so a blocking delay is all it needs.
pub trait TimerInterface {
    /// Block for at least `ms` milliseconds
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Timer(TimerError::InvalidDuration)` if the
    /// platform cannot honour the duration.
    fn delay_ms(&mut self, ms: u32) -> Result<()>;
}

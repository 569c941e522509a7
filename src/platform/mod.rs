//! Platform abstraction layer
//!
//! This module provides hardware abstraction for the persistent medium, the
//! signal lines, timing, and the serial channel. Board support crates
//! implement these traits; the store and dispatcher only see the traits.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{PlatformError, Result};
pub use traits::{EepromInterface, GpioInterface, TimerInterface, UartInterface};

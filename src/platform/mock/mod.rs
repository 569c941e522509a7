//! Mock platform implementation for testing
//!
//! This module provides mock implementations of platform traits that can be used
//! for unit testing without requiring actual hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Example
//!
//! ```
//! use escrow_vault::platform::mock::{MockEeprom, MockGpio, MockTimer};
//! use escrow_vault::vault::{RecordStore, SignalBank};
//!
//! let store = RecordStore::new(MockEeprom::new(), 0).unwrap();
//! let signals = SignalBank::new(MockGpio::new_output(), MockGpio::new_output(), MockTimer::new(), 500);
//! # let _ = (store, signals);
//! ```

#![cfg(any(test, feature = "mock"))]

mod eeprom;
mod gpio;
mod timer;
mod uart;

pub use eeprom::{MockEeprom, EEPROM_CAPACITY};
pub use gpio::MockGpio;
pub use timer::MockTimer;
pub use uart::MockUart;

//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod eeprom;
pub mod gpio;
pub mod timer;
pub mod uart;

// Re-export trait interfaces
pub use eeprom::EepromInterface;
pub use gpio::{GpioInterface, GpioMode};
pub use timer::TimerInterface;
pub use uart::{UartConfig, UartInterface};

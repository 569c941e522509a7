//! EEPROM interface trait
//!
//! This module defines the byte-addressable persistent medium that record slots
//! live on.

use crate::platform::Result;

/// EEPROM interface trait
///
/// Platform implementations must provide single-byte read and write; the
/// block accessors default to byte loops and may be overridden when the
/// hardware supports page access.
///
/// # Medium Characteristics
///
/// - Byte-addressable, no erase cycle required before writing
/// - Data is retained across power cycles
/// - Only single-byte writes are atomic. A power loss during [`put`] can
///   leave any prefix of `data` written
/// - Writes are blocking and durable on return
///
/// # Safety Invariants
///
/// - Only one owner per EEPROM instance (no concurrent access)
/// - Implementations must reject addresses at or beyond [`capacity`]
///
/// [`put`]: EepromInterface::put
/// [`capacity`]: EepromInterface::capacity
pub trait EepromInterface {
    /// Read one byte
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Eeprom(EepromError::InvalidAddress)` if address is out of bounds.
    fn read(&mut self, address: u32) -> Result<u8>;

    /// Write one byte
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Eeprom(EepromError::InvalidAddress)` if address is out of bounds.
    /// Returns `PlatformError::Eeprom(EepromError::WriteFailed)` if the write operation fails.
    fn write(&mut self, address: u32, value: u8) -> Result<()>;

    /// Read `buf.len()` bytes starting at `address`
    fn get(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        for (offset, byte) in buf.iter_mut().enumerate() {
            *byte = self.read(address + offset as u32)?;
        }
        Ok(())
    }

    /// Write `data` starting at `address`, in ascending address order
    fn put(&mut self, address: u32, data: &[u8]) -> Result<()> {
        for (offset, &byte) in data.iter().enumerate() {
            self.write(address + offset as u32, byte)?;
        }
        Ok(())
    }

    /// Total capacity in bytes
    fn capacity(&self) -> u32;
}

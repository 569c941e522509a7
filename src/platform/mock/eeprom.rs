//! Mock EEPROM implementation for testing
//!
//! Provides in-memory EEPROM simulation for unit tests.

use crate::platform::{error::EepromError, traits::EepromInterface, Result};
use core::cell::RefCell;
use std::vec::Vec;

/// EEPROM capacity (1 KB, same as ATmega328P)
pub const EEPROM_CAPACITY: u32 = 1024;

/// Mock EEPROM implementation
///
/// Simulates a byte-addressable EEPROM in memory. Supports:
/// - Read/write of single bytes and ranges
/// - Corruption injection and single-byte flips for integrity testing
/// - Per-address write counts for wear validation
/// - Power-loss simulation that tears the next `put`
/// - Write failure injection
///
/// # Example
///
/// ```
/// use escrow_vault::platform::mock::MockEeprom;
/// use escrow_vault::platform::traits::EepromInterface;
///
/// let mut eeprom = MockEeprom::new();
///
/// // Fresh parts read back blank
/// assert_eq!(eeprom.read(0).unwrap(), 0xFF);
///
/// eeprom.put(0x10, &[0xA5, 0x01]).unwrap();
/// let mut buf = [0u8; 2];
/// eeprom.get(0x10, &mut buf).unwrap();
/// assert_eq!(buf, [0xA5, 0x01]);
/// assert_eq!(eeprom.get_write_count(0x10), 1);
/// ```
#[derive(Debug)]
pub struct MockEeprom {
    /// EEPROM storage (initialized to 0xFF - blank state)
    storage: RefCell<Vec<u8>>,
    /// Write count per address
    write_counts: RefCell<Vec<u32>>,
    /// Simulated power loss flag
    power_loss: RefCell<bool>,
    /// Reject every write while set
    fail_writes: bool,
}

impl MockEeprom {
    /// Create a new blank mock EEPROM
    pub fn new() -> Self {
        Self::with_capacity(EEPROM_CAPACITY)
    }

    /// Create a blank mock EEPROM with a custom capacity
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            storage: RefCell::new(vec![0xFF; capacity as usize]),
            write_counts: RefCell::new(vec![0; capacity as usize]),
            power_loss: RefCell::new(false),
            fail_writes: false,
        }
    }

    /// Get EEPROM contents (for test verification)
    pub fn get_contents(&self, address: u32, len: usize) -> Vec<u8> {
        let storage = self.storage.borrow();
        storage[address as usize..(address as usize + len)].to_vec()
    }

    /// Inject corruption at address (for testing error recovery)
    ///
    /// Overwrites the range with a fixed pattern, bypassing write counts.
    pub fn inject_corruption(&mut self, address: u32, len: usize) {
        let mut storage = self.storage.borrow_mut();
        for i in 0..len {
            storage[address as usize + i] = 0xAA; // Corrupt pattern
        }
    }

    /// Invert every bit of one byte (for testing checksum coverage)
    pub fn flip_byte(&mut self, address: u32) {
        self.storage.borrow_mut()[address as usize] ^= 0xFF;
    }

    /// Get the number of writes to one address
    pub fn get_write_count(&self, address: u32) -> u32 {
        self.write_counts.borrow()[address as usize]
    }

    /// Get total write count across all addresses
    pub fn get_total_write_count(&self) -> u32 {
        self.write_counts.borrow().iter().sum()
    }

    /// Simulate power loss during next `put`
    ///
    /// The next range write will only store its first half, as if power
    /// dropped mid-operation.
    pub fn simulate_power_loss(&mut self) {
        *self.power_loss.borrow_mut() = true;
    }

    /// Make every write fail with `EepromError::WriteFailed` until cleared
    pub fn set_write_failure(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    fn check_range(&self, address: u32, len: usize) -> Result<()> {
        let end = address as usize + len;
        if end > self.storage.borrow().len() {
            return Err(EepromError::InvalidAddress.into());
        }
        Ok(())
    }
}

impl Default for MockEeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl EepromInterface for MockEeprom {
    fn read(&mut self, address: u32) -> Result<u8> {
        self.check_range(address, 1)?;
        Ok(self.storage.borrow()[address as usize])
    }

    fn write(&mut self, address: u32, value: u8) -> Result<()> {
        self.check_range(address, 1)?;
        if self.fail_writes {
            return Err(EepromError::WriteFailed.into());
        }
        self.storage.borrow_mut()[address as usize] = value;
        self.write_counts.borrow_mut()[address as usize] += 1;
        Ok(())
    }

    fn get(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        self.check_range(address, buf.len())?;
        let storage = self.storage.borrow();
        buf.copy_from_slice(&storage[address as usize..(address as usize + buf.len())]);
        Ok(())
    }

    fn put(&mut self, address: u32, data: &[u8]) -> Result<()> {
        self.check_range(address, data.len())?;

        // Simulate power loss (torn write)
        let write_len = if self.power_loss.replace(false) {
            data.len() / 2
        } else {
            data.len()
        };

        for (offset, &byte) in data[..write_len].iter().enumerate() {
            self.write(address + offset as u32, byte)?;
        }
        Ok(())
    }

    fn capacity(&self) -> u32 {
        self.storage.borrow().len() as u32
    }
}

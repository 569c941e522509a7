//! Slotted record store
//!
//! This module provides EEPROM-backed persistence of escrow records in a
//! fixed table of [`MAX_AUCTIONS`] slots.
//!
//! # Slot Table
//!
//! ```text
//! base + 0 * RECORD_SIZE   slot 0
//! base + 1 * RECORD_SIZE   slot 1
//! ...
//! base + 4 * RECORD_SIZE   slot 4
//! ```
//!
//! The id-to-slot mapping is not stored anywhere; it is rediscovered by a
//! linear scan on every lookup, so the slot contents are the only source of
//! truth.

use crate::platform::{error::EepromError, EepromInterface, PlatformError, Result};
use core::fmt;
use escrow_vault_core::record::{
    is_marked_occupied, AuctionId, KeyKind, Record, SlotContent, Token, MAX_AUCTIONS,
    RECORD_SIZE,
};

/// Index of a slot in the table (0..MAX_AUCTIONS)
pub type SlotIndex = usize;

/// Total bytes occupied by the slot table
pub const TABLE_SIZE: u32 = (MAX_AUCTIONS * RECORD_SIZE) as u32;

/// Errors from store updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// No slot holds this id and no free slot is left
    Full,
    /// The medium failed
    Platform(PlatformError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Full => write!(f, "record store full"),
            StoreError::Platform(e) => write!(f, "{}", e),
        }
    }
}

/// Result type for store updates
pub type StoreResult<T> = core::result::Result<T, StoreError>;

impl From<PlatformError> for StoreError {
    fn from(e: PlatformError) -> Self {
        StoreError::Platform(e)
    }
}

/// Result of resolving an id to a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// A valid record for the id
    Found { slot: SlotIndex, record: Record },
    /// No valid record, but an occupied slot with a failed checksum still
    /// carries this id in its raw id field
    Corrupt { slot: SlotIndex },
    /// No slot refers to the id
    Absent,
}

/// Record store over a byte-addressable medium
///
/// Owns its medium; independent instances (a real EEPROM, an in-memory mock)
/// can coexist.
///
/// # Example
///
/// ```
/// use escrow_vault::platform::mock::MockEeprom;
/// use escrow_vault::vault::RecordStore;
/// use escrow_vault_core::record::AuctionId;
///
/// let mut store = RecordStore::new(MockEeprom::new(), 0).unwrap();
/// let id = AuctionId::new("lot1").unwrap();
///
/// let slot = store.write_purchase_key(&id, &[0x42; 32]).unwrap();
/// let record = store.read_entry(slot).unwrap().into_record().unwrap();
/// assert_eq!(record.purchase_key(), Some(&[0x42; 32]));
/// ```
pub struct RecordStore<E: EepromInterface> {
    /// EEPROM interface
    eeprom: E,
    /// Medium address of slot 0
    base_address: u32,
}

impl<E: EepromInterface> RecordStore<E> {
    /// Create a record store over `eeprom` with slot 0 at `base_address`
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Eeprom(EepromError::InvalidAddress)` if the
    /// slot table does not fit in the medium.
    pub fn new(eeprom: E, base_address: u32) -> Result<Self> {
        let end = base_address
            .checked_add(TABLE_SIZE)
            .ok_or(EepromError::InvalidAddress)?;
        if end > eeprom.capacity() {
            crate::log_error!(
                "Slot table 0x{:X}..0x{:X} exceeds medium capacity {}",
                base_address,
                end,
                eeprom.capacity()
            );
            return Err(EepromError::InvalidAddress.into());
        }

        Ok(Self {
            eeprom,
            base_address,
        })
    }

    /// Medium address of a slot
    pub fn slot_address(&self, slot: SlotIndex) -> u32 {
        self.base_address + (slot * RECORD_SIZE) as u32
    }

    fn read_raw(&mut self, slot: SlotIndex) -> Result<[u8; RECORD_SIZE]> {
        if slot >= MAX_AUCTIONS {
            return Err(EepromError::InvalidAddress.into());
        }
        let mut buf = [0u8; RECORD_SIZE];
        self.eeprom.get(self.slot_address(slot), &mut buf)?;
        Ok(buf)
    }

    /// Read and validate one slot
    ///
    /// Returns an owned copy. Only [`SlotContent::Valid`] carries a record;
    /// free and corrupt slots carry nothing that may be trusted.
    pub fn read_entry(&mut self, slot: SlotIndex) -> Result<SlotContent> {
        let buf = self.read_raw(slot)?;
        Ok(SlotContent::decode(&buf))
    }

    /// Find the slot holding a valid record for `id`
    ///
    /// Absence is a normal `Ok(None)`, not an error.
    pub fn find_slot_by_auction(&mut self, id: &AuctionId) -> Result<Option<SlotIndex>> {
        Ok(self.find_valid(id)?.map(|(slot, _)| slot))
    }

    fn find_valid(&mut self, id: &AuctionId) -> Result<Option<(SlotIndex, Record)>> {
        for slot in 0..MAX_AUCTIONS {
            if let SlotContent::Valid(record) = self.read_entry(slot)? {
                if record.id == *id {
                    crate::log_trace!("Auction {} found in slot {}", id, slot);
                    return Ok(Some((slot, record)));
                }
            }
        }
        Ok(None)
    }

    /// Resolve `id` to a valid record, a corrupt slot, or nothing
    ///
    /// A valid record always wins over a corrupt slot carrying the same id.
    pub fn lookup(&mut self, id: &AuctionId) -> Result<Lookup> {
        let mut corrupt = None;

        for slot in 0..MAX_AUCTIONS {
            match self.read_entry(slot)? {
                SlotContent::Valid(record) if record.id == *id => {
                    return Ok(Lookup::Found { slot, record });
                }
                SlotContent::Corrupt { id: Some(raw_id) } if raw_id == *id => {
                    corrupt.get_or_insert(slot);
                }
                _ => {}
            }
        }

        match corrupt {
            Some(slot) => {
                crate::log_warn!("Auction {} only present in corrupt slot {}", id, slot);
                Ok(Lookup::Corrupt { slot })
            }
            None => Ok(Lookup::Absent),
        }
    }

    /// Find the first slot whose status marker says free
    ///
    /// Only the marker is checked: an unoccupied slot with garbage in its
    /// other bytes is reusable, while an occupied slot with a failed
    /// checksum is not.
    pub fn find_free_slot(&mut self) -> Result<Option<SlotIndex>> {
        for slot in 0..MAX_AUCTIONS {
            let mut status = [0u8; 1];
            self.eeprom.get(self.slot_address(slot), &mut status)?;
            if !is_marked_occupied(&status) {
                return Ok(Some(slot));
            }
        }
        Ok(None)
    }

    /// Set the item key for `id`, creating or merging
    pub fn write_item_key(&mut self, id: &AuctionId, token: &Token) -> StoreResult<SlotIndex> {
        self.write_key(id, KeyKind::Item, token)
    }

    /// Set the purchase key for `id`, creating or merging
    pub fn write_purchase_key(
        &mut self,
        id: &AuctionId,
        token: &Token,
    ) -> StoreResult<SlotIndex> {
        self.write_key(id, KeyKind::Purchase, token)
    }

    /// Set one key for `id`
    ///
    /// An existing valid record for `id` is updated in place, preserving the
    /// other key. Otherwise a fresh record is written to the first free slot.
    /// The slot is written front to back, so the checksum lands last.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Full`] if `id` has no slot and none is free
    /// - [`StoreError::Platform`] if the medium fails
    pub fn write_key(
        &mut self,
        id: &AuctionId,
        kind: KeyKind,
        token: &Token,
    ) -> StoreResult<SlotIndex> {
        let (slot, mut record) = match self.find_valid(id)? {
            Some(existing) => existing,
            None => match self.find_free_slot()? {
                Some(slot) => {
                    crate::log_info!("Allocating slot {} for auction {}", slot, id);
                    (slot, Record::new(id.clone()))
                }
                None => {
                    crate::log_warn!("No free slot for auction {}", id);
                    return Err(StoreError::Full);
                }
            },
        };

        record.set_key(kind, token);
        let bytes = record.to_bytes();
        self.eeprom.put(self.slot_address(slot), &bytes)?;

        crate::log_info!(
            "Slot {} updated: auction={} item={} purchase={}",
            slot,
            id,
            record.has_item_key(),
            record.has_purchase_key()
        );
        Ok(slot)
    }

    /// Zero every byte of a slot, including its checksum
    ///
    /// Idempotent: erasing a free slot is harmless.
    pub fn erase_slot(&mut self, slot: SlotIndex) -> Result<()> {
        if slot >= MAX_AUCTIONS {
            return Err(EepromError::InvalidAddress.into());
        }
        self.eeprom
            .put(self.slot_address(slot), &[0u8; RECORD_SIZE])?;
        crate::log_info!("Slot {} erased", slot);
        Ok(())
    }

    /// Erase every slot, returning the store to its empty state
    pub fn reset_all(&mut self) -> Result<()> {
        for slot in 0..MAX_AUCTIONS {
            self.erase_slot(slot)?;
        }
        crate::log_info!("All {} slots erased", MAX_AUCTIONS);
        Ok(())
    }

    /// All valid records, in slot order
    pub fn entries(&mut self) -> Result<heapless::Vec<(SlotIndex, Record), MAX_AUCTIONS>> {
        let mut entries = heapless::Vec::new();
        for slot in 0..MAX_AUCTIONS {
            if let SlotContent::Valid(record) = self.read_entry(slot)? {
                // At most MAX_AUCTIONS entries, so push cannot fail
                let _ = entries.push((slot, record));
            }
        }
        Ok(entries)
    }

    /// Get EEPROM interface reference (for testing)
    pub fn eeprom_mut(&mut self) -> &mut E {
        &mut self.eeprom
    }
}

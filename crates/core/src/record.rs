//! Escrow record format for slot storage
//!
//! This module defines the binary layout of one record slot. Each slot holds
//! a status marker, key-presence flags, the auction id, both tokens, and a
//! trailing CRC-16 over everything before it.
//!
//! # Slot Layout
//!
//! ```text
//! offset  size  field
//!      0     1  status marker (0xA5 = occupied)
//!      1     1  key flags
//!      2    12  auction id, ASCII, NUL-padded
//!     14    32  item key
//!     46    32  purchase key
//!     78     2  CRC-16 over bytes 0..78 (little-endian)
//! ```

use crate::checksum::{calculate_crc16, validate_crc16};
use crate::error::IdError;
use bitflags::bitflags;
use heapless::String;

/// Number of record slots in the store
pub const MAX_AUCTIONS: usize = 5;

/// Length of a secret token in bytes
pub const TOKEN_LEN: usize = 32;

/// Size of the stored id field, including the terminating NUL
pub const ID_FIELD_LEN: usize = 12;

/// Maximum number of id characters kept after truncation
pub const MAX_ID_LEN: usize = ID_FIELD_LEN - 1;

/// Status marker for an occupied slot
///
/// Any other value means the slot is free. Both zeroed and factory-blank
/// (0xFF) storage therefore read as free.
pub const SLOT_OCCUPIED: u8 = 0xA5;

const STATUS_OFFSET: usize = 0;
const FLAGS_OFFSET: usize = 1;
const ID_OFFSET: usize = 2;
const ITEM_KEY_OFFSET: usize = ID_OFFSET + ID_FIELD_LEN;
const PURCHASE_KEY_OFFSET: usize = ITEM_KEY_OFFSET + TOKEN_LEN;
const CRC_OFFSET: usize = PURCHASE_KEY_OFFSET + TOKEN_LEN;

/// Size of the CRC-16 field (2 bytes)
pub const CRC_SIZE: usize = 2;

/// Serialized size of one slot
pub const RECORD_SIZE: usize = CRC_OFFSET + CRC_SIZE;

/// Fixed-length secret token
pub type Token = [u8; TOKEN_LEN];

bitflags! {
    /// Which secrets a record currently holds
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KeyFlags: u8 {
        /// Item key has been set
        const ITEM_KEY = 0b0000_0001;
        /// Purchase key has been set
        const PURCHASE_KEY = 0b0000_0010;
    }
}

/// Which of the two secrets an update targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Key that releases the physical object
    Item,
    /// Key a buyer presents to trigger release
    Purchase,
}

impl KeyKind {
    /// Presence flag for this key
    pub fn flag(self) -> KeyFlags {
        match self {
            KeyKind::Item => KeyFlags::ITEM_KEY,
            KeyKind::Purchase => KeyFlags::PURCHASE_KEY,
        }
    }
}

/// Auction identifier as stored in a slot
///
/// Printable ASCII without the `:` delimiter, at most [`MAX_ID_LEN`]
/// characters. Longer input is truncated on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionId(String<MAX_ID_LEN>);

impl AuctionId {
    /// Create an id, truncating to [`MAX_ID_LEN`] characters
    ///
    /// # Errors
    ///
    /// - [`IdError::Empty`] for an empty id
    /// - [`IdError::InvalidCharacter`] for non-printable or non-ASCII bytes,
    ///   or a `:` which would break the response framing
    pub fn new(id: &str) -> Result<Self, IdError> {
        if id.is_empty() {
            return Err(IdError::Empty);
        }
        if !id.bytes().all(is_id_byte) {
            return Err(IdError::InvalidCharacter);
        }

        // All bytes are ASCII, so any byte index is a char boundary
        let kept = &id[..id.len().min(MAX_ID_LEN)];
        let mut inner = String::new();
        inner
            .push_str(kept)
            .map_err(|_| IdError::InvalidCharacter)?;
        Ok(Self(inner))
    }

    /// Returns `true` if `id` is longer than what a slot can hold
    pub fn exceeds_max_len(id: &str) -> bool {
        id.len() > MAX_ID_LEN
    }

    /// Id as a string slice
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn to_field(&self) -> [u8; ID_FIELD_LEN] {
        let mut field = [0u8; ID_FIELD_LEN];
        let bytes = self.0.as_bytes();
        field[..bytes.len()].copy_from_slice(bytes);
        field
    }

    fn from_field(field: &[u8]) -> Option<Self> {
        let end = field
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(field.len());
        if end > MAX_ID_LEN {
            return None;
        }
        let text = core::str::from_utf8(&field[..end]).ok()?;
        Self::new(text).ok()
    }
}

impl core::fmt::Display for AuctionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_id_byte(b: u8) -> bool {
    b.is_ascii_graphic() && b != b':'
}

/// One auction's escrow state
///
/// Always an owned value: reading a slot yields a fresh `Record`, never a
/// view into shared storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Auction id
    pub id: AuctionId,
    /// Which keys are present
    pub flags: KeyFlags,
    item_key: Token,
    purchase_key: Token,
}

impl Record {
    /// Create an empty record with no keys set
    pub fn new(id: AuctionId) -> Self {
        Self {
            id,
            flags: KeyFlags::empty(),
            item_key: [0; TOKEN_LEN],
            purchase_key: [0; TOKEN_LEN],
        }
    }

    /// Item key, if set
    pub fn item_key(&self) -> Option<&Token> {
        self.flags
            .contains(KeyFlags::ITEM_KEY)
            .then_some(&self.item_key)
    }

    /// Purchase key, if set
    pub fn purchase_key(&self) -> Option<&Token> {
        self.flags
            .contains(KeyFlags::PURCHASE_KEY)
            .then_some(&self.purchase_key)
    }

    pub fn has_item_key(&self) -> bool {
        self.flags.contains(KeyFlags::ITEM_KEY)
    }

    pub fn has_purchase_key(&self) -> bool {
        self.flags.contains(KeyFlags::PURCHASE_KEY)
    }

    /// Set one key, leaving the other key and its flag untouched
    pub fn set_key(&mut self, kind: KeyKind, token: &Token) {
        match kind {
            KeyKind::Item => self.item_key = *token,
            KeyKind::Purchase => self.purchase_key = *token,
        }
        self.flags.insert(kind.flag());
    }

    /// Compare a presented token against the purchase key
    ///
    /// Returns `false` when no purchase key is set. The comparison visits
    /// every byte regardless of where the first difference is.
    pub fn purchase_key_matches(&self, candidate: &Token) -> bool {
        match self.purchase_key() {
            Some(stored) => tokens_equal(stored, candidate),
            None => false,
        }
    }

    /// Serialize to slot bytes, CRC computed over the finished prefix
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[STATUS_OFFSET] = SLOT_OCCUPIED;
        buf[FLAGS_OFFSET] = self.flags.bits();
        buf[ID_OFFSET..ITEM_KEY_OFFSET].copy_from_slice(&self.id.to_field());
        if self.has_item_key() {
            buf[ITEM_KEY_OFFSET..PURCHASE_KEY_OFFSET].copy_from_slice(&self.item_key);
        }
        if self.has_purchase_key() {
            buf[PURCHASE_KEY_OFFSET..CRC_OFFSET].copy_from_slice(&self.purchase_key);
        }

        let crc = calculate_crc16(&buf[..CRC_OFFSET]);
        buf[CRC_OFFSET..].copy_from_slice(&crc.to_le_bytes());
        buf
    }
}

fn tokens_equal(a: &Token, b: &Token) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Decoded state of one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotContent {
    /// Status marker says the slot is free
    Free,
    /// Marked occupied but failed validation
    ///
    /// `id` is a best-effort read of the raw id field, for addressing the
    /// slot by name. Nothing else from a corrupt slot is exposed.
    Corrupt { id: Option<AuctionId> },
    /// Marked occupied with a matching checksum
    Valid(Record),
}

impl SlotContent {
    /// Decode raw slot bytes
    pub fn decode(buf: &[u8; RECORD_SIZE]) -> Self {
        if !is_marked_occupied(buf) {
            return SlotContent::Free;
        }

        let raw_id = AuctionId::from_field(&buf[ID_OFFSET..ITEM_KEY_OFFSET]);
        let stored_crc = u16::from_le_bytes([buf[CRC_OFFSET], buf[CRC_OFFSET + 1]]);
        if !validate_crc16(&buf[..CRC_OFFSET], stored_crc) {
            return SlotContent::Corrupt { id: raw_id };
        }

        let (Some(id), Some(flags)) = (raw_id.clone(), KeyFlags::from_bits(buf[FLAGS_OFFSET]))
        else {
            return SlotContent::Corrupt { id: raw_id };
        };

        let mut record = Record::new(id);
        record.flags = flags;
        record
            .item_key
            .copy_from_slice(&buf[ITEM_KEY_OFFSET..PURCHASE_KEY_OFFSET]);
        record
            .purchase_key
            .copy_from_slice(&buf[PURCHASE_KEY_OFFSET..CRC_OFFSET]);
        SlotContent::Valid(record)
    }

    /// The record, if the slot is valid
    pub fn into_record(self) -> Option<Record> {
        match self {
            SlotContent::Valid(record) => Some(record),
            _ => None,
        }
    }
}

/// Raw occupied test on the status marker alone, without CRC validation
pub fn is_marked_occupied(buf: &[u8]) -> bool {
    buf.get(STATUS_OFFSET) == Some(&SLOT_OCCUPIED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(s: &str) -> AuctionId {
        AuctionId::new(s).unwrap()
    }

    #[test]
    fn test_record_size() {
        assert_eq!(RECORD_SIZE, 80);
        assert_eq!(CRC_OFFSET, 78);
    }

    #[test]
    fn test_auction_id_validation() {
        assert_eq!(AuctionId::new(""), Err(IdError::Empty));
        assert_eq!(AuctionId::new("lot 1"), Err(IdError::InvalidCharacter));
        assert_eq!(AuctionId::new("lot:1"), Err(IdError::InvalidCharacter));
        assert_eq!(AuctionId::new("lötté"), Err(IdError::InvalidCharacter));
        assert_eq!(id("lot1").as_str(), "lot1");
    }

    #[test]
    fn test_auction_id_truncation() {
        let long = "auction-000123456";
        assert!(AuctionId::exceeds_max_len(long));
        assert_eq!(id(long).as_str(), "auction-000");
        assert_eq!(id(long), id("auction-000999"));
        assert!(!AuctionId::exceeds_max_len("auction-000"));
    }

    #[test]
    fn test_empty_record_has_no_keys() {
        let record = Record::new(id("lot1"));
        assert!(!record.has_item_key());
        assert!(!record.has_purchase_key());
        assert_eq!(record.item_key(), None);
        assert_eq!(record.purchase_key(), None);
    }

    #[test]
    fn test_set_key_merges() {
        let mut record = Record::new(id("lot1"));
        record.set_key(KeyKind::Purchase, &[0xBB; TOKEN_LEN]);
        record.set_key(KeyKind::Item, &[0xAA; TOKEN_LEN]);

        assert_eq!(record.item_key(), Some(&[0xAA; TOKEN_LEN]));
        assert_eq!(record.purchase_key(), Some(&[0xBB; TOKEN_LEN]));

        record.set_key(KeyKind::Purchase, &[0xCC; TOKEN_LEN]);
        assert_eq!(record.item_key(), Some(&[0xAA; TOKEN_LEN]));
        assert_eq!(record.purchase_key(), Some(&[0xCC; TOKEN_LEN]));
    }

    #[test]
    fn test_purchase_key_matches() {
        let mut record = Record::new(id("lot1"));
        assert!(!record.purchase_key_matches(&[0; TOKEN_LEN]));

        record.set_key(KeyKind::Purchase, &[0x42; TOKEN_LEN]);
        assert!(record.purchase_key_matches(&[0x42; TOKEN_LEN]));

        let mut wrong = [0x42; TOKEN_LEN];
        wrong[TOKEN_LEN - 1] = 0x43;
        assert!(!record.purchase_key_matches(&wrong));
    }

    #[test]
    fn test_decode_written_record() {
        let mut record = Record::new(id("lot1"));
        record.set_key(KeyKind::Item, &[0x11; TOKEN_LEN]);

        let bytes = record.to_bytes();
        assert_eq!(bytes[0], SLOT_OCCUPIED);
        assert_eq!(SlotContent::decode(&bytes), SlotContent::Valid(record));
    }

    #[test]
    fn test_zeroed_and_blank_slots_are_free() {
        assert_eq!(SlotContent::decode(&[0x00; RECORD_SIZE]), SlotContent::Free);
        assert_eq!(SlotContent::decode(&[0xFF; RECORD_SIZE]), SlotContent::Free);
        assert!(!is_marked_occupied(&[0x00; RECORD_SIZE]));
    }

    #[test]
    fn test_corrupt_slot_keeps_raw_id() {
        let mut record = Record::new(id("lot7"));
        record.set_key(KeyKind::Purchase, &[0x22; TOKEN_LEN]);
        let mut bytes = record.to_bytes();
        bytes[PURCHASE_KEY_OFFSET + 3] ^= 0x10;

        assert_eq!(
            SlotContent::decode(&bytes),
            SlotContent::Corrupt {
                id: Some(id("lot7"))
            }
        );
    }

    #[test]
    fn test_unknown_flag_bits_are_corrupt() {
        let mut bytes = Record::new(id("lot1")).to_bytes();
        bytes[FLAGS_OFFSET] = 0x80;
        let crc = calculate_crc16(&bytes[..CRC_OFFSET]);
        bytes[CRC_OFFSET..].copy_from_slice(&crc.to_le_bytes());

        assert!(matches!(
            SlotContent::decode(&bytes),
            SlotContent::Corrupt { .. }
        ));
    }

    proptest! {
        #[test]
        fn prop_round_trip(name in "[A-Za-z0-9_-]{1,11}", item in any::<[u8; 32]>(), purchase in any::<[u8; 32]>()) {
            let mut record = Record::new(id(&name));
            record.set_key(KeyKind::Purchase, &purchase);
            record.set_key(KeyKind::Item, &item);

            let decoded = SlotContent::decode(&record.to_bytes()).into_record().unwrap();
            prop_assert_eq!(decoded.purchase_key(), Some(&purchase));
            prop_assert_eq!(decoded.item_key(), Some(&item));
            prop_assert_eq!(decoded.id.as_str(), name.as_str());
        }

        #[test]
        fn prop_single_byte_change_is_detected(
            key in any::<[u8; 32]>(),
            offset in 0..RECORD_SIZE,
            mask in 1u8..=255,
        ) {
            let mut record = Record::new(id("lot1"));
            record.set_key(KeyKind::Purchase, &key);
            let mut bytes = record.to_bytes();
            bytes[offset] ^= mask;

            prop_assert!(!matches!(SlotContent::decode(&bytes), SlotContent::Valid(_)));
        }
    }
}

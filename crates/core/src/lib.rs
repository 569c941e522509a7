//! escrow_vault_core - Pure no_std record format and protocol for escrow_vault
//!
//! This crate contains platform-agnostic algorithms and types
//! that can be tested on host without any feature flags or HAL dependencies.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies outside tests
//! - **Owned values**: Decoded records are copies, never views into storage
//!
//! # Modules
//!
//! - [`checksum`]: CRC-16/CCITT-FALSE slot checksum
//! - [`codec`]: Hex encoding of 32-byte tokens
//! - [`record`]: Slot layout, record type, auction ids
//! - [`protocol`]: Command grammar and response rendering
//! - [`error`]: Decode and parse errors

#![cfg_attr(not(test), no_std)]

pub mod checksum;
pub mod codec;
pub mod error;
pub mod protocol;
pub mod record;

pub use checksum::{calculate_crc16, validate_crc16};
pub use codec::{decode_token, encode_token, TokenHex, TOKEN_HEX_LEN};
pub use error::{CommandError, HexError, IdError};
pub use record::{
    AuctionId, KeyFlags, KeyKind, Record, SlotContent, Token, MAX_AUCTIONS, MAX_ID_LEN,
    RECORD_SIZE, TOKEN_LEN,
};

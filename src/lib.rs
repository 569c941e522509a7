#![cfg_attr(not(any(test, feature = "mock")), no_std)]

//! escrow_vault - Escrow token vault for constrained devices
//!
//! This library keeps per-auction item and purchase keys in a CRC-protected
//! slot table on a byte-addressable medium and serves a line-oriented command
//! protocol over a serial channel.

// Platform abstraction layer
pub mod platform;

// Core systems (logging)
pub mod core;

// Runtime configuration
pub mod config;

// Record store, dispatcher, signals and serial session
pub mod vault;

pub use config::EscrowConfig;
pub use escrow_vault_core::{protocol, record};

//! Escrow vault
//!
//! The record store, the command dispatcher on top of it, the release/fault
//! signal lines and the serial session tying them to a UART.

pub mod dispatcher;
pub mod session;
pub mod signal;
pub mod store;

pub use dispatcher::{CommandDispatcher, Outcome, MAX_RESPONSES};
pub use session::{SerialSession, LINE_BUFFER_SIZE};
pub use signal::{SignalBank, SignalKind};
pub use store::{Lookup, RecordStore, SlotIndex, StoreError, StoreResult};

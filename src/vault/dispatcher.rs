//! Command dispatcher
//!
//! Turns one protocol line into store operations and response lines. The
//! dispatcher itself is stateless; everything it knows lives in the
//! [`RecordStore`] it owns.
//!
//! Signal pulses are not driven here. [`Outcome::signal`] names the pulse a
//! command asks for, and the caller fires it after the responses have been
//! written out.

use super::signal::SignalKind;
use super::store::{Lookup, RecordStore, StoreError};
use crate::platform::{EepromInterface, PlatformError};
use escrow_vault_core::protocol::{Command, ErrorCode, ReleaseNotice, Response};
use escrow_vault_core::record::{AuctionId, KeyKind, Token, MAX_AUCTIONS};

/// Most lines one command can produce (a full LIST plus its terminator)
pub const MAX_RESPONSES: usize = MAX_AUCTIONS + 1;

/// Response lines for one command
pub type Responses = heapless::Vec<Response, MAX_RESPONSES>;

/// Everything one command produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Lines to send back, in order
    pub responses: Responses,
    /// Pulse to drive once the responses are out
    pub signal: Option<SignalKind>,
}

impl Outcome {
    fn reply(response: Response) -> Self {
        let mut responses = Responses::new();
        // Capacity is at least one
        let _ = responses.push(response);
        Self {
            responses,
            signal: None,
        }
    }

    fn error(code: ErrorCode) -> Self {
        Self::reply(Response::Error(code))
    }

    fn with_signal(mut self, kind: SignalKind) -> Self {
        self.signal = Some(kind);
        self
    }

    /// First (for most commands, only) response line
    pub fn first(&self) -> Option<&Response> {
        self.responses.first()
    }
}

/// Command dispatcher over a record store
pub struct CommandDispatcher<E: EepromInterface> {
    store: RecordStore<E>,
}

impl<E: EepromInterface> CommandDispatcher<E> {
    /// Create a dispatcher that owns `store`
    pub fn new(store: RecordStore<E>) -> Self {
        Self { store }
    }

    /// Parse and execute one protocol line
    pub fn dispatch(&mut self, line: &str) -> Outcome {
        let (command, notes) = match Command::parse_with_notes(line) {
            Ok(parsed) => parsed,
            Err(e) => {
                crate::log_warn!("Rejected line '{}': {}", line.trim(), e);
                return Outcome::error(e.into());
            }
        };

        if notes.id_truncated {
            crate::log_warn!(
                "{}: id truncated to {} characters",
                command.keyword(),
                escrow_vault_core::MAX_ID_LEN
            );
        }
        if notes.token_trailing {
            crate::log_warn!("{}: characters after the 64th hex digit ignored", command.keyword());
        }

        self.execute(command)
    }

    /// Execute an already parsed command
    pub fn execute(&mut self, command: Command) -> Outcome {
        crate::log_debug!("Executing {}", command.keyword());

        match command {
            Command::Add { id, token } => self.set_key(id, KeyKind::Purchase, &token),
            Command::Item { id, token } => self.set_key(id, KeyKind::Item, &token),
            Command::Buy { id, token } => self.buy(id, &token),
            Command::Erase { id } => self.erase(id),
            Command::Status { id } => self.status(id),
            Command::List => self.list(),
            Command::Reset => self.reset(),
        }
    }

    fn set_key(&mut self, id: AuctionId, kind: KeyKind, token: &Token) -> Outcome {
        match self.store.write_key(&id, kind, token) {
            Ok(_) => Outcome::reply(match kind {
                KeyKind::Purchase => Response::Added(id),
                KeyKind::Item => Response::ItemSet(id),
            }),
            Err(StoreError::Full) => Outcome::error(ErrorCode::Full),
            Err(StoreError::Platform(e)) => storage_failure(e),
        }
    }

    fn buy(&mut self, id: AuctionId, token: &Token) -> Outcome {
        let (slot, record) = match self.store.lookup(&id) {
            Ok(Lookup::Found { slot, record }) => (slot, record),
            Ok(Lookup::Corrupt { .. }) => return Outcome::error(ErrorCode::Corrupt),
            Ok(Lookup::Absent) => {
                crate::log_warn!("BUY for unknown auction {}", id);
                return Outcome::error(ErrorCode::NoItem);
            }
            Err(e) => return storage_failure(e),
        };

        let Some(purchase_key) = record.purchase_key().copied() else {
            crate::log_warn!("BUY for auction {} with no purchase key set", id);
            return Outcome::error(ErrorCode::NoPurchaseKey).with_signal(SignalKind::Fault);
        };

        if !record.purchase_key_matches(token) {
            crate::log_warn!("BUY for auction {}: purchase key mismatch", id);
            return Outcome::reply(Response::Mismatch(id)).with_signal(SignalKind::Fault);
        }

        // Consume before releasing so the record can never be bought twice
        if let Err(e) = self.store.erase_slot(slot) {
            return storage_failure(e);
        }

        crate::log_info!("Auction {} released from slot {}", id, slot);
        Outcome::reply(Response::Released(ReleaseNotice {
            id,
            purchase_key,
            item_key: record.item_key().copied(),
        }))
        .with_signal(SignalKind::Release)
    }

    fn erase(&mut self, id: AuctionId) -> Outcome {
        let slot = match self.store.lookup(&id) {
            Ok(Lookup::Found { slot, .. }) | Ok(Lookup::Corrupt { slot }) => slot,
            Ok(Lookup::Absent) => return Outcome::error(ErrorCode::NotFound),
            Err(e) => return storage_failure(e),
        };

        match self.store.erase_slot(slot) {
            Ok(()) => Outcome::reply(Response::Erased(id)),
            Err(e) => storage_failure(e),
        }
    }

    fn status(&mut self, id: AuctionId) -> Outcome {
        match self.store.lookup(&id) {
            Ok(Lookup::Found { record, .. }) => Outcome::reply(Response::Status {
                has_item_key: record.has_item_key(),
                has_purchase_key: record.has_purchase_key(),
                id,
            }),
            Ok(Lookup::Corrupt { .. }) => Outcome::error(ErrorCode::Corrupt),
            Ok(Lookup::Absent) => Outcome::error(ErrorCode::NotFound),
            Err(e) => storage_failure(e),
        }
    }

    fn list(&mut self) -> Outcome {
        let entries = match self.store.entries() {
            Ok(entries) => entries,
            Err(e) => return storage_failure(e),
        };

        let mut responses = Responses::new();
        for (slot, record) in entries.iter() {
            // entries() yields at most MAX_AUCTIONS, leaving room for the terminator
            let _ = responses.push(Response::Entry {
                slot: *slot,
                id: record.id.clone(),
                has_item_key: record.has_item_key(),
                has_purchase_key: record.has_purchase_key(),
            });
        }
        let _ = responses.push(Response::ListEnd {
            count: entries.len(),
        });

        Outcome {
            responses,
            signal: None,
        }
    }

    fn reset(&mut self) -> Outcome {
        match self.store.reset_all() {
            Ok(()) => Outcome::reply(Response::ResetDone),
            Err(e) => storage_failure(e),
        }
    }

    /// Underlying store, mutable (for testing)
    pub fn store_mut(&mut self) -> &mut RecordStore<E> {
        &mut self.store
    }
}

fn storage_failure(e: PlatformError) -> Outcome {
    crate::log_error!("Storage failure: {}", e);
    Outcome::error(ErrorCode::Storage)
}

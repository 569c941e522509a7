//! Response lines
//!
//! Response tokens are consumed by existing operator tooling and must be
//! reproduced verbatim.

use super::DELIMITER;
use crate::codec::{decode_token, encode_token, TOKEN_HEX_LEN};
use crate::record::{AuctionId, Token};
use core::fmt::{self, Write};
use heapless::String;

/// Longest possible rendered response (`OK_RELEASE` with both keys)
pub const RESPONSE_MAX_LEN: usize = 160;

/// Rendered response line, without line terminator
pub type ResponseLine = String<RESPONSE_MAX_LEN>;

/// Error tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed or too-short hex token
    Format,
    /// No free slot for a new id
    Full,
    /// `BUY` for an id with no record
    NoItem,
    /// `ERASE`/`STATUS` for an id with no record
    NotFound,
    /// Record exists but failed its checksum
    Corrupt,
    /// `BUY` on a record without a purchase key
    NoPurchaseKey,
    /// Unrecognized keyword
    UnknownCommand,
    /// Recognized keyword with malformed fields
    Syntax,
    /// Persistent medium failed
    Storage,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Format => "ERR_FORMAT",
            ErrorCode::Full => "ERR_FULL",
            ErrorCode::NoItem => "ERR_NO_ITEM",
            ErrorCode::NotFound => "ERR_NOT_FOUND",
            ErrorCode::Corrupt => "ERR_CORRUPT",
            ErrorCode::NoPurchaseKey => "ERR_NO_PURCHASE_KEY",
            ErrorCode::UnknownCommand => "ERR_UNKNOWN_CMD",
            ErrorCode::Syntax => "ERR_SYNTAX",
            ErrorCode::Storage => "ERR_STORAGE",
        }
    }
}

impl From<crate::error::CommandError> for ErrorCode {
    fn from(e: crate::error::CommandError) -> Self {
        match e {
            crate::error::CommandError::UnknownCommand => ErrorCode::UnknownCommand,
            crate::error::CommandError::Syntax => ErrorCode::Syntax,
            crate::error::CommandError::Format(_) => ErrorCode::Format,
        }
    }
}

/// One response line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `OK_ADD:<id>`
    Added(AuctionId),
    /// `OK_ITEM:<id>`
    ItemSet(AuctionId),
    /// `OK_RELEASE:<id>:<purchaseHex>[:<itemHex>]`
    Released(ReleaseNotice),
    /// `ERR_MISMATCH:<id>`
    Mismatch(AuctionId),
    /// `OK_ERASE:<id>`
    Erased(AuctionId),
    /// `STATUS:<id>:ITEM=<0|1>:PURCHASE=<0|1>`
    Status {
        id: AuctionId,
        has_item_key: bool,
        has_purchase_key: bool,
    },
    /// `ENTRY:<slot>:<id>:ITEM=<0|1>:PURCHASE=<0|1>`
    Entry {
        slot: usize,
        id: AuctionId,
        has_item_key: bool,
        has_purchase_key: bool,
    },
    /// `OK_LIST:<count>`
    ListEnd { count: usize },
    /// `OK_RESET`
    ResetDone,
    /// Bare error token
    Error(ErrorCode),
}

impl Response {
    /// Render into a fixed-capacity line
    pub fn render(&self) -> ResponseLine {
        let mut line = ResponseLine::new();
        // RESPONSE_MAX_LEN covers the longest variant
        let _ = write!(line, "{}", self);
        line
    }

    /// Returns `true` for `ERR_*` responses
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_) | Response::Mismatch(_))
    }
}

fn flag(present: bool) -> char {
    if present {
        '1'
    } else {
        '0'
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Added(id) => write!(f, "OK_ADD:{}", id),
            Response::ItemSet(id) => write!(f, "OK_ITEM:{}", id),
            Response::Released(notice) => write!(f, "{}", notice),
            Response::Mismatch(id) => write!(f, "ERR_MISMATCH:{}", id),
            Response::Erased(id) => write!(f, "OK_ERASE:{}", id),
            Response::Status {
                id,
                has_item_key,
                has_purchase_key,
            } => write!(
                f,
                "STATUS:{}:ITEM={}:PURCHASE={}",
                id,
                flag(*has_item_key),
                flag(*has_purchase_key)
            ),
            Response::Entry {
                slot,
                id,
                has_item_key,
                has_purchase_key,
            } => write!(
                f,
                "ENTRY:{}:{}:ITEM={}:PURCHASE={}",
                slot,
                id,
                flag(*has_item_key),
                flag(*has_purchase_key)
            ),
            Response::ListEnd { count } => write!(f, "OK_LIST:{}", count),
            Response::ResetDone => f.write_str("OK_RESET"),
            Response::Error(code) => f.write_str(code.as_str()),
        }
    }
}

/// Payload of an `OK_RELEASE` line
///
/// Rendered by the device on a successful buy and parsed back by host-side
/// bridge tooling that relays releases upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseNotice {
    pub id: AuctionId,
    pub purchase_key: Token,
    pub item_key: Option<Token>,
}

impl ReleaseNotice {
    const PREFIX: &'static str = "OK_RELEASE:";

    /// Parse an `OK_RELEASE` line
    ///
    /// Returns `None` for any other line, or if a key field is not exactly
    /// 64 hex characters.
    pub fn parse(line: &str) -> Option<Self> {
        let payload = line.trim().strip_prefix(Self::PREFIX)?;
        let mut fields = payload.split(DELIMITER);

        let id = AuctionId::new(fields.next()?).ok()?;
        let purchase_key = parse_exact_token(fields.next()?)?;
        let item_key = match fields.next() {
            Some(field) => Some(parse_exact_token(field)?),
            None => None,
        };
        if fields.next().is_some() {
            return None;
        }

        Some(Self {
            id,
            purchase_key,
            item_key,
        })
    }
}

fn parse_exact_token(field: &str) -> Option<Token> {
    if field.len() != TOKEN_HEX_LEN {
        return None;
    }
    decode_token(field).ok()
}

impl fmt::Display for ReleaseNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}",
            Self::PREFIX,
            self.id,
            encode_token(&self.purchase_key)
        )?;
        if let Some(item_key) = &self.item_key {
            write!(f, ":{}", encode_token(item_key))?;
        }
        Ok(())
    }
}

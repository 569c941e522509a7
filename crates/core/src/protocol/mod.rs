//! Serial Command Protocol
//!
//! Pure grammar and rendering for the escrow line protocol. No I/O happens
//! here; the dispatcher in the root crate drives the store and signals.
//!
//! # Line Format
//!
//! - One command per line, ASCII, case-sensitive keywords
//! - Fields are separated by `:`
//! - Surrounding whitespace is trimmed before parsing
//!
//! # Commands
//!
//! ```text
//! ADD:<id>:<hex64>     set purchase key (create or merge)
//! ITEM:<id>:<hex64>    set item key (create or merge)
//! BUY:<id>:<hex64>     present purchase key, release on match
//! ERASE:<id>           remove one record
//! STATUS:<id>          report key presence for one record
//! LIST                 enumerate live records
//! RESET                erase every slot
//! ```

pub mod command;
pub mod response;

pub use command::{Command, ParseNotes};
pub use response::{ErrorCode, ReleaseNotice, Response, ResponseLine, RESPONSE_MAX_LEN};

/// Field delimiter
pub const DELIMITER: char = ':';

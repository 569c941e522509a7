//! Core error types
//!
//! Provides error types for token decoding, id validation and command parsing.

/// Errors from decoding a hex token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexError {
    /// Fewer than 64 characters were supplied
    TooShort { len: usize },
    /// A character inside the token is not a hex digit
    InvalidCharacter { index: usize },
}

impl core::fmt::Display for HexError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HexError::TooShort { len } => write!(f, "token too short ({} hex chars)", len),
            HexError::InvalidCharacter { index } => {
                write!(f, "invalid hex character at position {}", index)
            }
        }
    }
}

/// Errors from validating an auction id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdError {
    /// Id is empty
    Empty,
    /// Id contains a byte outside printable ASCII, or a field delimiter
    InvalidCharacter,
}

impl core::fmt::Display for IdError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            IdError::Empty => write!(f, "auction id is empty"),
            IdError::InvalidCharacter => write!(f, "auction id contains an invalid character"),
        }
    }
}

/// Errors from parsing a protocol line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Line does not start with a known keyword
    UnknownCommand,
    /// Known keyword with missing or malformed fields
    Syntax,
    /// Token field is not a valid hex token
    Format(HexError),
}

impl core::fmt::Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CommandError::UnknownCommand => write!(f, "unknown command"),
            CommandError::Syntax => write!(f, "malformed command"),
            CommandError::Format(e) => write!(f, "bad token: {}", e),
        }
    }
}

impl From<HexError> for CommandError {
    fn from(e: HexError) -> Self {
        CommandError::Format(e)
    }
}

impl From<IdError> for CommandError {
    fn from(_: IdError) -> Self {
        CommandError::Syntax
    }
}

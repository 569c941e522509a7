//! Core infrastructure
//!
//! Cross-cutting pieces shared by the vault: logging macros.

pub mod logging;

//! Vault configuration
//!
//! Runtime settings for the escrow vault. Defaults can be overridden at build
//! time through environment variables captured by `build.rs`:
//!
//! - `ESCROW_PULSE_MS` - release/fault pulse duration in milliseconds (default 500)
//! - `ESCROW_BASE_ADDRESS` - medium offset of slot 0, decimal or `0x` hex (default 0)
//! - `ESCROW_BAUD` - serial baud rate (default 115200)
//!
//! The `host_session` example (`demos/host_session.rs`) shows a session built
//! from [`EscrowConfig::from_build_env`].

use crate::platform::{traits::UartConfig, PlatformError, Result};

/// Default pulse duration for release/fault signals
pub const DEFAULT_PULSE_MS: u32 = 500;

/// Default medium offset of slot 0
pub const DEFAULT_BASE_ADDRESS: u32 = 0;

/// Default serial baud rate
pub const DEFAULT_BAUD_RATE: u32 = 115200;

/// Escrow vault configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscrowConfig {
    /// How long the release or fault line is held high
    pub pulse_ms: u32,
    /// Medium address of slot 0
    pub base_address: u32,
    /// Serial baud rate
    pub baud_rate: u32,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            pulse_ms: DEFAULT_PULSE_MS,
            base_address: DEFAULT_BASE_ADDRESS,
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

impl EscrowConfig {
    /// Load configuration from build-time environment values
    ///
    /// Values that fail to parse fall back to their defaults with a warning.
    pub fn from_build_env() -> Self {
        Self {
            pulse_ms: parse_or_default("ESCROW_PULSE_MS", env!("ESCROW_PULSE_MS"), DEFAULT_PULSE_MS),
            base_address: parse_or_default(
                "ESCROW_BASE_ADDRESS",
                env!("ESCROW_BASE_ADDRESS"),
                DEFAULT_BASE_ADDRESS,
            ),
            baud_rate: parse_or_default("ESCROW_BAUD", env!("ESCROW_BAUD"), DEFAULT_BAUD_RATE),
        }
    }

    /// Check that the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::InvalidConfig` for a zero pulse duration or
    /// a zero baud rate.
    pub fn validate(&self) -> Result<()> {
        if self.pulse_ms == 0 {
            crate::log_error!("Config rejected: pulse_ms must be non-zero");
            return Err(PlatformError::InvalidConfig);
        }
        if self.baud_rate == 0 {
            crate::log_error!("Config rejected: baud_rate must be non-zero");
            return Err(PlatformError::InvalidConfig);
        }
        Ok(())
    }

    /// UART settings derived from this configuration
    pub fn uart_config(&self) -> UartConfig {
        UartConfig {
            baud_rate: self.baud_rate,
        }
    }
}

fn parse_or_default(name: &str, raw: &str, default: u32) -> u32 {
    let raw = raw.trim();
    if raw.is_empty() {
        return default;
    }

    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex_digits) => u32::from_str_radix(hex_digits, 16),
        None => raw.parse::<u32>(),
    };

    match parsed {
        Ok(value) => value,
        Err(_) => {
            crate::log_warn!("{}={} is not a number, using {}", name, raw, default);
            default
        }
    }
}

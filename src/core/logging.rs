//! Logging abstraction
//!
//! Provides unified logging macros that work across different targets:
//! - Embedded (`defmt` feature): formats into a fixed buffer and logs via defmt
//! - Host tests: Uses println!
//! - Host non-test: No-op
//!
//! Arguments use `core::fmt` syntax on every target, so types only need
//! `Display`/`Debug`, never `defmt::Format`.

/// Log message buffer size
pub const LOG_MSG_SIZE: usize = 192;

/// Formatted log message
pub type LogLine = heapless::String<LOG_MSG_SIZE>;

/// Format a message into a [`LogLine`], truncating on overflow
pub fn format_line(args: core::fmt::Arguments<'_>) -> LogLine {
    let mut line = LogLine::new();
    let _ = core::fmt::write(&mut line, args);
    line
}

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!(
            "{=str}",
            $crate::core::logging::format_line(format_args!($($arg)*)).as_str()
        );

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[INFO] {}", format_args!($($arg)*));

        #[cfg(all(not(feature = "defmt"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!(
            "{=str}",
            $crate::core::logging::format_line(format_args!($($arg)*)).as_str()
        );

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[WARN] {}", format_args!($($arg)*));

        #[cfg(all(not(feature = "defmt"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::error!(
            "{=str}",
            $crate::core::logging::format_line(format_args!($($arg)*)).as_str()
        );

        #[cfg(all(not(feature = "defmt"), test))]
        eprintln!("[ERROR] {}", format_args!($($arg)*));

        #[cfg(all(not(feature = "defmt"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!(
            "{=str}",
            $crate::core::logging::format_line(format_args!($($arg)*)).as_str()
        );

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[DEBUG] {}", format_args!($($arg)*));

        #[cfg(all(not(feature = "defmt"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::trace!(
            "{=str}",
            $crate::core::logging::format_line(format_args!($($arg)*)).as_str()
        );

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[TRACE] {}", format_args!($($arg)*));

        #[cfg(all(not(feature = "defmt"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

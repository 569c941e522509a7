//! Mock UART implementation for testing

use crate::platform::{
    error::UartError,
    traits::{UartConfig, UartInterface},
    Result,
};
use core::cell::RefCell;
use std::string::String;
use std::vec::Vec;

/// Mock UART implementation
///
/// Provides in-memory buffers for transmit and receive data,
/// allowing unit tests to drive the serial protocol without hardware.
///
/// # Example
///
/// ```
/// use escrow_vault::platform::mock::MockUart;
/// use escrow_vault::platform::traits::UartInterface;
///
/// let mut uart = MockUart::new(Default::default());
///
/// uart.write(b"OK_RESET\r\n").unwrap();
/// assert_eq!(uart.tx_lines(), vec!["OK_RESET".to_string()]);
///
/// uart.inject_rx_data(b"LIST\n");
/// let mut buf = [0u8; 5];
/// uart.read(&mut buf).unwrap();
/// assert_eq!(&buf, b"LIST\n");
/// ```
#[derive(Debug)]
pub struct MockUart {
    config: UartConfig,
    tx_buffer: RefCell<Vec<u8>>,
    rx_buffer: RefCell<Vec<u8>>,
    /// Number of upcoming writes to reject
    failing_writes: u32,
}

impl MockUart {
    /// Create a new mock UART
    pub fn new(config: UartConfig) -> Self {
        Self {
            config,
            tx_buffer: RefCell::new(Vec::new()),
            rx_buffer: RefCell::new(Vec::new()),
            failing_writes: 0,
        }
    }

    /// Get transmitted data (for test verification)
    pub fn tx_buffer(&self) -> Vec<u8> {
        self.tx_buffer.borrow().clone()
    }

    /// Transmitted data split into CRLF-terminated lines
    ///
    /// A trailing partial line is included.
    pub fn tx_lines(&self) -> Vec<String> {
        let tx = self.tx_buffer.borrow();
        let text = String::from_utf8_lossy(&tx);
        text.split("\r\n")
            .filter(|line| !line.is_empty())
            .map(|line| line.to_string())
            .collect()
    }

    /// Clear transmit buffer
    pub fn clear_tx_buffer(&mut self) {
        self.tx_buffer.borrow_mut().clear();
    }

    /// Inject receive data (for test setup)
    pub fn inject_rx_data(&mut self, data: &[u8]) {
        self.rx_buffer.borrow_mut().extend_from_slice(data);
    }

    /// Reject the next `count` writes with `UartError::WriteFailed`
    pub fn fail_next_writes(&mut self, count: u32) {
        self.failing_writes = count;
    }

    /// Get current baud rate
    pub fn baud_rate(&self) -> u32 {
        self.config.baud_rate
    }
}

impl UartInterface for MockUart {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(UartError::WriteFailed.into());
        }
        self.tx_buffer.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut rx = self.rx_buffer.borrow_mut();
        let to_read = core::cmp::min(buffer.len(), rx.len());

        buffer[..to_read].copy_from_slice(&rx[..to_read]);
        rx.drain(..to_read);

        Ok(to_read)
    }

    fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        self.config.baud_rate = baud;
        Ok(())
    }

    fn available(&self) -> bool {
        !self.rx_buffer.borrow().is_empty()
    }

    fn flush(&mut self) -> Result<()> {
        // Mock implementation - nothing to flush
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_uart_write() {
        let mut uart = MockUart::new(UartConfig::default());
        let written = uart.write(b"OK_ADD:lot1\r\n").unwrap();
        assert_eq!(written, 13);
        assert_eq!(uart.tx_buffer(), b"OK_ADD:lot1\r\n");
        assert_eq!(uart.tx_lines(), vec!["OK_ADD:lot1".to_string()]);

        uart.clear_tx_buffer();
        assert!(uart.tx_lines().is_empty());
    }

    #[test]
    fn test_mock_uart_read() {
        let mut uart = MockUart::new(UartConfig::default());
        uart.inject_rx_data(b"LIST\nRESET\n");

        let mut buffer = [0u8; 5];
        let read = uart.read(&mut buffer).unwrap();
        assert_eq!(read, 5);
        assert_eq!(&buffer, b"LIST\n");

        let mut buffer2 = [0u8; 16];
        let read2 = uart.read(&mut buffer2).unwrap();
        assert_eq!(read2, 6);
        assert_eq!(&buffer2[..6], b"RESET\n");
        assert!(!uart.available());
    }

    #[test]
    fn test_mock_uart_write_failure() {
        let mut uart = MockUart::new(UartConfig::default());
        uart.fail_next_writes(1);

        assert_eq!(uart.write(b"OK_RESET\r\n"), Err(UartError::WriteFailed.into()));
        assert!(uart.tx_buffer().is_empty());
        assert_eq!(uart.write(b"OK_RESET\r\n").unwrap(), 10);
    }

    #[test]
    fn test_mock_uart_baud_rate() {
        let mut uart = MockUart::new(UartConfig::default());
        assert_eq!(uart.baud_rate(), 115200);

        uart.set_baud_rate(9600).unwrap();
        assert_eq!(uart.baud_rate(), 9600);
    }
}

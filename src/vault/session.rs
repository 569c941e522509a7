//! Serial command session
//!
//! Assembles bytes from the UART into protocol lines, hands each line to the
//! [`CommandDispatcher`], writes the responses back and then fires whatever
//! pulse the command asked for.
//!
//! # Framing
//!
//! - `\n` ends a line, `\r` is dropped
//! - blank lines are ignored
//! - a line longer than [`LINE_BUFFER_SIZE`] is discarded up to its `\n` and
//!   answered with `ERR_SYNTAX`
//! - every response line is terminated with `\r\n`

use super::dispatcher::{CommandDispatcher, Outcome};
use super::signal::SignalBank;
use super::store::RecordStore;
use crate::config::EscrowConfig;
use crate::platform::{EepromInterface, GpioInterface, Result, TimerInterface, UartInterface};
use escrow_vault_core::protocol::{ErrorCode, Response};

/// Longest accepted command line, excluding the terminator
pub const LINE_BUFFER_SIZE: usize = 160;

/// Bytes pulled from the UART per read
const READ_CHUNK: usize = 32;

const LINE_END: &[u8] = b"\r\n";

/// One serial command session
pub struct SerialSession<U, E, G, T>
where
    U: UartInterface,
    E: EepromInterface,
    G: GpioInterface,
    T: TimerInterface,
{
    uart: U,
    dispatcher: CommandDispatcher<E>,
    signals: SignalBank<G, T>,
    line: heapless::Vec<u8, LINE_BUFFER_SIZE>,
    overflowed: bool,
}

impl<U, E, G, T> SerialSession<U, E, G, T>
where
    U: UartInterface,
    E: EepromInterface,
    G: GpioInterface,
    T: TimerInterface,
{
    /// Create a session from already configured parts
    pub fn new(uart: U, store: RecordStore<E>, signals: SignalBank<G, T>) -> Self {
        Self {
            uart,
            dispatcher: CommandDispatcher::new(store),
            signals,
            line: heapless::Vec::new(),
            overflowed: false,
        }
    }

    /// Build a session from raw peripherals and a configuration
    ///
    /// Validates the configuration, applies the baud rate, places the slot
    /// table at `config.base_address` and drives both signal lines low.
    pub fn from_config(
        config: &EscrowConfig,
        mut uart: U,
        eeprom: E,
        release: G,
        fault: G,
        timer: T,
    ) -> Result<Self> {
        config.validate()?;
        uart.set_baud_rate(config.baud_rate)?;

        let store = RecordStore::new(eeprom, config.base_address)?;
        let mut signals = SignalBank::new(release, fault, timer, config.pulse_ms);
        signals.init()?;

        crate::log_info!(
            "Escrow session ready: baud={} base=0x{:X} pulse={}ms",
            config.baud_rate,
            config.base_address,
            config.pulse_ms
        );
        Ok(Self::new(uart, store, signals))
    }

    /// Drain pending UART input, executing every complete line
    ///
    /// Returns the number of lines answered. A failed response write does
    /// not cut the current chunk short: the remaining bytes are still
    /// framed, and the first error is returned once the chunk is consumed.
    pub fn poll(&mut self) -> Result<usize> {
        let mut handled = 0;
        let mut chunk = [0u8; READ_CHUNK];

        while self.uart.available() {
            let n = self.uart.read(&mut chunk)?;
            if n == 0 {
                break;
            }

            let mut first_error = None;
            for &byte in &chunk[..n] {
                match self.feed_byte(byte) {
                    Ok(true) => handled += 1,
                    Ok(false) => {}
                    Err(e) => {
                        first_error.get_or_insert(e);
                    }
                }
            }
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        Ok(handled)
    }

    /// Feed one received byte
    ///
    /// Returns `true` if the byte completed a line that was answered.
    pub fn feed_byte(&mut self, byte: u8) -> Result<bool> {
        match byte {
            b'\r' => Ok(false),
            b'\n' => self.end_of_line(),
            _ => {
                if !self.overflowed && self.line.push(byte).is_err() {
                    crate::log_warn!("Line exceeds {} bytes, discarding", LINE_BUFFER_SIZE);
                    self.overflowed = true;
                }
                Ok(false)
            }
        }
    }

    fn end_of_line(&mut self) -> Result<bool> {
        let overflowed = core::mem::replace(&mut self.overflowed, false);
        let line = core::mem::take(&mut self.line);

        if overflowed {
            self.write_response(&Response::Error(ErrorCode::Syntax))?;
            return Ok(true);
        }

        let Ok(text) = core::str::from_utf8(&line) else {
            crate::log_warn!("Line is not valid UTF-8");
            self.write_response(&Response::Error(ErrorCode::Syntax))?;
            return Ok(true);
        };

        if text.trim().is_empty() {
            return Ok(false);
        }

        let outcome = self.dispatcher.dispatch(text);
        self.complete(outcome)?;
        Ok(true)
    }

    /// Write the responses, then drive the requested pulse
    ///
    /// The pulse fires even if writing failed: by then the command has
    /// already changed the store. A write error takes precedence over a
    /// pulse error.
    fn complete(&mut self, outcome: Outcome) -> Result<()> {
        let written = outcome
            .responses
            .iter()
            .try_for_each(|response| self.write_response(response))
            .and_then(|()| self.uart.flush());

        if let Err(e) = &written {
            crate::log_error!("Response write failed: {}", e);
        }

        let pulsed = match outcome.signal {
            Some(kind) => self.signals.pulse(kind),
            None => Ok(()),
        };
        if let Err(e) = &pulsed {
            crate::log_error!("Signal pulse failed: {}", e);
        }

        written.and(pulsed)
    }

    fn write_response(&mut self, response: &Response) -> Result<()> {
        let rendered = response.render();
        crate::log_debug!("-> {}", rendered.as_str());
        write_all(&mut self.uart, rendered.as_bytes())?;
        write_all(&mut self.uart, LINE_END)
    }

    /// Command dispatcher
    pub fn dispatcher_mut(&mut self) -> &mut CommandDispatcher<E> {
        &mut self.dispatcher
    }

    /// Signal lines
    pub fn signals(&self) -> &SignalBank<G, T> {
        &self.signals
    }

    /// Serial port
    pub fn uart(&self) -> &U {
        &self.uart
    }

    /// Serial port, mutable (for testing)
    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }
}

fn write_all<U: UartInterface>(uart: &mut U, mut data: &[u8]) -> Result<()> {
    while !data.is_empty() {
        let n = uart.write(data)?;
        if n == 0 {
            return Err(crate::platform::error::UartError::WriteFailed.into());
        }
        data = &data[n..];
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockEeprom, MockGpio, MockTimer, MockUart};

    type TestSession = SerialSession<MockUart, MockEeprom, MockGpio, MockTimer>;

    const HEX_A: &str = "1111111111111111111111111111111111111111111111111111111111111111";
    const HEX_B: &str = "2222222222222222222222222222222222222222222222222222222222222222";

    fn session() -> TestSession {
        SerialSession::from_config(
            &EscrowConfig::default(),
            MockUart::new(Default::default()),
            MockEeprom::new(),
            MockGpio::new_output(),
            MockGpio::new_output(),
            MockTimer::new(),
        )
        .unwrap()
    }

    fn send(session: &mut TestSession, input: &str) -> Vec<String> {
        session.uart_mut().clear_tx_buffer();
        session.uart_mut().inject_rx_data(input.as_bytes());
        session.poll().unwrap();
        session.uart().tx_lines()
    }

    #[test]
    fn test_from_config_applies_settings() {
        let config = EscrowConfig {
            baud_rate: 9600,
            pulse_ms: 100,
            base_address: 0x80,
        };
        let session: TestSession = SerialSession::from_config(
            &config,
            MockUart::new(Default::default()),
            MockEeprom::new(),
            MockGpio::new_output(),
            MockGpio::new_output(),
            MockTimer::new(),
        )
        .unwrap();

        assert_eq!(session.uart().baud_rate(), 9600);
        assert_eq!(session.signals().pulse_ms(), 100);
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = EscrowConfig {
            pulse_ms: 0,
            ..Default::default()
        };
        let result: Result<TestSession> = SerialSession::from_config(
            &config,
            MockUart::new(Default::default()),
            MockEeprom::new(),
            MockGpio::new_output(),
            MockGpio::new_output(),
            MockTimer::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_responses_are_crlf_terminated() {
        let mut s = session();
        s.uart_mut().inject_rx_data(b"LIST\n");
        assert_eq!(s.poll().unwrap(), 1);
        assert_eq!(s.uart().tx_buffer(), b"OK_LIST:0\r\n".to_vec());
    }

    #[test]
    fn test_crlf_input_and_blank_lines() {
        let mut s = session();
        let lines = send(&mut s, "\r\n\n  \nRESET\r\nLIST\r\n");
        assert_eq!(lines, vec!["OK_RESET", "OK_LIST:0"]);
    }

    #[test]
    fn test_partial_line_waits_for_terminator() {
        let mut s = session();
        assert!(send(&mut s, "LI").is_empty());
        assert_eq!(send(&mut s, "ST\n"), vec!["OK_LIST:0"]);
    }

    #[test]
    fn test_overlong_line_is_syntax_error() {
        let mut s = session();
        let long = format!("ADD:lot1:{}{}\n", HEX_A, "0".repeat(LINE_BUFFER_SIZE));
        assert_eq!(send(&mut s, &long), vec!["ERR_SYNTAX"]);

        // The session recovers on the next line
        assert_eq!(send(&mut s, "LIST\n"), vec!["OK_LIST:0"]);
    }

    #[test]
    fn test_non_utf8_line() {
        let mut s = session();
        s.uart_mut().inject_rx_data(&[b'A', 0xFF, 0xFE, b'\n']);
        s.poll().unwrap();
        assert_eq!(s.uart().tx_lines(), vec!["ERR_SYNTAX"]);
    }

    #[test]
    fn test_buy_pulses_release_after_reply() {
        let mut s = session();
        send(&mut s, &format!("ADD:lot1:{}\nITEM:lot1:{}\n", HEX_B, HEX_A));

        let lines = send(&mut s, &format!("BUY:lot1:{}\n", HEX_B));
        assert_eq!(lines, vec![format!("OK_RELEASE:lot1:{}:{}", HEX_B, HEX_A)]);
        assert_eq!(s.signals().release_line().pulse_count(), 1);
        assert_eq!(s.signals().fault_line().pulse_count(), 0);
    }

    #[test]
    fn test_mismatch_pulses_fault() {
        let mut s = session();
        send(&mut s, &format!("ADD:lot1:{}\n", HEX_B));

        let lines = send(&mut s, &format!("BUY:lot1:{}\n", HEX_A));
        assert_eq!(lines, vec!["ERR_MISMATCH:lot1"]);
        assert_eq!(s.signals().fault_line().pulse_count(), 1);
        assert_eq!(s.signals().release_line().pulse_count(), 0);
    }

    #[test]
    fn test_failed_write_does_not_split_pending_line() {
        let mut s = session();
        for i in 0..3 {
            send(&mut s, &format!("ADD:lot{}:{}\n", i, HEX_B));
        }

        // The LIST reply fails while an ERASE line is still arriving in the
        // same read. Its tail must not run as a command of its own.
        s.uart_mut().clear_tx_buffer();
        s.uart_mut().fail_next_writes(1);
        let input = format!("LIST\nERASE:{}RESET\n", "a".repeat(21));
        assert_eq!(input.len() - "RESET\n".len(), READ_CHUNK);
        s.uart_mut().inject_rx_data(input.as_bytes());

        assert!(s.poll().is_err());
        assert_eq!(s.poll().unwrap(), 1);
        assert_eq!(s.uart().tx_lines(), vec!["ERR_NOT_FOUND"]);

        let lines = send(&mut s, "LIST\n");
        assert_eq!(lines.last().map(String::as_str), Some("OK_LIST:3"));
    }

    #[test]
    fn test_write_error_survives_pulse() {
        let mut s = session();
        send(&mut s, &format!("ADD:lot1:{}\n", HEX_B));

        s.uart_mut().fail_next_writes(1);
        s.uart_mut().inject_rx_data(format!("BUY:lot1:{}\n", HEX_B).as_bytes());

        assert!(s.poll().is_err());
        assert_eq!(s.signals().release_line().pulse_count(), 1);
        assert_eq!(send(&mut s, "LIST\n"), vec!["OK_LIST:0"]);
    }

    #[test]
    fn test_pulse_error_is_reported() {
        let mut s: TestSession = SerialSession::new(
            MockUart::new(Default::default()),
            RecordStore::new(MockEeprom::new(), 0).unwrap(),
            SignalBank::new(
                MockGpio::new_input(),
                MockGpio::new_input(),
                MockTimer::new(),
                500,
            ),
        );
        send(&mut s, &format!("ADD:lot1:{}\n", HEX_B));

        // Signal lines left as inputs cannot be pulsed
        s.uart_mut().clear_tx_buffer();
        s.uart_mut().inject_rx_data(format!("BUY:lot1:{}\n", HEX_A).as_bytes());
        assert!(s.poll().is_err());
        assert_eq!(s.uart().tx_lines(), vec!["ERR_MISMATCH:lot1"]);
    }

    #[test]
    fn test_poll_counts_answered_lines() {
        let mut s = session();
        s.uart_mut().inject_rx_data(b"LIST\n\nRESET\nBOGUS\n");
        assert_eq!(s.poll().unwrap(), 3);
        assert_eq!(s.poll().unwrap(), 0);
    }
}

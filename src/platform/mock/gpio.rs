//! Mock GPIO implementation for testing

use crate::platform::{
    error::{GpioError, PlatformError},
    traits::{GpioInterface, GpioMode},
    Result,
};
use std::vec::Vec;

/// Mock GPIO implementation
///
/// Tracks pin state (high/low), mode, and every level change so tests can
/// assert that a pulse was driven and released.
#[derive(Debug)]
pub struct MockGpio {
    state: bool,
    mode: GpioMode,
    history: Vec<bool>,
}

impl MockGpio {
    /// Create a new mock GPIO in output mode, driven low
    pub fn new_output() -> Self {
        Self {
            state: false,
            mode: GpioMode::OutputPushPull,
            history: Vec::new(),
        }
    }

    /// Create a new mock GPIO in input mode
    pub fn new_input() -> Self {
        Self {
            state: false,
            mode: GpioMode::Input,
            history: Vec::new(),
        }
    }

    /// Levels written so far, in order
    pub fn history(&self) -> &[bool] {
        &self.history
    }

    /// Number of complete high-then-low pulses driven
    pub fn pulse_count(&self) -> usize {
        self.history
            .windows(2)
            .filter(|w| w[0] && !w[1])
            .count()
    }

    fn drive(&mut self, level: bool) -> Result<()> {
        if !self.mode.is_output() {
            return Err(PlatformError::Gpio(GpioError::InvalidMode));
        }
        self.state = level;
        self.history.push(level);
        Ok(())
    }
}

impl GpioInterface for MockGpio {
    fn set_high(&mut self) -> Result<()> {
        self.drive(true)
    }

    fn set_low(&mut self) -> Result<()> {
        self.drive(false)
    }

    fn read(&self) -> bool {
        self.state
    }

    fn set_mode(&mut self, mode: GpioMode) -> Result<()> {
        self.mode = mode;
        Ok(())
    }

    fn mode(&self) -> GpioMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_gpio_output() {
        let mut gpio = MockGpio::new_output();
        assert!(!gpio.read());

        gpio.set_high().unwrap();
        assert!(gpio.read());

        gpio.set_low().unwrap();
        assert!(!gpio.read());
    }

    #[test]
    fn test_mock_gpio_pulse_count() {
        let mut gpio = MockGpio::new_output();
        assert_eq!(gpio.pulse_count(), 0);

        gpio.set_high().unwrap();
        assert_eq!(gpio.pulse_count(), 0);
        gpio.set_low().unwrap();
        gpio.set_high().unwrap();
        gpio.set_low().unwrap();

        assert_eq!(gpio.pulse_count(), 2);
        assert_eq!(gpio.history(), &[true, false, true, false]);
    }

    #[test]
    fn test_mock_gpio_input_rejects_drive() {
        let mut gpio = MockGpio::new_input();

        assert!(gpio.set_high().is_err());
        assert!(gpio.set_low().is_err());
        assert!(gpio.history().is_empty());
    }

    #[test]
    fn test_mock_gpio_mode() {
        let mut gpio = MockGpio::new_output();
        assert_eq!(gpio.mode(), GpioMode::OutputPushPull);

        gpio.set_mode(GpioMode::Input).unwrap();
        assert_eq!(gpio.mode(), GpioMode::Input);
    }
}

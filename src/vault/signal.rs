//! Release and fault signal lines
//!
//! Two output lines tell the surrounding hardware what happened: a pulse on
//! the release line unlocks the escrowed item, a pulse on the fault line
//! reports a rejected purchase key. Both are held high for a configured
//! duration and then driven low again.

use crate::platform::{traits::GpioMode, GpioInterface, Result, TimerInterface};

/// Which line to pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalKind {
    /// Successful buy
    Release,
    /// Purchase key mismatch
    Fault,
}

/// Release and fault outputs with a shared pulse timer
pub struct SignalBank<G: GpioInterface, T: TimerInterface> {
    release: G,
    fault: G,
    timer: T,
    pulse_ms: u32,
}

impl<G: GpioInterface, T: TimerInterface> SignalBank<G, T> {
    /// Create a signal bank; both lines start out driven low
    pub fn new(release: G, fault: G, timer: T, pulse_ms: u32) -> Self {
        Self {
            release,
            fault,
            timer,
            pulse_ms,
        }
    }

    /// Configure both lines as outputs and drive them low
    pub fn init(&mut self) -> Result<()> {
        for line in [&mut self.release, &mut self.fault] {
            line.set_mode(GpioMode::OutputPushPull)?;
            line.set_low()?;
        }
        crate::log_debug!("Signal lines ready, pulse {} ms", self.pulse_ms);
        Ok(())
    }

    /// Hold one line high for the pulse duration
    ///
    /// The line is driven low again even if the delay fails, so a timer
    /// error never leaves the release line asserted.
    pub fn pulse(&mut self, kind: SignalKind) -> Result<()> {
        let line = match kind {
            SignalKind::Release => &mut self.release,
            SignalKind::Fault => &mut self.fault,
        };

        line.set_high()?;
        let delayed = self.timer.delay_ms(self.pulse_ms);
        let lowered = line.set_low();

        if let Err(e) = delayed {
            crate::log_error!("{:?} pulse delay failed: {}", kind, e);
        }
        delayed.and(lowered)?;

        crate::log_debug!("{:?} pulse done ({} ms)", kind, self.pulse_ms);
        Ok(())
    }

    /// Pulse duration in milliseconds
    pub fn pulse_ms(&self) -> u32 {
        self.pulse_ms
    }

    /// Release line (for testing)
    pub fn release_line(&self) -> &G {
        &self.release
    }

    /// Fault line (for testing)
    pub fn fault_line(&self) -> &G {
        &self.fault
    }

    /// Pulse timer (for testing)
    pub fn timer(&self) -> &T {
        &self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockGpio, MockTimer};

    fn bank() -> SignalBank<MockGpio, MockTimer> {
        SignalBank::new(
            MockGpio::new_output(),
            MockGpio::new_output(),
            MockTimer::new(),
            500,
        )
    }

    #[test]
    fn test_release_pulse() {
        let mut signals = bank();
        signals.pulse(SignalKind::Release).unwrap();

        assert_eq!(signals.release_line().history(), &[true, false]);
        assert_eq!(signals.release_line().pulse_count(), 1);
        assert!(!signals.release_line().read());
        assert_eq!(signals.fault_line().pulse_count(), 0);
        assert_eq!(signals.timer().elapsed_ms(), 500);
    }

    #[test]
    fn test_fault_pulse() {
        let mut signals = bank();
        signals.pulse(SignalKind::Fault).unwrap();
        signals.pulse(SignalKind::Fault).unwrap();

        assert_eq!(signals.fault_line().pulse_count(), 2);
        assert_eq!(signals.release_line().pulse_count(), 0);
        assert_eq!(signals.timer().delay_calls(), 2);
    }

    #[test]
    fn test_init_drives_low() {
        let mut signals = SignalBank::new(
            MockGpio::new_input(),
            MockGpio::new_input(),
            MockTimer::new(),
            250,
        );
        signals.init().unwrap();

        assert_eq!(signals.release_line().mode(), GpioMode::OutputPushPull);
        assert_eq!(signals.fault_line().history(), &[false]);
        assert_eq!(signals.pulse_ms(), 250);
    }

    #[test]
    fn test_pulse_on_input_line_fails() {
        let mut signals = SignalBank::new(
            MockGpio::new_input(),
            MockGpio::new_input(),
            MockTimer::new(),
            500,
        );
        assert!(signals.pulse(SignalKind::Release).is_err());
        assert_eq!(signals.timer().delay_calls(), 0);
    }
}

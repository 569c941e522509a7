//! Host-side escrow session over the mock peripherals
//!
//! Builds a `SerialSession` from the build-time configuration, replays a short
//! escrow exchange and prints every reply line.
//!
//! ```text
//! ESCROW_PULSE_MS=250 cargo run --example host_session
//! ```

use escrow_vault::platform::mock::{MockEeprom, MockGpio, MockTimer, MockUart};
use escrow_vault::platform::PlatformError;
use escrow_vault::vault::SerialSession;
use escrow_vault::EscrowConfig;

const ITEM_KEY: &str = "00112233445566778899AABBCCDDEEFF00112233445566778899AABBCCDDEEFF";
const PURCHASE_KEY: &str = "CAFEBABECAFEBABECAFEBABECAFEBABEDEADBEEFDEADBEEFDEADBEEFDEADBEEF";

fn main() -> Result<(), PlatformError> {
    let config = EscrowConfig::from_build_env();
    println!(
        "config: baud={} base=0x{:X} pulse={}ms",
        config.baud_rate, config.base_address, config.pulse_ms
    );

    let mut session = SerialSession::from_config(
        &config,
        MockUart::new(config.uart_config()),
        MockEeprom::new(),
        MockGpio::new_output(),
        MockGpio::new_output(),
        MockTimer::new(),
    )?;

    let script = [
        format!("ITEM:lot1:{}", ITEM_KEY),
        format!("ADD:lot1:{}", PURCHASE_KEY),
        "LIST".to_string(),
        format!("BUY:lot1:{}", PURCHASE_KEY),
        "STATUS:lot1".to_string(),
    ];

    for line in &script {
        session.uart_mut().clear_tx_buffer();
        session.uart_mut().inject_rx_data(line.as_bytes());
        session.uart_mut().inject_rx_data(b"\n");
        session.poll()?;

        println!("> {}", line);
        for reply in session.uart().tx_lines() {
            println!("< {}", reply);
        }
    }

    println!(
        "release pulses: {}, fault pulses: {}, simulated time: {} ms",
        session.signals().release_line().pulse_count(),
        session.signals().fault_line().pulse_count(),
        session.signals().timer().elapsed_ms()
    );
    Ok(())
}

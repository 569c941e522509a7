use std::env;

fn main() {
    // Read vault defaults from environment variables (optional)
    // These are used by EscrowConfig::from_build_env()

    // Release/fault pulse duration in milliseconds
    if let Ok(pulse) = env::var("ESCROW_PULSE_MS") {
        println!("cargo:rustc-env=ESCROW_PULSE_MS={}", pulse);
        println!("cargo:warning=Using ESCROW_PULSE_MS from environment: {}", pulse);
    } else {
        println!("cargo:rustc-env=ESCROW_PULSE_MS=500");
    }

    // Medium address of slot 0
    if let Ok(base) = env::var("ESCROW_BASE_ADDRESS") {
        println!("cargo:rustc-env=ESCROW_BASE_ADDRESS={}", base);
        println!(
            "cargo:warning=Using ESCROW_BASE_ADDRESS from environment: {}",
            base
        );
    } else {
        println!("cargo:rustc-env=ESCROW_BASE_ADDRESS=0");
    }

    // Serial baud rate
    if let Ok(baud) = env::var("ESCROW_BAUD") {
        println!("cargo:rustc-env=ESCROW_BAUD={}", baud);
        println!("cargo:warning=Using ESCROW_BAUD from environment: {}", baud);
    } else {
        println!("cargo:rustc-env=ESCROW_BAUD=115200");
    }

    // Rerun if environment variables change
    println!("cargo:rerun-if-env-changed=ESCROW_PULSE_MS");
    println!("cargo:rerun-if-env-changed=ESCROW_BASE_ADDRESS");
    println!("cargo:rerun-if-env-changed=ESCROW_BAUD");
}

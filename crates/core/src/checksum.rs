//! CRC-16 calculation for slot validation
//!
//! Every record slot carries a 16-bit checksum over its leading bytes. A slot
//! whose stored checksum does not match the recomputed one is never trusted,
//! which is how torn writes and erased storage are told apart from live data.

use crc::{Crc, CRC_16_IBM_3740};

/// CRC-16/CCITT-FALSE
///
/// Polynomial 0x1021, initial register 0xFFFF, MSB-first, no final XOR.
/// The `crc` catalogue lists these parameters as IBM-3740.
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Calculate the CRC-16 checksum of data
///
/// # Example
///
/// ```
/// use escrow_vault_core::checksum::calculate_crc16;
///
/// assert_eq!(calculate_crc16(b"123456789"), 0x29B1);
/// ```
pub fn calculate_crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

/// Validate data against a stored CRC-16 checksum
///
/// Returns `true` if the checksum matches.
pub fn validate_crc16(data: &[u8], expected_crc: u16) -> bool {
    calculate_crc16(data) == expected_crc
}

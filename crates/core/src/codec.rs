//! Hex codec for escrow tokens
//!
//! Tokens travel over the serial protocol as 64 hexadecimal characters.
//! Decoding is case-insensitive and validates every consumed character;
//! encoding always produces uppercase.

use crate::error::HexError;
use crate::record::{Token, TOKEN_LEN};
use heapless::String;

/// Number of hex characters in an encoded token
pub const TOKEN_HEX_LEN: usize = TOKEN_LEN * 2;

/// Encoded token string
pub type TokenHex = String<TOKEN_HEX_LEN>;

/// Decode the leading 64 hex characters of `input` into a token
///
/// Characters past the 64th are not examined; callers that care about
/// trailing data check [`has_trailing_data`].
///
/// # Errors
///
/// - [`HexError::TooShort`] if fewer than 64 characters are present
/// - [`HexError::InvalidCharacter`] if any of the first 64 is not a hex digit
pub fn decode_token(input: &str) -> Result<Token, HexError> {
    let bytes = input.as_bytes();
    if bytes.len() < TOKEN_HEX_LEN {
        return Err(HexError::TooShort { len: bytes.len() });
    }

    let mut token = [0u8; TOKEN_LEN];
    hex::decode_to_slice(&bytes[..TOKEN_HEX_LEN], &mut token).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { index, .. } => {
            HexError::InvalidCharacter { index }
        }
        hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
            HexError::TooShort { len: bytes.len() }
        }
    })?;

    Ok(token)
}

/// Returns `true` if `input` carries characters past the encoded token
pub fn has_trailing_data(input: &str) -> bool {
    input.len() > TOKEN_HEX_LEN
}

/// Encode a token as exactly 64 uppercase hex characters
pub fn encode_token(token: &Token) -> TokenHex {
    let mut buf = [0u8; TOKEN_HEX_LEN];
    // Output length is exactly 2 * TOKEN_LEN, so this cannot fail
    let _ = hex::encode_to_slice(token, &mut buf);
    buf.make_ascii_uppercase();

    let mut out = TokenHex::new();
    for &c in buf.iter() {
        let _ = out.push(c as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_A: &str = "00112233445566778899AABBCCDDEEFF00112233445566778899AABBCCDDEEFF";

    #[test]
    fn test_decode_uppercase() {
        let token = decode_token(KEY_A).unwrap();
        assert_eq!(token[0], 0x00);
        assert_eq!(token[1], 0x11);
        assert_eq!(token[15], 0xFF);
        assert_eq!(token[31], 0xFF);
    }

    #[test]
    fn test_decode_is_case_insensitive() {
        let lower = KEY_A.to_ascii_lowercase();
        assert_eq!(decode_token(&lower).unwrap(), decode_token(KEY_A).unwrap());
    }

    #[test]
    fn test_decode_too_short() {
        assert_eq!(decode_token(""), Err(HexError::TooShort { len: 0 }));
        assert_eq!(
            decode_token(&KEY_A[..63]),
            Err(HexError::TooShort { len: 63 })
        );
    }

    #[test]
    fn test_decode_rejects_non_hex_within_token() {
        let mut bad = String::<64>::new();
        bad.push_str(&KEY_A[..10]).unwrap();
        bad.push('G').unwrap();
        bad.push_str(&KEY_A[11..]).unwrap();

        assert_eq!(
            decode_token(&bad),
            Err(HexError::InvalidCharacter { index: 10 })
        );
    }

    #[test]
    fn test_decode_ignores_trailing_characters() {
        let mut long = String::<80>::new();
        long.push_str(KEY_A).unwrap();
        long.push_str("zz-trailer").unwrap();

        assert!(has_trailing_data(&long));
        assert!(!has_trailing_data(KEY_A));
        assert_eq!(decode_token(&long).unwrap(), decode_token(KEY_A).unwrap());
    }

    #[test]
    fn test_decode_multibyte_input_does_not_panic() {
        // 64 bytes, but the boundary falls inside a multibyte character
        let input = "é".repeat(40);
        assert!(matches!(
            decode_token(&input),
            Err(HexError::InvalidCharacter { .. })
        ));
    }

    #[test]
    fn test_encode_is_uppercase_and_fixed_length() {
        let token = decode_token(&KEY_A.to_ascii_lowercase()).unwrap();
        let encoded = encode_token(&token);

        assert_eq!(encoded.len(), TOKEN_HEX_LEN);
        assert_eq!(encoded.as_str(), KEY_A);
    }

    #[test]
    fn test_encode_zero_token() {
        let encoded = encode_token(&[0u8; TOKEN_LEN]);
        assert!(encoded.chars().all(|c| c == '0'));
    }
}

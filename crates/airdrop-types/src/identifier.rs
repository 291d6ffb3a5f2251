//! Fixed-width identifier encoding.
//!
//! The settlement contract stores claimant identifiers in a `bytes16` field.
//! Free-form text identifiers are mapped onto it by hex-encoding their UTF-8
//! bytes and right-padding the hex digits with `'0'` to 32 digits:
//!
//! ```text
//!   "id001"  →  0x69643030310000000000000000000000
//!   ""       →  0x00000000000000000000000000000000
//! ```
//!
//! Encoding never fails and never truncates. An identifier longer than
//! 16 bytes keeps all of its digits (`2 + 2 * len` characters) and is only
//! rejected when converted into the contract field, see
//! [`EncodedIdentifier::to_field_bytes`].

use std::fmt;

use serde::Serialize;

use crate::constants::{HEX_PREFIX, IDENTIFIER_FIELD_BYTES, IDENTIFIER_HEX_DIGITS, IDENTIFIER_PAD};
use crate::{AirdropError, Result};

/// A text identifier in canonical `0x`-prefixed, zero-padded hex form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EncodedIdentifier(String);

impl EncodedIdentifier {
    /// The full encoding, including the `0x` prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hex digits without the prefix.
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.0[HEX_PREFIX.len()..]
    }

    /// Number of bytes the digits decode to.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.digits().len() / 2
    }

    /// Whether the encoding fits the contract's `bytes16` field.
    #[must_use]
    pub fn fits_field(&self) -> bool {
        self.digits().len() <= IDENTIFIER_HEX_DIGITS
    }

    /// Decode into the contract's fixed 16-byte field.
    ///
    /// # Errors
    /// Returns [`AirdropError::IdentifierTooWide`] when the identifier's
    /// UTF-8 form is longer than 16 bytes. `field` names the claim field in
    /// the error message.
    pub fn to_field_bytes(&self, field: &'static str) -> Result<[u8; IDENTIFIER_FIELD_BYTES]> {
        if !self.fits_field() {
            return Err(AirdropError::IdentifierTooWide {
                field,
                bytes: self.byte_len(),
                max: IDENTIFIER_FIELD_BYTES,
            });
        }
        let mut out = [0u8; IDENTIFIER_FIELD_BYTES];
        hex::decode_to_slice(self.digits(), &mut out)
            .map_err(|e| AirdropError::Serialization(format!("identifier `{field}`: {e}")))?;
        Ok(out)
    }
}

impl fmt::Display for EncodedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EncodedIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Encode a text identifier into its canonical fixed-width hex form.
#[must_use]
pub fn encode_identifier(text: &str) -> EncodedIdentifier {
    let digits = hex::encode(text.as_bytes());
    let width = digits.len().max(IDENTIFIER_HEX_DIGITS);

    let mut encoded = String::with_capacity(HEX_PREFIX.len() + width);
    encoded.push_str(HEX_PREFIX);
    encoded.push_str(&digits);
    encoded.extend(std::iter::repeat_n(IDENTIFIER_PAD, width - digits.len()));
    EncodedIdentifier(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::distributions::Alphanumeric;
    use rand::Rng;

    #[test]
    fn encodes_short_identifier() {
        let enc = encode_identifier("id001");
        assert_eq!(enc.as_str(), "0x69643030310000000000000000000000");
        assert_eq!(enc.digits().len(), 32);
        assert!(enc.fits_field());
    }

    #[test]
    fn empty_identifier_is_all_zero() {
        let enc = encode_identifier("");
        assert_eq!(enc.as_str(), format!("0x{}", "0".repeat(32)));
        assert_eq!(enc.to_field_bytes("inviterId").unwrap(), [0u8; 16]);
    }

    #[test]
    fn encoding_is_deterministic() {
        let mut rng = rand::thread_rng();
        for _ in 0..64 {
            let len = rng.gen_range(0..40);
            let text: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect();
            assert_eq!(encode_identifier(&text), encode_identifier(&text));
        }
    }

    #[test]
    fn short_identifiers_pad_to_32_digits() {
        let mut rng = rand::thread_rng();
        for _ in 0..64 {
            let len = rng.gen_range(0..16);
            let text: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect();
            let enc = encode_identifier(&text);
            assert_eq!(enc.digits().len(), 32, "input {text:?}");
            let pad = 32 - 2 * len;
            assert!(enc.digits().ends_with(&"0".repeat(pad)), "input {text:?}");
            assert_eq!(&enc.digits()[..2 * len], hex::encode(text.as_bytes()));
        }
    }

    #[test]
    fn exactly_sixteen_bytes_fits_without_padding() {
        let enc = encode_identifier("abcdefghijklmnop");
        assert_eq!(enc.as_str().len(), 34);
        assert_eq!(enc.digits(), hex::encode("abcdefghijklmnop"));
        assert_eq!(&enc.to_field_bytes("id").unwrap(), b"abcdefghijklmnop");
    }

    #[test]
    fn over_length_identifier_is_not_truncated() {
        let text = "claimant-0000000000001";
        let enc = encode_identifier(text);
        assert_eq!(enc.as_str().len(), 2 + 2 * text.len());
        assert_eq!(enc.byte_len(), text.len());
        assert!(!enc.fits_field());

        let err = enc.to_field_bytes("id").unwrap_err();
        assert!(matches!(
            err,
            AirdropError::IdentifierTooWide { field: "id", bytes: 22, max: 16 }
        ));
    }

    #[test]
    fn multibyte_characters_count_as_bytes() {
        // 6 chars, 18 UTF-8 bytes.
        let enc = encode_identifier("空投空投空投");
        assert_eq!(enc.byte_len(), 18);
        assert!(!enc.fits_field());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&encode_identifier("a")).unwrap();
        assert_eq!(json, "\"0x61000000000000000000000000000000\"");
    }
}

use crate::{CodecError, Encoder};

/// Number of hex digits in a 64-bit identifier.
pub const HEX_SIZE: usize = 16;

/// Fixed-width, zero-padded lowercase hexadecimal.
///
/// Decoding accepts either case but requires exactly [`HEX_SIZE`] digits, so
/// every value has exactly one canonical form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HexEncoder;

impl Encoder for HexEncoder {
    fn name(&self) -> &'static str {
        "hex"
    }

    fn encode(&self, raw: u64) -> String {
        format!("{raw:016x}")
    }

    fn decode(&self, s: &str) -> Result<u64, CodecError> {
        if s.len() != HEX_SIZE {
            return Err(CodecError::InvalidLength {
                len: s.len(),
                expected: HEX_SIZE,
            });
        }

        s.bytes().enumerate().try_fold(0_u64, |acc, (position, byte)| {
            let digit = char::from(byte)
                .to_digit(16)
                .ok_or(CodecError::InvalidSymbol { byte, position })?;
            Ok((acc << 4) | u64::from(digit))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_zero_padded() {
        assert_eq!(HexEncoder.encode(0), "0000000000000000");
        assert_eq!(HexEncoder.encode(0xdead_beef), "00000000deadbeef");
        assert_eq!(HexEncoder.encode(u64::MAX), "ffffffffffffffff");
    }

    #[test]
    fn decodes_either_case() {
        assert_eq!(HexEncoder.decode("00000000DEADbeef"), Ok(0xdead_beef));
        assert_eq!(HexEncoder.decode("ffffffffffffffff"), Ok(u64::MAX));
    }

    #[test]
    fn rejects_signs_and_short_input() {
        assert_eq!(
            HexEncoder.decode("+00000000000000f"),
            Err(CodecError::InvalidSymbol {
                byte: b'+',
                position: 0
            })
        );
        assert_eq!(
            HexEncoder.decode("ff"),
            Err(CodecError::InvalidLength {
                len: 2,
                expected: 16
            })
        );
    }
}

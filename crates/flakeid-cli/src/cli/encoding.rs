use flakeid::{AlphabetEncoder, Base32Encoder, CodecError, Encoder, HexEncoder};

use super::config::Encoding;

/// Plain decimal, as printed by `u64::to_string`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecimalEncoder;

impl Encoder for DecimalEncoder {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn encode(&self, raw: u64) -> String {
        raw.to_string()
    }

    fn decode(&self, s: &str) -> Result<u64, CodecError> {
        if s.is_empty() {
            return Err(CodecError::Empty);
        }
        s.bytes().enumerate().try_fold(0_u64, |acc, (position, byte)| {
            if !byte.is_ascii_digit() {
                return Err(CodecError::InvalidSymbol { byte, position });
            }
            acc.checked_mul(10)
                .and_then(|acc| acc.checked_add(u64::from(byte - b'0')))
                .ok_or(CodecError::Overflow)
        })
    }
}

impl Encoding {
    pub fn encoder(self) -> Box<dyn Encoder> {
        match self {
            Self::Raw => Box::new(DecimalEncoder),
            Self::Hex => Box::new(HexEncoder),
            Self::Base32 => Box::new(Base32Encoder),
            Self::Base62 => Box::new(AlphabetEncoder::base62()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_rejects_signs_and_overflow() {
        assert_eq!(DecimalEncoder.decode("18446744073709551615"), Ok(u64::MAX));
        assert_eq!(
            DecimalEncoder.decode("18446744073709551616"),
            Err(CodecError::Overflow)
        );
        assert_eq!(
            DecimalEncoder.decode("+1"),
            Err(CodecError::InvalidSymbol {
                byte: b'+',
                position: 0
            })
        );
        assert_eq!(DecimalEncoder.decode(""), Err(CodecError::Empty));
    }

    #[test]
    fn every_encoding_round_trips() {
        for encoding in [
            Encoding::Raw,
            Encoding::Hex,
            Encoding::Base32,
            Encoding::Base62,
        ] {
            let encoder = encoding.encoder();
            let id = 7_271_397_162_311_786_496;
            assert_eq!(encoder.decode(&encoder.encode(id)), Ok(id), "{}", encoder.name());
        }
    }
}

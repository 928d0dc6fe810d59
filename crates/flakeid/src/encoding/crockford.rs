use crate::{CodecError, Encoder};

const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const NO_VALUE: u8 = 255;
const BITS_PER_CHAR: usize = 5;

/// Number of Crockford Base32 characters needed for 64 bits.
pub const BASE32_SIZE: usize = 64_usize.div_ceil(BITS_PER_CHAR);

/// Lookup table for Crockford base32 decoding
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0_u8;
    // Main alphabet, allow lower-case
    while i < 32 {
        let c = ALPHABET[i as usize];
        lut[c as usize] = i;
        if c.is_ascii_uppercase() {
            lut[(c + 32) as usize] = i; // lowercase letter
        }
        i += 1;
    }
    // Crockford-specific aliases
    lut[b'O' as usize] = 0;
    lut[b'o' as usize] = 0;
    lut[b'I' as usize] = 1;
    lut[b'i' as usize] = 1;
    lut[b'L' as usize] = 1;
    lut[b'l' as usize] = 1;
    lut
};

/// Fixed-width [Crockford Base32](https://www.crockford.com/base32.html).
///
/// Every identifier encodes to exactly [`BASE32_SIZE`] characters, so the
/// strings sort lexicographically in the same order as the integers. Decoding
/// is case-insensitive and accepts Crockford's aliases (`O` for `0`, `I`/`L`
/// for `1`).
///
/// # Example
///
/// ```
/// use flakeid::{Base32Encoder, Encoder};
///
/// let encoded = Base32Encoder.encode(2_424_242_424_242_424_242);
/// assert_eq!(encoded, "23953MG16DJDJ");
/// assert_eq!(Base32Encoder.decode("23953mg16djdj"), Ok(2_424_242_424_242_424_242));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Base32Encoder;

impl Encoder for Base32Encoder {
    fn name(&self) -> &'static str {
        "base32"
    }

    fn encode(&self, raw: u64) -> String {
        let mut buf = [0_u8; BASE32_SIZE];
        for (i, slot) in buf.iter_mut().enumerate() {
            // The first character holds the 4 leftover high bits.
            let shift = (BASE32_SIZE - 1 - i) * BITS_PER_CHAR;
            *slot = ALPHABET[((raw >> shift) & 0x1F) as usize];
        }
        buf.iter().map(|&b| char::from(b)).collect()
    }

    fn decode(&self, s: &str) -> Result<u64, CodecError> {
        if s.len() != BASE32_SIZE {
            return Err(CodecError::InvalidLength {
                len: s.len(),
                expected: BASE32_SIZE,
            });
        }

        let mut acc = 0_u64;
        for (position, &byte) in s.as_bytes().iter().enumerate() {
            let value = LOOKUP[byte as usize];
            if value == NO_VALUE {
                return Err(CodecError::InvalidSymbol { byte, position });
            }
            if acc > u64::MAX >> BITS_PER_CHAR {
                return Err(CodecError::Overflow);
            }
            acc = (acc << BITS_PER_CHAR) | u64::from(value);
        }
        Ok(acc)
    }
}

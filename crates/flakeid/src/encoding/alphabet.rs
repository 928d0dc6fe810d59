use crate::{CodecError, Encoder};

/// Digits, then upper case, then lower case: sorts like ASCII.
pub const BASE62_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const NO_VALUE: u8 = 255;

/// Positional encoding over an arbitrary ASCII alphabet.
///
/// Output has no leading zero symbols (zero itself encodes to one symbol), so
/// the encoding is injective and as short as possible. Strings are therefore
/// variable-length and do not sort like the integers.
///
/// # Example
///
/// ```
/// use flakeid::{AlphabetEncoder, Encoder};
///
/// let base62 = AlphabetEncoder::base62();
/// assert_eq!(base62.encode(61), "z");
/// assert_eq!(base62.encode(62), "10");
/// assert_eq!(base62.decode("10"), Ok(62));
///
/// let binary = AlphabetEncoder::new("01")?;
/// assert_eq!(binary.encode(5), "101");
/// # Ok::<(), flakeid::CodecError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphabetEncoder {
    name: &'static str,
    symbols: Vec<u8>,
    lookup: [u8; 256],
}

impl AlphabetEncoder {
    /// Builds an encoder over `alphabet`, where the symbol at index `i` has
    /// digit value `i`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidAlphabet`] unless `alphabet` has between 2
    /// and 255 symbols, all ASCII and all distinct.
    pub fn new(alphabet: &str) -> Result<Self, CodecError> {
        if !alphabet.is_ascii() {
            return Err(CodecError::InvalidAlphabet {
                reason: "symbols must be ASCII",
            });
        }
        if !(2..=255).contains(&alphabet.len()) {
            return Err(CodecError::InvalidAlphabet {
                reason: "alphabet needs between 2 and 255 symbols",
            });
        }

        let symbols = alphabet.as_bytes();
        let mut lookup = [NO_VALUE; 256];
        for (value, &symbol) in (0_u8..).zip(symbols) {
            if lookup[symbol as usize] != NO_VALUE {
                return Err(CodecError::InvalidAlphabet {
                    reason: "symbols must be distinct",
                });
            }
            lookup[symbol as usize] = value;
        }

        Ok(Self {
            name: "custom",
            symbols: symbols.to_vec(),
            lookup,
        })
    }

    /// The Base62 encoder over [`BASE62_ALPHABET`].
    pub fn base62() -> Self {
        let symbols = BASE62_ALPHABET.as_bytes();
        let mut lookup = [NO_VALUE; 256];
        for (value, &symbol) in (0_u8..).zip(symbols) {
            lookup[symbol as usize] = value;
        }
        Self {
            name: "base62",
            symbols: symbols.to_vec(),
            lookup,
        }
    }

    fn base(&self) -> u64 {
        self.symbols.len() as u64
    }
}

impl Default for AlphabetEncoder {
    fn default() -> Self {
        Self::base62()
    }
}

impl Encoder for AlphabetEncoder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn encode(&self, raw: u64) -> String {
        let base = self.base();
        let mut digits = Vec::with_capacity(64);
        let mut rest = raw;
        loop {
            digits.push(self.symbols[(rest % base) as usize]);
            rest /= base;
            if rest == 0 {
                break;
            }
        }
        digits.iter().rev().map(|&b| char::from(b)).collect()
    }

    fn decode(&self, s: &str) -> Result<u64, CodecError> {
        if s.is_empty() {
            return Err(CodecError::Empty);
        }

        let base = self.base();
        let mut acc = 0_u64;
        for (position, &byte) in s.as_bytes().iter().enumerate() {
            let value = self.lookup[byte as usize];
            if value == NO_VALUE {
                return Err(CodecError::InvalidSymbol { byte, position });
            }
            acc = acc
                .checked_mul(base)
                .and_then(|acc| acc.checked_add(u64::from(value)))
                .ok_or(CodecError::Overflow)?;
        }
        Ok(acc)
    }
}

/// Errors from decoding (or configuring) an [`crate::Encoder`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    #[error("empty input")]
    Empty,

    #[error("invalid length {len}, expected {expected}")]
    InvalidLength { len: usize, expected: usize },

    #[error("invalid symbol {byte:#04x} at position {position}")]
    InvalidSymbol { byte: u8, position: usize },

    /// The input encodes a value larger than [`u64::MAX`].
    #[error("decoded value overflows 64 bits")]
    Overflow,

    #[error("invalid alphabet: {reason}")]
    InvalidAlphabet { reason: &'static str },
}

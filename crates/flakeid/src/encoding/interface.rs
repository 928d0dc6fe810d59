use crate::CodecError;

/// Maps a raw identifier to and from a display string.
///
/// Implementations must be injective, and `decode(&encode(x)) == Ok(x)` must
/// hold for every `u64`. Generators never depend on a particular encoding.
pub trait Encoder {
    /// Stable name, for diagnostics.
    fn name(&self) -> &'static str;

    fn encode(&self, raw: u64) -> String;

    /// # Errors
    ///
    /// Returns a [`CodecError`] if `s` is not a string this encoder produces.
    fn decode(&self, s: &str) -> Result<u64, CodecError>;
}

impl<E: Encoder + ?Sized> Encoder for &E {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn encode(&self, raw: u64) -> String {
        (**self).encode(raw)
    }

    fn decode(&self, s: &str) -> Result<u64, CodecError> {
        (**self).decode(s)
    }
}

impl<E: Encoder + ?Sized> Encoder for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn encode(&self, raw: u64) -> String {
        (**self).encode(raw)
    }

    fn decode(&self, s: &str) -> Result<u64, CodecError> {
        (**self).decode(s)
    }
}

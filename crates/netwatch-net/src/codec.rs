//! Block decompression for compressed frames.

use std::fmt;

/// A decompression failure. Carries just enough context to log. A
/// decompression failure must never poison the flow - the caller drops
/// only the current frame.
#[derive(Debug)]
pub struct DecompressError(String);

impl fmt::Display for DecompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DecompressError {}

/// Decompress one Zstandard-compressed frame segment. Callers are
/// expected to trap this per-frame.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, DecompressError> {
    zstd::stream::decode_all(data).map_err(|e| DecompressError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_zstd() {
        let original = b"the quick brown fox jumps over the lazy dog".repeat(8);
        let compressed = zstd::stream::encode_all(original.as_slice(), 3).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn garbage_input_is_an_error_not_a_panic() {
        let garbage = [0xffu8; 16];
        assert!(decompress(&garbage).is_err());
    }
}

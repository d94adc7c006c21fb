//! Stable hashing for token ids and stub model features.
//!
//! Both the hashing tokenizer and the stub encoders must produce the same ids across runs and
//! platforms, so `std`'s randomized hasher is not an option here.

/// First 8 bytes of the BLAKE3 digest of `data`, little-endian.
///
/// Collisions at 64 bits are negligible for vocabulary-sized inputs; callers that fold the value
/// into a smaller range (token buckets, vector slots) accept the extra collisions that brings.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Maps a token to a bucket in `1..vocab_size`; `0` stays reserved for padding.
#[inline]
pub fn hash_token(token: &str, vocab_size: u32) -> u32 {
    debug_assert!(vocab_size > 1);
    let buckets = u64::from(vocab_size - 1);
    (hash_to_u64(token.as_bytes()) % buckets) as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_to_u64_deterministic() {
        assert_eq!(hash_to_u64(b"query"), hash_to_u64(b"query"));
        assert_ne!(hash_to_u64(b"query"), hash_to_u64(b"Query"));
    }

    #[test]
    fn test_hash_token_never_pad() {
        for token in ["a", "b", "hello", "世界", ""] {
            let id = hash_token(token, 2);
            assert_eq!(id, 1, "vocab of 2 leaves exactly one bucket");
        }
        for token in ["a", "b", "hello"] {
            let id = hash_token(token, 1 << 16);
            assert!(id >= 1 && id < 1 << 16);
        }
    }
}

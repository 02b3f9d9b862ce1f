//! The djb2 string hash.
//!
//! This is the single hash implementation shared by `litekv-table` (bucket
//! selection) and `litekv-store` (partition selection). Both must agree on
//! it bit-for-bit: the store's on-disk layout is only stable across restarts
//! and reimplementations because `partition(key) == djb2(key) mod 16` never
//! changes, so the algorithm (including the absolute-value step below) is
//! part of the external, compatibility-critical contract and must not be
//! swapped for a generic hasher crate.

/// Hashes `key` with djb2, seeded at 5381, and returns the absolute value of
/// the final machine-word result.
///
/// ```text
/// h <- 5381
/// for byte in key.as_bytes(): h <- h.wrapping_mul(33).wrapping_add(byte)
/// return |h|
/// ```
///
/// The multiply-add step wraps on overflow (this is expected and keeps the
/// function total over arbitrary-length input); the final `abs` is taken on
/// the signed reinterpretation of that wrapped word, exactly as specified.
pub fn djb2(key: &str) -> u64 {
    let mut hash: i64 = 5381;
    for byte in key.as_bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(*byte as i64);
    }
    hash.unsigned_abs()
}

/// Reduces a djb2 hash to a bucket/partition index for the given modulus.
pub fn bucket_index(key: &str, modulus: usize) -> usize {
    debug_assert!(modulus > 0, "modulus must be non-zero");
    (djb2(key) % modulus as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_hashes_to_seed() {
        assert_eq!(djb2(""), 5381);
    }

    #[test]
    fn deterministic_across_calls() {
        assert_eq!(djb2("key0"), djb2("key0"));
        assert_ne!(djb2("key0"), djb2("key1"));
    }

    #[test]
    fn bucket_index_is_stable() {
        let a = bucket_index("a/b+c=d", 16);
        let b = bucket_index("a/b+c=d", 16);
        assert_eq!(a, b);
        assert!(a < 16);
    }
}

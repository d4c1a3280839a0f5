//! Value hashing helpers
//!
//! Hashes only need to be stable within one process, so these are plain
//! mixing functions rather than a cryptographic or portable scheme.

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// FNV-1a over a byte slice
#[inline]
pub fn hash_bytes(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in bytes {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Fold a 64-bit value into 32 bits
#[inline]
pub const fn hash_u64(value: u64) -> u32 {
    (value as u32) ^ ((value >> 32) as u32)
}

/// Combine two hashes, order-sensitive
#[inline]
pub const fn hash_combine(seed: u32, hash: u32) -> u32 {
    seed ^ (hash
        .wrapping_add(0x9e37_79b9)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_bytes_known_values() {
        assert_eq!(hash_bytes(b""), FNV_OFFSET_BASIS);
        assert_eq!(hash_bytes(b"a"), 0xe40c_292c);
    }

    #[test]
    fn test_combine_is_order_sensitive() {
        let a = hash_combine(hash_combine(0, 1), 2);
        let b = hash_combine(hash_combine(0, 2), 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_u64_folds_both_halves() {
        assert_ne!(hash_u64(1), hash_u64(1 << 32 | 1));
        assert_eq!(hash_u64(7), 7);
    }
}

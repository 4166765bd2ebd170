pub const FNV_PRIME: u32 = 16777619;
pub const OFFSET_BASIS: u32 = 2166136261;

/// Performs a 32-bit FNV-1a hash over the given bytes.
///
/// This is a fast, non-cryptographic hash. Distinct inputs may collide
/// (the classic example being `"costarring"` and `"liquid"`), and any code
/// keyed by this hash has to tolerate that.
///
/// ## Example
/// ```
/// use talon_utils::fnv1a_hash;
///
/// let hash = fnv1a_hash(b"hello");
/// assert_eq!(hash, 0x4f9f2cab);
/// ```
pub fn fnv1a_hash(buffer: &[u8]) -> u32 {
    fnv1a_hash_seeded(buffer, 0)
}

/// Seeded variant of [`fnv1a_hash`]. The seed is folded into the offset
/// basis, so a zero seed yields the plain FNV-1a value.
///
/// ## Example
/// ```
/// use talon_utils::{fnv1a_hash, fnv1a_hash_seeded};
///
/// assert_eq!(fnv1a_hash_seeded(b"talon", 0), fnv1a_hash(b"talon"));
/// assert_eq!(fnv1a_hash_seeded(b"talon", 0xBEEF), 0xba680672);
/// ```
pub fn fnv1a_hash_seeded(buffer: &[u8], seed: u32) -> u32 {
    let mut result = OFFSET_BASIS ^ seed;
    for &byte in buffer {
        result ^= byte as u32;
        result = result.wrapping_mul(FNV_PRIME);
    }
    result
}

pub trait Fnv1aHashExt {
    /// Verifies if given string's FNV-1a hash matches this value.
    ///
    /// ## Example
    /// ```
    /// use talon_utils::Fnv1aHashExt;
    ///
    /// let hash: u32 = 0xe3a22597;
    /// assert!(hash.fnv1a_matches("talon"))
    /// ```
    fn fnv1a_matches(self, string: &str) -> bool;
}

impl Fnv1aHashExt for u32 {
    fn fnv1a_matches(self, string: &str) -> bool {
        fnv1a_hash(string.as_bytes()) == self
    }
}

//! General purpose utilities and shared data structures of the Talon engine

pub mod color;

pub mod fnv1a;
pub use fnv1a::fnv1a_hash;
pub use fnv1a::fnv1a_hash_seeded;
pub use fnv1a::Fnv1aHashExt;

mod smallstr;
pub use smallstr::*;

mod assoc;
pub use assoc::*;

mod buffer;
pub use buffer::*;

mod stream;
pub use stream::*;

pub type AnyResult<T = (), E = anyhow::Error> = anyhow::Result<T, E>;

/// Shorthand for `Ok(())`, cause it looks ugly
pub const fn ok<E>() -> Result<(), E> {
    Ok(())
}

/// Aligns the value. Alignment doesn't have to be a power of two.
///
/// ```
/// use talon_utils::align;
/// assert_eq!(16, align(10, 8));
/// ```
pub const fn align(n: u64, a: u64) -> u64 {
    (n + a - 1) / a * a
}

/// Rounds a requested capacity up to the next power of two minus one.
/// Used by the growable containers in this crate, which all reserve in
/// `2ⁿ - 1` steps.
///
/// ## Example
/// ```
/// use talon_utils::round_capacity;
/// assert_eq!(round_capacity(0), 0);
/// assert_eq!(round_capacity(3), 3);
/// assert_eq!(round_capacity(4), 7);
/// assert_eq!(round_capacity(120), 127);
/// ```
pub const fn round_capacity(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        (n + 1).next_power_of_two() - 1
    }
}

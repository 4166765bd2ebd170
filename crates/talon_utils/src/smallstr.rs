use crate::round_capacity;
use std::fmt;

/// Longest byte length that [`SmallStr`] stores without touching the heap.
pub const INLINE_CAP: usize = 23;

/// A growable string with small-string optimization.
///
/// Short values (up to [`INLINE_CAP`] bytes) live in an inline buffer, longer
/// ones in a heap allocation. The storage mode is an explicit enum
/// discriminant, so it can never drift out of sync with capacity bookkeeping,
/// and the transition to heap storage is one-directional.
///
/// Contents are always valid UTF-8; bounded copies clip at a character
/// boundary and stop at an interior NUL, which matters when names come from
/// fixed-size records.
///
/// ## Example
/// ```
/// use talon_utils::SmallStr;
///
/// let mut name = SmallStr::from("turret");
/// assert!(name.is_inline());
/// name.push_str("_with_a_very_long_suffix");
/// assert!(!name.is_inline());
/// assert!(name.starts_with("turret"));
/// ```
#[derive(Clone)]
pub struct SmallStr {
    repr: Repr,
}

#[derive(Clone)]
enum Repr {
    Inline { len: u8, buf: [u8; INLINE_CAP] },
    Heap(Vec<u8>),
}

impl SmallStr {
    /// Creates an empty, inline string.
    pub const fn new() -> Self {
        Self {
            repr: Repr::Inline {
                len: 0,
                buf: [0; INLINE_CAP],
            },
        }
    }

    /// Creates an empty string with at least the given capacity. Requests
    /// beyond [`INLINE_CAP`] allocate immediately.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut result = Self::new();
        result.reserve(capacity);
        result
    }

    /// Ensures the string can hold at least `capacity` bytes.
    ///
    /// No-op if the current capacity suffices. Otherwise the request is
    /// rounded up to the next power of two minus one; if the rounded value
    /// no longer fits the inline buffer, storage moves to the heap, carrying
    /// the existing bytes over unchanged. Heap storage never shrinks back
    /// to inline.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity <= self.capacity() {
            return;
        }
        let rounded = round_capacity(capacity);
        match &mut self.repr {
            Repr::Inline { len, buf } => {
                debug_assert!(rounded > INLINE_CAP);
                let mut vec = Vec::with_capacity(rounded);
                vec.extend_from_slice(&buf[..*len as usize]);
                self.repr = Repr::Heap(vec);
            }
            Repr::Heap(vec) => {
                vec.reserve(rounded - vec.len());
            }
        }
    }

    /// Replaces the contents with `src`.
    pub fn copy_from(&mut self, src: &str) {
        self.copy_from_truncated(src, src.len());
    }

    /// Replaces the contents with at most `limit` bytes of `src`.
    ///
    /// The copy clips at the last character boundary within `limit`, and
    /// stops early at an interior NUL if the source contains one.
    pub fn copy_from_truncated(&mut self, src: &str, limit: usize) {
        let src = clip(src, limit);
        self.clear();
        self.push_str(src);
    }

    /// Appends a string slice, growing storage as needed.
    pub fn push_str(&mut self, s: &str) {
        let new_len = self.len() + s.len();
        if let Repr::Inline { len, buf } = &mut self.repr {
            if new_len <= INLINE_CAP {
                buf[*len as usize..new_len].copy_from_slice(s.as_bytes());
                *len = new_len as u8;
                return;
            }
        }
        self.reserve(new_len);
        match &mut self.repr {
            Repr::Heap(vec) => vec.extend_from_slice(s.as_bytes()),
            // reserve() above transitioned to heap storage
            Repr::Inline { .. } => unreachable!(),
        }
    }

    /// Empties the string without changing its storage mode.
    pub fn clear(&mut self) {
        match &mut self.repr {
            Repr::Inline { len, .. } => *len = 0,
            Repr::Heap(vec) => vec.clear(),
        }
    }

    /// Returns a view of whichever storage is currently authoritative.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.repr {
            Repr::Inline { len, buf } => &buf[..*len as usize],
            Repr::Heap(vec) => vec,
        }
    }

    pub fn as_str(&self) -> &str {
        // Contents are only ever built from &str input
        debug_assert!(std::str::from_utf8(self.as_bytes()).is_ok());
        unsafe { std::str::from_utf8_unchecked(self.as_bytes()) }
    }

    /// Current length in bytes. O(1) in both storage modes.
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Inline { len, .. } => *len as usize,
            Repr::Heap(vec) => vec.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        match &self.repr {
            Repr::Inline { .. } => INLINE_CAP,
            Repr::Heap(vec) => vec.capacity(),
        }
    }

    /// Whether the string still uses its inline buffer.
    pub fn is_inline(&self) -> bool {
        matches!(self.repr, Repr::Inline { .. })
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.as_str().starts_with(prefix)
    }

    pub fn ends_with(&self, suffix: &str) -> bool {
        self.as_str().ends_with(suffix)
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.as_str().contains(needle)
    }
}

/// Clips `s` to at most `limit` bytes at a character boundary, cutting
/// before any interior NUL.
fn clip(s: &str, limit: usize) -> &str {
    let mut n = s.len().min(limit);
    while !s.is_char_boundary(n) {
        n -= 1;
    }
    let clipped = &s[..n];
    match clipped.find('\0') {
        Some(nul) => &clipped[..nul],
        None => clipped,
    }
}

impl Default for SmallStr {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SmallStr {
    fn from(value: &str) -> Self {
        let mut result = Self::new();
        result.copy_from(value);
        result
    }
}

impl fmt::Debug for SmallStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for SmallStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for SmallStr {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for SmallStr {}

impl PartialEq<str> for SmallStr {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for SmallStr {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_reserve_stays_inline() {
        let mut s = SmallStr::from("abc");
        s.reserve(10);
        assert!(s.is_inline());
        assert_eq!(s.capacity(), INLINE_CAP);
        assert_eq!(s, "abc");
    }

    #[test]
    fn large_reserve_moves_to_heap_and_preserves_bytes() {
        let mut s = SmallStr::from("short but precious");
        assert!(s.is_inline());

        s.reserve(INLINE_CAP + 1);
        assert!(!s.is_inline());
        assert_eq!(s, "short but precious");
        assert!(s.capacity() >= 31);

        // the transition is one-directional
        s.clear();
        assert!(!s.is_inline());
    }

    #[test]
    fn push_grows_across_the_threshold() {
        let mut s = SmallStr::new();
        for _ in 0..10 {
            s.push_str("abcd");
        }
        assert_eq!(s.len(), 40);
        assert!(!s.is_inline());
        assert_eq!(s, "abcdabcdabcdabcdabcdabcdabcdabcdabcdabcd");
    }

    #[test]
    fn truncating_copy_respects_limit_and_nul() {
        let mut s = SmallStr::new();
        s.copy_from_truncated("abcdef", 4);
        assert_eq!(s, "abcd");

        s.copy_from_truncated("ab\0cd", 5);
        assert_eq!(s, "ab");

        // never split a multibyte character
        s.copy_from_truncated("aé", 2);
        assert_eq!(s, "a");
    }

    #[test]
    fn ends_with_does_a_real_suffix_check() {
        let s = SmallStr::from("player_one");
        assert!(s.ends_with("_one"));
        assert!(!s.ends_with("_two"));
        assert!(s.starts_with("player"));
        assert!(s.contains("er_o"));
        assert!(!s.contains("xyz"));
    }
}

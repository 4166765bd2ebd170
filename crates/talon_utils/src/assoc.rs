use crate::fnv1a_hash_seeded;

/// An append-only association map from byte keys to values.
///
/// Keys are reduced to a seeded 32-bit FNV-1a hash; buckets are kept in
/// insertion order in a flat vector, and lookup is a linear scan over the
/// stored hashes. This trades asymptotics for simplicity — the intended use
/// is small maps (tens of entries) like resource-name registries, not large
/// key spaces.
///
/// [`AssocMap::insert`] never deduplicates: inserting the same key twice
/// leaves two buckets, and [`AssocMap::get`] returns the **first** match in
/// insertion order. First-insert-wins is the documented, deliberate
/// behavior. [`AssocMap::remove`] on the other hand deletes *every* bucket
/// whose key matches, so a removed key can never be shadowed back to life by
/// a stale duplicate.
///
/// ## Example
/// ```
/// use talon_utils::AssocMap;
///
/// let mut map = AssocMap::new();
/// map.insert(b"crosshair", 7u64);
/// map.insert(b"crosshair", 9u64);
///
/// assert_eq!(map.get(b"crosshair"), Some(&7)); // first insert wins
/// assert_eq!(map.remove(b"crosshair"), 2);
/// assert_eq!(map.get(b"crosshair"), None);
/// ```
#[derive(Debug, Clone)]
pub struct AssocMap<V> {
    seed: u32,
    buckets: Vec<Bucket<V>>,
}

#[derive(Debug, Clone)]
struct Bucket<V> {
    hash: u32,
    key: Box<[u8]>,
    value: V,
}

impl<V> AssocMap<V> {
    /// Creates an empty map with a zero hash seed.
    pub const fn new() -> Self {
        Self::with_seed(0)
    }

    /// Creates an empty map whose key hashes are folded with `seed`.
    pub const fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            buckets: Vec::new(),
        }
    }

    /// Appends a `(key, value)` bucket. Duplicate keys are not rejected;
    /// see the type docs for the resulting lookup semantics.
    pub fn insert(&mut self, key: &[u8], value: V) {
        let hash = self.hash_of(key);
        self.buckets.push(Bucket {
            hash,
            key: key.into(),
            value,
        });
    }

    /// Returns the first value whose key hash matches, in insertion order.
    /// Never mutates the map.
    ///
    /// Matching is by hash alone, so two colliding keys alias each other on
    /// lookup — acceptable for the small, trusted key sets this map is for.
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        let hash = self.hash_of(key);
        self.buckets
            .iter()
            .find(|bucket| bucket.hash == hash)
            .map(|bucket| &bucket.value)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        let hash = self.hash_of(key);
        self.buckets
            .iter_mut()
            .find(|bucket| bucket.hash == hash)
            .map(|bucket| &mut bucket.value)
    }

    /// Removes every bucket whose key equals `key`, compacting the storage
    /// while preserving the relative order of the survivors. Returns how
    /// many buckets were dropped.
    ///
    /// Removal compares the full key bytes, not just the hash, so deleting
    /// one of two hash-colliding keys leaves the other findable.
    pub fn remove(&mut self, key: &[u8]) -> usize {
        let hash = self.hash_of(key);
        let before = self.buckets.len();
        self.buckets
            .retain(|bucket| bucket.hash != hash || &*bucket.key != key);
        before - self.buckets.len()
    }

    /// Current bucket count, duplicates included.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Iterates `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &V)> {
        self.buckets
            .iter()
            .map(|bucket| (&*bucket.key, &bucket.value))
    }

    fn hash_of(&self, key: &[u8]) -> u32 {
        fnv1a_hash_seeded(key, self.seed)
    }
}

impl<V> Default for AssocMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mut map = AssocMap::new();
        map.insert(b"gravel", 1u32);
        map.insert(b"grass", 2);
        map.insert(b"water", 3);

        assert_eq!(map.len(), 3);
        assert_eq!(map.get(b"gravel"), Some(&1));
        assert_eq!(map.get(b"grass"), Some(&2));
        assert_eq!(map.get(b"water"), Some(&3));
        assert_eq!(map.get(b"lava"), None);
    }

    #[test]
    fn first_insert_wins() {
        let mut map = AssocMap::new();
        map.insert(b"skin", 10u32);
        map.insert(b"skin", 20);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(b"skin"), Some(&10));
    }

    #[test]
    fn remove_drops_all_duplicates_and_keeps_order() {
        let mut map = AssocMap::new();
        map.insert(b"a", 1u32);
        map.insert(b"b", 2);
        map.insert(b"a", 3);
        map.insert(b"c", 4);

        assert_eq!(map.remove(b"a"), 2);
        assert_eq!(map.get(b"a"), None);

        let remaining: Vec<_> = map.iter().map(|(_, &v)| v).collect();
        assert_eq!(remaining, [2, 4]);
    }

    #[test]
    fn removing_one_colliding_key_keeps_the_other() {
        // "costarring" and "liquid" share a 32-bit FNV-1a hash
        let mut map = AssocMap::new();
        map.insert(b"costarring", 1u32);
        map.insert(b"liquid", 2);

        assert_eq!(map.remove(b"costarring"), 1);
        assert_eq!(map.get(b"liquid"), Some(&2));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn seeded_maps_hash_independently() {
        let mut a = AssocMap::with_seed(1);
        let mut b = AssocMap::with_seed(2);
        a.insert(b"key", 1u32);
        b.insert(b"key", 2u32);
        assert_eq!(a.get(b"key"), Some(&1));
        assert_eq!(b.get(b"key"), Some(&2));
    }

    #[test]
    fn remove_missing_key_is_a_no_op() {
        let mut map: AssocMap<u32> = AssocMap::new();
        map.insert(b"present", 1);
        assert_eq!(map.remove(b"absent"), 0);
        assert_eq!(map.len(), 1);
    }
}

use rustc_hash::FxBuildHasher;

use super::HashBstMap;
use crate::raw::RawHashBst;

impl<K, V> HashBstMap<K, V, FxBuildHasher> {
    /// Creates an empty map with room for at least `capacity` entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use hash_bst::HashBstMap;
    ///
    /// let map: HashBstMap<i32, i32> = HashBstMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// assert!(map.capacity() >= 32);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, FxBuildHasher)
    }
}

impl<K, V, S> HashBstMap<K, V, S> {
    /// Creates an empty map with room for at least `capacity` entries, ordering keys with
    /// `hash_builder`.
    #[must_use]
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        HashBstMap {
            raw: RawHashBst::with_capacity(capacity),
            hash_builder,
        }
    }

    /// Returns the number of entries the map can hold before its node storage grows.
    ///
    /// Slots freed by removals are reused before new ones are allocated.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}

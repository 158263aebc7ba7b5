use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use core::ops::Index;

use alloc::vec::Vec;
use rustc_hash::FxBuildHasher;

use crate::Error;
use crate::raw::{Handle, RawHashBst};

mod capacity;
#[cfg(feature = "serde")]
mod serde_impls;
mod snapshot;

pub use snapshot::Snapshot;

/// A map backed by an unbalanced binary search tree ordered by the hash code of each key.
///
/// Keys are placed by `S::hash_one(&key)` rather than by [`Ord`]. Two consequences follow:
///
/// - Iteration visits entries in ascending hash order, not in key order.
/// - Keys whose hash codes collide share a single position. Inserting a key that collides
///   with a stored key replaces *both* the stored key and its value, and
///   [`len`](HashBstMap::len) stays the same.
///
/// The default hasher, [`FxBuildHasher`], is deterministic, so the same keys always produce
/// the same order (and a [persisted](crate::persist) map restores in the same order).
///
/// The tree is never rebalanced. Its depth is determined by insertion order alone: inserting
/// keys whose hashes arrive in ascending order produces a linked list. Every operation walks
/// the tree with a loop, so degenerate shapes cost time but never stack.
///
/// The map performs no internal synchronization. Mutation takes `&mut self`; sharing a map
/// between threads needs an external lock.
///
/// # Examples
///
/// ```
/// use hash_bst::HashBstMap;
///
/// let mut stock = HashBstMap::new();
/// stock.insert("apples", 3);
/// stock.insert("pears", 7);
///
/// assert_eq!(stock.get("apples"), Some(&3));
/// assert_eq!(stock.len(), 2);
///
/// // `insert` on an existing key replaces the entry in place.
/// assert_eq!(stock.insert("apples", 5), Some(3));
/// assert_eq!(stock.len(), 2);
///
/// assert_eq!(stock.remove("pears"), Some(7));
/// assert!(!stock.contains_key("pears"));
///
/// // Iteration follows the hash codes of the keys.
/// let hashes: Vec<u64> = stock.keys().map(|key| stock.hash_code(key)).collect();
/// assert!(hashes.is_sorted());
/// ```
pub struct HashBstMap<K, V, S = FxBuildHasher> {
    raw: RawHashBst<K, V>,
    hash_builder: S,
}

/// An iterator over the entries of a `HashBstMap`, in ascending hash order.
///
/// The order is fixed when the iterator is created.
///
/// This `struct` is created by the [`iter`] method on [`HashBstMap`].
///
/// [`iter`]: HashBstMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    raw: &'a RawHashBst<K, V>,
    order: alloc::vec::IntoIter<Handle>,
}

/// An owning iterator over the entries of a `HashBstMap`, in ascending hash order.
///
/// This `struct` is created by the [`into_iter`] method on [`HashBstMap`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the keys of a `HashBstMap`.
///
/// This `struct` is created by the [`keys`] method on [`HashBstMap`].
///
/// [`keys`]: HashBstMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of a `HashBstMap`.
///
/// This `struct` is created by the [`values`] method on [`HashBstMap`].
///
/// [`values`]: HashBstMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<K, V> HashBstMap<K, V, FxBuildHasher> {
    /// Makes a new, empty `HashBstMap` with the default hasher.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use hash_bst::HashBstMap;
    ///
    /// let mut map = HashBstMap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_hasher(FxBuildHasher)
    }
}

impl<K, V, S> HashBstMap<K, V, S> {
    /// Makes a new, empty `HashBstMap` that orders keys with `hash_builder`.
    ///
    /// Maps that are compared, persisted, or rebuilt from each other should use a
    /// deterministic hasher, otherwise the same keys come out in a different order.
    #[must_use]
    pub const fn with_hasher(hash_builder: S) -> Self {
        Self {
            raw: RawHashBst::new(),
            hash_builder,
        }
    }

    /// Returns a reference to the map's [`BuildHasher`].
    pub const fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use hash_bst::HashBstMap;
    ///
    /// let mut a = HashBstMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the map, dropping every entry.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of nodes on the longest path from the root to a leaf.
    ///
    /// An empty map has depth 0. Since the tree is not balanced, this ranges from
    /// `⌊log₂ n⌋ + 1` to `n` depending on insertion order.
    ///
    /// # Examples
    ///
    /// ```
    /// use hash_bst::HashBstMap;
    ///
    /// let mut map = HashBstMap::new();
    /// assert_eq!(map.depth(), 0);
    /// map.insert('a', 1);
    /// assert_eq!(map.depth(), 1);
    /// ```
    #[must_use]
    pub fn depth(&self) -> usize {
        self.raw.depth()
    }

    /// Gets an iterator over the entries of the map, in ascending hash order.
    ///
    /// The traversal runs once, when this is called.
    ///
    /// # Examples
    ///
    /// ```
    /// use hash_bst::HashBstMap;
    ///
    /// let map = HashBstMap::from([(3, "c"), (1, "a"), (2, "b")]);
    /// let mut previous = None;
    /// for (key, _) in map.iter() {
    ///     let hash = map.hash_code(key);
    ///     assert!(previous < Some(hash));
    ///     previous = Some(hash);
    /// }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw, self.raw.in_order())
    }

    /// Gets an iterator over the keys of the map, in ascending hash order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, ordered by the hash of their keys.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Entries parent-first. Reinserting them in this order rebuilds the same tree.
    pub(crate) fn pre_order(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw, self.raw.pre_order())
    }

    /// Copies the current entries into a cursor that later changes to the map do not affect.
    ///
    /// # Examples
    ///
    /// ```
    /// use hash_bst::HashBstMap;
    ///
    /// let mut map = HashBstMap::new();
    /// map.insert(1, 10);
    ///
    /// let mut snapshot = map.snapshot();
    /// map.insert(2, 20);
    ///
    /// assert_eq!(snapshot.current(), None);
    /// assert!(snapshot.advance());
    /// assert_eq!(snapshot.current(), Some((&1, &10)));
    /// assert!(!snapshot.advance());
    /// ```
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<K, V>
    where
        K: Clone,
        V: Clone,
    {
        #[cfg(feature = "tracing")]
        tracing::trace!(len = self.len(), "taking snapshot");
        Snapshot::new(self.iter().map(|(key, value)| (key.clone(), value.clone())).collect())
    }

    /// Bulk copy into a caller-provided buffer.
    ///
    /// Not supported: this always returns [`Error::Unsupported`]. Use [`iter`](Self::iter)
    /// or [`snapshot`](Self::snapshot) instead.
    ///
    /// # Errors
    ///
    /// Always.
    #[allow(clippy::unused_self)]
    pub fn copy_to(&self, _buffer: &mut [(K, V)], _offset: usize) -> Result<(), Error> {
        Err(Error::Unsupported { operation: "copy_to" })
    }
}

impl<K, V, S: BuildHasher> HashBstMap<K, V, S> {
    /// Returns the hash code that orders `key` in this map.
    ///
    /// Keys with equal hash codes occupy the same entry.
    pub fn hash_code<Q>(&self, key: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hash_builder.hash_one(key)
    }

    /// Returns a reference to the value stored at the position of `key`'s hash code.
    ///
    /// The key may be any borrowed form of the map's key type, but [`Hash`] on the borrowed
    /// form *must* match that of the key type.
    ///
    /// # Examples
    ///
    /// ```
    /// use hash_bst::HashBstMap;
    ///
    /// let mut map = HashBstMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        let handle = self.raw.find(self.hash_code(key))?;
        Some(self.raw.node(handle).value())
    }

    /// Returns the stored key and value at the position of `key`'s hash code.
    ///
    /// The stored key is the one most recently inserted there, which may differ from `key`
    /// when their hash codes collide.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        let node = self.raw.node(self.raw.find(self.hash_code(key))?);
        Some((node.key(), node.value()))
    }

    /// Returns a mutable reference to the value stored at the position of `key`'s hash code.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        let handle = self.raw.find(self.hash_code(key))?;
        Some(self.raw.node_mut(handle).value_mut())
    }

    /// Returns a clone of the value for `key`, or `V::default()` when it is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use hash_bst::HashBstMap;
    ///
    /// let mut map = HashBstMap::new();
    /// map.insert(1, 2);
    /// assert_eq!(map.get_or_default(&1), 2);
    /// assert_eq!(map.get_or_default(&2), 0);
    /// ```
    pub fn get_or_default<Q>(&self, key: &Q) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        V: Clone + Default,
    {
        self.get(key).cloned().unwrap_or_default()
    }

    /// Returns `true` if an entry is stored at the position of `key`'s hash code.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        self.raw.find(self.hash_code(key)).is_some()
    }

    /// Returns `true` if `key` is present and its stored value hashes the same as `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hash_bst::HashBstMap;
    ///
    /// let mut map = HashBstMap::new();
    /// map.insert(0, 0);
    /// assert!(map.contains_entry(&0, &0));
    /// assert!(!map.contains_entry(&0, &5));
    /// ```
    pub fn contains_entry<Q>(&self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        V: Hash,
    {
        self.get(key).is_some_and(|stored| self.hash_code(stored) == self.hash_code(value))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If an entry with the same hash code exists, its key and value are both replaced in
    /// place and the old value is returned. Nothing is ever rejected as a duplicate.
    ///
    /// # Examples
    ///
    /// ```
    /// use hash_bst::HashBstMap;
    ///
    /// let mut map = HashBstMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map[&37], "b");
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        K: Hash,
    {
        let hash = self.hash_code(&key);
        self.raw.insert(hash, key, value).map(|(_, previous)| previous)
    }

    /// Inserts or replaces an entry, discarding any previous value.
    ///
    /// # Examples
    ///
    /// ```
    /// use hash_bst::HashBstMap;
    ///
    /// let mut map = HashBstMap::new();
    /// map.set(1, 10);
    /// map.set(1, -10);
    /// map.set(2, 20);
    /// assert_eq!(map[&1], -10);
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn set(&mut self, key: K, value: V)
    where
        K: Hash,
    {
        self.insert(key, value);
    }

    /// Removes the entry at the position of `key`'s hash code, returning its value.
    ///
    /// Returns `None`, leaving the map unchanged, when there is no such entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use hash_bst::HashBstMap;
    ///
    /// let mut map = HashBstMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes the entry at the position of `key`'s hash code, returning the stored key and
    /// value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        let hash = self.hash_code(key);
        self.raw.remove(hash)
    }

    /// Removes `key` only if its stored value hashes the same as `value`.
    ///
    /// Returns `false`, leaving the entry intact, when the key is absent or the values differ.
    ///
    /// # Examples
    ///
    /// ```
    /// use hash_bst::HashBstMap;
    ///
    /// let mut map = HashBstMap::new();
    /// map.insert(1, 2);
    /// assert!(!map.remove_entry_if(&1, &1));
    /// assert!(map.remove_entry_if(&1, &2));
    /// assert!(map.is_empty());
    /// ```
    pub fn remove_entry_if<Q>(&mut self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
        V: Hash,
    {
        self.contains_entry(key, value) && self.remove_entry(key).is_some()
    }
}

impl<K: Clone, V: Clone, S: Clone> Clone for HashBstMap<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            hash_builder: self.hash_builder.clone(),
        }
    }
}

/// Two maps are equal when they hold equal entries in the same order.
impl<K: PartialEq, V: PartialEq, S> PartialEq for HashBstMap<K, V, S> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, S> Eq for HashBstMap<K, V, S> {}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for HashBstMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S: Default> Default for HashBstMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K: Hash, V, S: BuildHasher + Default> FromIterator<(K, V)> for HashBstMap<K, V, S> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K: Hash, V, S: BuildHasher> Extend<(K, V)> for HashBstMap<K, V, S> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K: Hash + Copy, V: Copy, S: BuildHasher> Extend<(&'a K, &'a V)> for HashBstMap<K, V, S> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        for (&key, &value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashBstMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V, S> IntoIterator for HashBstMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, in ascending hash order.
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<K, Q, V, S> Index<&Q> for HashBstMap<K, V, S>
where
    K: Borrow<Q>,
    Q: ?Sized + Hash,
    S: BuildHasher,
{
    type Output = V;

    /// Returns a reference to the value for `key`.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Hash, V, const N: usize> From<[(K, V); N]> for HashBstMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(raw: &'a RawHashBst<K, V>, order: Vec<Handle>) -> Self {
        Self {
            raw,
            order: order.into_iter(),
        }
    }

    fn entry(&self, handle: Handle) -> (&'a K, &'a V) {
        let node = self.raw.node(handle);
        (node.key(), node.value())
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let handle = self.order.next()?;
        Some(self.entry(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let handle = self.order.next_back()?;
        Some(self.entry(handle))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.order.len()
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw,
            order: self.order.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

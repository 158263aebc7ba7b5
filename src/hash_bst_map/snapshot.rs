use core::slice;

use alloc::vec::Vec;

/// A frozen, restartable cursor over a map's entries in ascending hash order.
///
/// The entries are copied out of the map when the snapshot is taken, so mutating the map
/// afterwards does not affect it. Take a new snapshot to observe the current contents.
///
/// The cursor starts *before* the first entry: [`current`](Snapshot::current) is `None`
/// until [`advance`](Snapshot::advance) has returned `true`, and again once it has returned
/// `false`.
///
/// This `struct` is created by the [`snapshot`] method on [`HashBstMap`].
///
/// # Examples
///
/// ```
/// use hash_bst::HashBstMap;
///
/// let map = HashBstMap::from([(1, 'a')]);
/// let mut snapshot = map.snapshot();
///
/// assert_eq!(snapshot.current(), None);
/// assert_eq!(snapshot.current_or_default(), (0, '\0'));
///
/// while snapshot.advance() {
///     let (key, value) = snapshot.current().unwrap();
///     assert_eq!((*key, *value), (1, 'a'));
/// }
///
/// snapshot.reset();
/// assert!(snapshot.advance());
/// ```
///
/// [`snapshot`]: crate::HashBstMap::snapshot
/// [`HashBstMap`]: crate::HashBstMap
#[derive(Clone, Debug)]
pub struct Snapshot<K, V> {
    entries: Vec<(K, V)>,
    // 0 is "before the first entry"; `n` is positioned on `entries[n - 1]`; past the end is
    // `entries.len() + 1`.
    cursor: usize,
}

impl<K, V> Snapshot<K, V> {
    pub(crate) const fn new(entries: Vec<(K, V)>) -> Self {
        Self { entries, cursor: 0 }
    }

    /// Moves to the next entry. Returns `false` once the entries are exhausted.
    pub fn advance(&mut self) -> bool {
        if self.cursor <= self.entries.len() {
            self.cursor += 1;
        }
        self.cursor <= self.entries.len()
    }

    /// Returns the entry under the cursor, or `None` before the first [`advance`] and after
    /// the last.
    ///
    /// [`advance`]: Snapshot::advance
    #[must_use]
    pub fn current(&self) -> Option<(&K, &V)> {
        let (key, value) = self.entries.get(self.cursor.checked_sub(1)?)?;
        Some((key, value))
    }

    /// Returns a clone of the entry under the cursor, or a pair of default values wherever
    /// [`current`](Snapshot::current) would return `None`.
    #[must_use]
    pub fn current_or_default(&self) -> (K, V)
    where
        K: Clone + Default,
        V: Clone + Default,
    {
        self.current()
            .map_or_else(Default::default, |(key, value)| (key.clone(), value.clone()))
    }

    /// Moves the cursor back before the first entry.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Returns the number of entries captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the snapshot was taken of an empty map.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns all captured entries, regardless of the cursor.
    #[must_use]
    pub fn as_slice(&self) -> &[(K, V)] {
        &self.entries
    }
}

impl<K, V> IntoIterator for Snapshot<K, V> {
    type Item = (K, V);
    type IntoIter = alloc::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a Snapshot<K, V> {
    type Item = &'a (K, V);
    type IntoIter = slice::Iter<'a, (K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn empty_snapshot_never_has_a_current_entry() {
        let mut snapshot: Snapshot<i32, i32> = Snapshot::new(Vec::new());
        assert_eq!(snapshot.current(), None);
        assert!(!snapshot.advance());
        assert_eq!(snapshot.current(), None);
        assert_eq!(snapshot.current_or_default(), (0, 0));
    }

    #[test]
    fn cursor_walks_then_stays_exhausted() {
        let mut snapshot = Snapshot::new(vec![(1, 'a'), (2, 'b')]);
        assert_eq!(snapshot.current(), None);

        assert!(snapshot.advance());
        assert_eq!(snapshot.current(), Some((&1, &'a')));
        assert!(snapshot.advance());
        assert_eq!(snapshot.current(), Some((&2, &'b')));

        assert!(!snapshot.advance());
        assert_eq!(snapshot.current(), None);
        assert!(!snapshot.advance());
        assert_eq!(snapshot.current_or_default(), (0, '\0'));
    }

    #[test]
    fn reset_restarts() {
        let mut snapshot = Snapshot::new(vec![(7, 70)]);
        while snapshot.advance() {}
        snapshot.reset();
        assert_eq!(snapshot.current(), None);
        assert!(snapshot.advance());
        assert_eq!(snapshot.current_or_default(), (7, 70));
    }

    #[test]
    fn iterating_ignores_the_cursor() {
        let mut snapshot = Snapshot::new(vec![(1, 1), (2, 4), (3, 9)]);
        snapshot.advance();
        assert_eq!((&snapshot).into_iter().count(), 3);
        assert_eq!(snapshot.as_slice().len(), snapshot.len());
        assert_eq!(snapshot.into_iter().map(|(_, v)| v).sum::<i32>(), 14);
    }
}

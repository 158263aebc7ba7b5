use super::handle::Handle;

/// A tree vertex.
///
/// `left` and `right` are the owning links: a node is reachable from the root only through
/// them. `parent` is a plain back-reference used for navigation and reparenting.
#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    key: K,
    value: V,
    // Cached `BuildHasher::hash_one(&key)`; this is the ordering key of the tree.
    hash: u64,
    parent: Option<Handle>,
    left: Option<Handle>,
    right: Option<Handle>,
}

impl<K, V> Node<K, V> {
    /// Creates a detached node.
    pub(crate) const fn new(hash: u64, key: K, value: V) -> Self {
        Self {
            key,
            value,
            hash,
            parent: None,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) const fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub(crate) const fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) const fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    #[inline]
    pub(crate) const fn parent(&self) -> Option<Handle> {
        self.parent
    }

    #[inline]
    pub(crate) const fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) const fn right(&self) -> Option<Handle> {
        self.right
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    pub(crate) fn set_left(&mut self, left: Option<Handle>) {
        self.left = left;
    }

    pub(crate) fn set_right(&mut self, right: Option<Handle>) {
        self.right = right;
    }

    /// Returns the child slot a node with `hash` belongs in: `true` for left.
    #[inline]
    pub(crate) const fn goes_left(&self, hash: u64) -> bool {
        hash < self.hash
    }

    /// Points the child slot selected by `child_hash` at `child`.
    pub(crate) fn set_child_for(&mut self, child_hash: u64, child: Option<Handle>) {
        if self.goes_left(child_hash) {
            self.left = child;
        } else {
            self.right = child;
        }
    }

    /// Swaps in a new key and value with the same hash, keeping position and links.
    pub(crate) fn replace_entry(&mut self, key: K, value: V) -> (K, V) {
        let key = core::mem::replace(&mut self.key, key);
        let value = core::mem::replace(&mut self.value, value);
        (key, value)
    }

    pub(crate) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn new_node_is_detached() {
        let node = Node::new(7, "seven", 7);
        assert_eq!(node.hash(), 7);
        assert!(node.parent().is_none());
        assert!(node.left().is_none());
        assert!(node.right().is_none());
    }

    #[test]
    fn equal_hash_goes_right() {
        let mut node = Node::new(10, (), ());
        let child = Handle::from_slot(3);

        node.set_child_for(10, Some(child));
        assert_eq!(node.right(), Some(child));
        assert!(node.left().is_none());

        node.set_child_for(9, Some(child));
        assert_eq!(node.left(), Some(child));
    }

    #[test]
    fn replace_entry_keeps_links() {
        let mut node = Node::new(1, "old", 10);
        node.set_parent(Some(Handle::from_slot(0)));
        node.set_left(Some(Handle::from_slot(1)));
        node.set_right(Some(Handle::from_slot(2)));

        assert_eq!(node.replace_entry("new", 20), ("old", 10));
        assert_eq!(*node.key(), "new");
        assert_eq!(*node.value(), 20);
        assert_eq!(node.parent(), Some(Handle::from_slot(0)));
        assert_eq!(node.left(), Some(Handle::from_slot(1)));
        assert_eq!(node.right(), Some(Handle::from_slot(2)));
        assert_eq!(node.into_entry(), ("new", 20));
    }
}

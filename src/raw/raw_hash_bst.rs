use core::cmp::Ordering;

use alloc::vec::Vec;
use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::Node;

/// Traversal stack. Deep enough for most trees built from shuffled input without spilling.
type Stack = SmallVec<[Handle; 32]>;

/// The core tree backing `HashBstMap`.
///
/// Every operation here works on precomputed hash codes; hashing keys is the map's job.
/// The tree is never rebalanced, so its shape depends only on insertion order.
#[derive(Clone)]
pub(crate) struct RawHashBst<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K, V>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Number of live nodes.
    len: usize,
}

impl<K, V> RawHashBst<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Drops the root and with it every node.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    #[cfg(test)]
    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.nodes.get_mut(handle)
    }

    /// Descends from the root to the node holding `hash`.
    pub(crate) fn find(&self, hash: u64) -> Option<Handle> {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match hash.cmp(&node.hash()) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
            };
        }
        None
    }

    /// Inserts an entry, or replaces the key and value of the node already holding `hash`.
    ///
    /// A replacement keeps the node's position and children, so neither the shape of the tree
    /// nor its length changes. The displaced entry is returned.
    pub(crate) fn insert(&mut self, hash: u64, key: K, value: V) -> Option<(K, V)> {
        let Some(mut current) = self.root else {
            self.root = Some(self.nodes.alloc(Node::new(hash, key, value)));
            self.len = 1;
            return None;
        };

        loop {
            let node = self.nodes.get_mut(current);
            let next = match hash.cmp(&node.hash()) {
                Ordering::Equal => return Some(node.replace_entry(key, value)),
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
            };

            match next {
                Some(child) => current = child,
                None => {
                    let leaf = self.nodes.alloc(Node::new(hash, key, value));
                    self.nodes.get_mut(leaf).set_parent(Some(current));
                    self.nodes.get_mut(current).set_child_for(hash, Some(leaf));
                    self.len += 1;
                    return None;
                }
            }
        }
    }

    /// Unlinks the node holding `hash` and returns its entry.
    pub(crate) fn remove(&mut self, hash: u64) -> Option<(K, V)> {
        let target = self.find(hash)?;
        let node = self.nodes.get(target);
        let (parent, left, right) = (node.parent(), node.left(), node.right());
        let was_root = self.root == Some(target);

        let replacement = match (left, right) {
            (None, None) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(hash, "removing leaf");
                self.reparent(target, None);
                None
            }
            (Some(child), None) | (None, Some(child)) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(hash, "removing node with one child");
                self.reparent(child, parent);
                Some(child)
            }
            (Some(left), Some(right)) => Some(self.splice_successor(parent, left, right)),
        };

        if was_root {
            self.root = replacement;
        }

        let (key, value) = self.nodes.take(target).into_entry();
        self.len -= 1;
        debug_assert_eq!(self.nodes.len(), self.len);
        Some((key, value))
    }

    /// Moves the in-order successor of a two-child node into that node's position.
    ///
    /// `parent`, `left` and `right` are the removed node's links. Returns the successor.
    fn splice_successor(&mut self, parent: Option<Handle>, left: Handle, right: Handle) -> Handle {
        if self.nodes.get(right).left().is_none() {
            #[cfg(feature = "tracing")]
            tracing::trace!("right child is the successor");
            self.set_left_child(right, Some(left));
            self.reparent(right, parent);
            return right;
        }

        #[cfg(feature = "tracing")]
        tracing::trace!("successor is deeper than the right child");
        let successor = self.leftmost(right);
        self.set_left_child(successor, Some(left));

        let successor_node = self.nodes.get(successor);
        if let Some(successor_right) = successor_node.right() {
            // The successor sits in its parent's left slot; its right subtree takes that slot.
            let successor_parent = successor_node
                .parent()
                .expect("`RawHashBst::splice_successor()` - successor below the right child has no parent!");
            self.set_left_child(successor_parent, Some(successor_right));
        }

        self.reparent(successor, parent);

        // Everything in `right` sorts after the successor; link it without comparing hashes.
        self.nodes.get_mut(right).set_parent(Some(successor));
        self.nodes.get_mut(successor).set_right(Some(right));
        successor
    }

    /// Replaces `parent`'s left child with `child`, keeping back-references consistent.
    ///
    /// The previous left child, if any, loses its parent link.
    pub(crate) fn set_left_child(&mut self, parent: Handle, child: Option<Handle>) {
        if let Some(previous) = self.nodes.get(parent).left() {
            self.nodes.get_mut(previous).set_parent(None);
        }
        if let Some(child) = child {
            self.nodes.get_mut(child).set_parent(Some(parent));
        }
        self.nodes.get_mut(parent).set_left(child);
    }

    /// Detaches `node` from its current parent and attaches it under `new_parent`.
    ///
    /// Both the slot that is cleared and the slot that is filled are picked by comparing
    /// `node`'s hash with the respective parent's hash.
    pub(crate) fn reparent(&mut self, node: Handle, new_parent: Option<Handle>) {
        let moving = self.nodes.get(node);
        let hash = moving.hash();

        if let Some(old_parent) = moving.parent() {
            self.nodes.get_mut(old_parent).set_child_for(hash, None);
        }

        self.nodes.get_mut(node).set_parent(new_parent);

        if let Some(new_parent) = new_parent {
            self.nodes.get_mut(new_parent).set_child_for(hash, Some(node));
        }
    }

    fn leftmost(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.nodes.get(handle).left() {
            handle = left;
        }
        handle
    }

    /// Returns every node handle in ascending hash order.
    pub(crate) fn in_order(&self) -> Vec<Handle> {
        let mut order = Vec::with_capacity(self.len);
        let mut stack = Stack::new();
        let mut current = self.root;

        loop {
            while let Some(handle) = current {
                stack.push(handle);
                current = self.nodes.get(handle).left();
            }
            let Some(handle) = stack.pop() else {
                break;
            };
            order.push(handle);
            current = self.nodes.get(handle).right();
        }

        order
    }

    /// Returns every node handle parent-first. Inserting entries in this order into an empty
    /// tree rebuilds the same shape.
    pub(crate) fn pre_order(&self) -> Vec<Handle> {
        let mut order = Vec::with_capacity(self.len);
        let mut stack: Stack = self.root.into_iter().collect();

        while let Some(handle) = stack.pop() {
            order.push(handle);
            let node = self.nodes.get(handle);
            stack.extend(node.right());
            stack.extend(node.left());
        }

        order
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub(crate) fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: SmallVec<[(Handle, usize); 32]> = self.root.map(|root| (root, 1)).into_iter().collect();

        while let Some((handle, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let node = self.nodes.get(handle);
            stack.extend(node.left().map(|left| (left, depth + 1)));
            stack.extend(node.right().map(|right| (right, depth + 1)));
        }

        deepest
    }

    /// Empties the tree, returning its entries in ascending hash order.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let order = self.in_order();
        let entries = order.into_iter().map(|handle| self.nodes.take(handle).into_entry()).collect();
        self.clear();
        entries
    }
}

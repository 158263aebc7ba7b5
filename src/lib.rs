//! A map ordered by the hash codes of its keys, stored in an unbalanced binary search tree.
//!
//! This crate provides [`HashBstMap`], a dictionary with the familiar map operations
//! (lookup, upsert, removal, ordered iteration) and a whole-map persistence format:
//!
//! - [`insert`](HashBstMap::insert) is an upsert: an entry whose key hashes the same as a
//!   stored key replaces it in place and never fails as a duplicate.
//! - [`iter`](HashBstMap::iter), [`keys`](HashBstMap::keys) and [`values`](HashBstMap::values)
//!   visit entries in ascending hash order.
//! - [`snapshot`](HashBstMap::snapshot) copies the entries into a restartable
//!   [`Snapshot`] cursor that later mutations do not affect.
//! - [`persist`] frames the map with a small header and encodes it with `postcard`.
//!
//! # Example
//!
//! ```
//! use hash_bst::HashBstMap;
//!
//! let mut tree = HashBstMap::new();
//! tree.insert(2, 2);
//! tree.insert(1, 1);
//! tree.insert(3, 3);
//! assert_eq!(tree.len(), 3);
//!
//! assert_eq!(tree.remove(&2), Some(2));
//! assert_eq!(tree.len(), 2);
//! assert!(!tree.contains_key(&2));
//! assert!(tree.contains_key(&1) && tree.contains_key(&3));
//! assert_eq!(tree.remove(&2), None);
//! ```
//!
//! # Ordering by hash code
//!
//! The tree is searched by `S::hash_one(&key)`, where `S` is the map's [`BuildHasher`]
//! ([`rustc_hash::FxBuildHasher`] by default). Distinct keys with equal hash codes are treated
//! as the same key. Supply a different hasher with [`HashBstMap::with_hasher`].
//!
//! # Features
//!
//! - **`std`** *(default)*: enables the [`persist`] module (`std::io` streams and files).
//! - **`serde`** *(default)*: `Serialize`/`Deserialize` for [`HashBstMap`].
//! - **`tracing`** *(default)*: `trace!`/`debug!` events from deletion, snapshots and
//!   persistence. No subscriber is installed.
//!
//! Without `std` the crate is `no_std` and only requires `alloc`.
//!
//! [`BuildHasher`]: core::hash::BuildHasher

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod error;
mod raw;

pub mod hash_bst_map;
#[cfg(all(feature = "std", feature = "serde"))]
pub mod persist;

pub use error::Error;
pub use hash_bst_map::{HashBstMap, Snapshot};

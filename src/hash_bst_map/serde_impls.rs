use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::HashBstMap;

// Caps the preallocation a length prefix from untrusted input can request.
const MAX_PREALLOCATED_ENTRIES: usize = 4096;

/// Serializes as a map whose entries are listed parent-first, so that deserializing
/// (which inserts in the listed order) rebuilds an identical tree.
impl<K: Serialize, V: Serialize, H> Serialize for HashBstMap<K, V, H> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.pre_order())
    }
}

impl<'de, K, V, H> Deserialize<'de> for HashBstMap<K, V, H>
where
    K: Deserialize<'de> + Hash,
    V: Deserialize<'de>,
    H: BuildHasher + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(MapVisitor { marker: PhantomData })
    }
}

struct MapVisitor<K, V, H> {
    marker: PhantomData<fn() -> HashBstMap<K, V, H>>,
}

impl<'de, K, V, H> Visitor<'de> for MapVisitor<K, V, H>
where
    K: Deserialize<'de> + Hash,
    V: Deserialize<'de>,
    H: BuildHasher + Default,
{
    type Value = HashBstMap<K, V, H>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let capacity = access.size_hint().unwrap_or(0).min(MAX_PREALLOCATED_ENTRIES);
        let mut map = HashBstMap::with_capacity_and_hasher(capacity, H::default());
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn postcard_round_trip_keeps_shape() {
        let map: HashBstMap<u32, i64> = (0..200u32).map(|key| (key, -i64::from(key))).collect();

        let bytes = postcard::to_allocvec(&map).unwrap();
        let restored: HashBstMap<u32, i64> = postcard::from_bytes(&bytes).unwrap();
        restored.validate_invariants();

        assert_eq!(restored, map);
        assert_eq!(restored.depth(), map.depth());
    }

    #[test]
    fn entries_are_written_parent_first() {
        let map: HashBstMap<u8, u8> = [(3, 0), (1, 0), (2, 0)].into_iter().collect();
        let first: Vec<u8> = map.pre_order().map(|(&key, _)| key).collect();
        assert_eq!(first[0], 3);

        let bytes = postcard::to_allocvec(&map).unwrap();
        // Length prefix, then the root entry.
        assert_eq!(&bytes[..3], &[3, 3, 0]);
    }
}

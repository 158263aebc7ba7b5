//! Whole-map persistence.
//!
//! A snapshot is a small header followed by the `postcard` encoding of a [`HashBstMap`]:
//!
//! | bytes | content                               |
//! |-------|---------------------------------------|
//! | 0..4  | magic, `b"HBST"`                      |
//! | 4     | format version                        |
//! | 5..9  | payload length, big-endian `u32`      |
//! | 9..   | payload                               |
//!
//! Bytes after the payload are ignored. Entries are stored parent-first, so a restored map
//! has the same entries, order and shape as the one that was saved.
//!
//! Decoding always builds a new map; a failed load never touches an existing one.

use std::fs::{File, OpenOptions};
use std::hash::{BuildHasher, Hash};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::string::{String, ToString};
use std::vec::Vec;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::HashBstMap;

/// Error type for persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Postcard serialization error: {0}")]
    Postcard(#[from] postcard::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid snapshot format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported snapshot version: {version} (max supported: {max_supported})")]
    UnsupportedVersion { version: u8, max_supported: u8 },
}

pub type Result<T> = std::result::Result<T, PersistError>;

/// Magic bytes at the start of every snapshot.
pub const SNAPSHOT_MAGIC: &[u8; 4] = b"HBST";

/// Version written by [`serialize`].
pub const SNAPSHOT_VERSION: u8 = 1;

const HEADER_LEN: usize = 9;

/// Encodes `map` into a framed snapshot.
///
/// # Errors
///
/// Returns [`PersistError::Postcard`] if a key or value fails to serialize, and
/// [`PersistError::InvalidFormat`] if the payload does not fit the `u32` length field.
pub fn serialize<K, V, S>(map: &HashBstMap<K, V, S>) -> Result<Vec<u8>>
where
    K: Serialize,
    V: Serialize,
{
    let payload = postcard::to_allocvec(map)?;
    let len = u32::try_from(payload.len())
        .map_err(|_| PersistError::InvalidFormat(std::format!("Payload too large: {} bytes", payload.len())))?;

    let mut data = Vec::with_capacity(HEADER_LEN + payload.len());
    data.extend_from_slice(SNAPSHOT_MAGIC);
    data.push(SNAPSHOT_VERSION);
    data.extend_from_slice(&len.to_be_bytes());
    data.extend_from_slice(&payload);

    #[cfg(feature = "tracing")]
    tracing::debug!(entries = map.len(), bytes = data.len(), "serialized snapshot");

    Ok(data)
}

/// Decodes a framed snapshot into a new map.
///
/// # Errors
///
/// Returns [`PersistError::InvalidFormat`] for a short, truncated, or foreign buffer,
/// [`PersistError::UnsupportedVersion`] for a newer format, and [`PersistError::Postcard`]
/// if the payload does not decode.
pub fn deserialize<K, V, S>(data: &[u8]) -> Result<HashBstMap<K, V, S>>
where
    K: DeserializeOwned + Hash,
    V: DeserializeOwned,
    S: BuildHasher + Default,
{
    let payload = payload(data).inspect_err(|error| {
        #[cfg(feature = "tracing")]
        tracing::warn!(%error, bytes = data.len(), "rejected snapshot");
        #[cfg(not(feature = "tracing"))]
        let _ = error;
    })?;

    let map: HashBstMap<K, V, S> = postcard::from_bytes(payload)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(entries = map.len(), bytes = data.len(), "deserialized snapshot");

    Ok(map)
}

/// Validates the header and returns the payload it frames.
fn payload(data: &[u8]) -> Result<&[u8]> {
    if data.len() < HEADER_LEN {
        return Err(PersistError::InvalidFormat("Data too short for header".to_string()));
    }

    if &data[0..4] != SNAPSHOT_MAGIC {
        return Err(PersistError::InvalidFormat("Invalid magic bytes".to_string()));
    }

    let version = data[4];
    if version != SNAPSHOT_VERSION {
        return Err(PersistError::UnsupportedVersion {
            version,
            max_supported: SNAPSHOT_VERSION,
        });
    }

    let len_bytes = [data[5], data[6], data[7], data[8]];
    let len = u32::from_be_bytes(len_bytes) as usize;

    data.get(HEADER_LEN..HEADER_LEN + len)
        .ok_or_else(|| PersistError::InvalidFormat("Data truncated".to_string()))
}

/// Writes a snapshot of `map` to `writer`.
///
/// # Errors
///
/// See [`serialize`]; I/O failures are returned as [`PersistError::Io`].
pub fn write_snapshot<K, V, S, W>(map: &HashBstMap<K, V, S>, mut writer: W) -> Result<()>
where
    K: Serialize,
    V: Serialize,
    W: Write,
{
    let data = serialize(map)?;
    writer.write_all(&data)?;
    writer.flush()?;
    Ok(())
}

/// Reads a snapshot from `reader` until end of stream.
///
/// # Errors
///
/// See [`deserialize`]; I/O failures are returned as [`PersistError::Io`].
pub fn read_snapshot<K, V, S, R>(mut reader: R) -> Result<HashBstMap<K, V, S>>
where
    K: DeserializeOwned + Hash,
    V: DeserializeOwned,
    S: BuildHasher + Default,
    R: Read,
{
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    deserialize(&data)
}

/// A seekable stream that holds one snapshot at its start.
///
/// Every [`save`](SnapshotStore::save) and [`load`](SnapshotStore::load) rewinds to the
/// beginning first. Saving never truncates: the length prefix makes leftovers from a longer,
/// earlier snapshot harmless.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
///
/// use hash_bst::HashBstMap;
/// use hash_bst::persist::SnapshotStore;
///
/// let mut map = HashBstMap::new();
/// map.insert(1, 2);
/// map.insert(31, 22);
/// map.insert(15, 6);
///
/// let mut store = SnapshotStore::new(Cursor::new(Vec::new()));
/// store.save(&map)?;
///
/// let restored: HashBstMap<i32, i32> = store.load()?;
/// assert_eq!(restored, map);
/// # Ok::<(), hash_bst::persist::PersistError>(())
/// ```
#[derive(Debug)]
pub struct SnapshotStore<T> {
    stream: T,
}

impl SnapshotStore<File> {
    /// Opens `path` for reading and writing, creating an empty file if it does not exist.
    ///
    /// The file handle is closed when the store is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Io`] if the file cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        Ok(Self::new(file))
    }
}

impl<T: Read + Write + Seek> SnapshotStore<T> {
    /// Wraps a caller-supplied stream.
    pub const fn new(stream: T) -> Self {
        Self { stream }
    }

    /// Writes a snapshot of `map` at the start of the stream.
    ///
    /// # Errors
    ///
    /// See [`write_snapshot`].
    pub fn save<K, V, S>(&mut self, map: &HashBstMap<K, V, S>) -> Result<()>
    where
        K: Serialize,
        V: Serialize,
    {
        self.stream.seek(SeekFrom::Start(0))?;
        write_snapshot(map, &mut self.stream)
    }

    /// Reads the snapshot at the start of the stream into a new map.
    ///
    /// # Errors
    ///
    /// See [`read_snapshot`].
    pub fn load<K, V, S>(&mut self) -> Result<HashBstMap<K, V, S>>
    where
        K: DeserializeOwned + Hash,
        V: DeserializeOwned,
        S: BuildHasher + Default,
    {
        self.stream.seek(SeekFrom::Start(0))?;
        read_snapshot(&mut self.stream)
    }

    /// Returns the underlying stream.
    pub fn into_inner(self) -> T {
        self.stream
    }
}

use thiserror::Error;

/// Errors returned by [`HashBstMap`](crate::HashBstMap) operations.
///
/// Lookups and removals report a missing key with `Option` or `bool`, never with this type.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// The operation is permanently unavailable on this map type.
    #[error("`{operation}` is not supported by HashBstMap")]
    Unsupported { operation: &'static str },
}

mod arena;
mod handle;
mod node;
mod raw_hash_bst;

pub(crate) use handle::Handle;
pub(crate) use raw_hash_bst::RawHashBst;

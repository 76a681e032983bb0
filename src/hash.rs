//! 64-bit content hashing for the deduplicator (spec §4.6).
//!
//! The rest of this lineage reaches for `fnv` whenever it needs a fast
//! hash of opaque byte keys (bundle paths, in `bundles::database`); the
//! same crate does the job here for accessor/bufferView/mesh/material
//! fingerprints. `FnvHasher` only exposes the `Hasher` trait, so this
//! wraps it in a couple of free functions that hash a byte slice or a
//! sequence of `u64` key fields to a `u64` digest.

use std::hash::Hasher;

use fnv::FnvHasher;

pub fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(bytes);
    hasher.finish()
}

/// Hashes a tuple of `u64` key fields (e.g. a mesh's accessor ids + material id)
/// without allocating an intermediate buffer.
pub fn hash_u64_tuple(fields: &[u64]) -> u64 {
    let mut hasher = FnvHasher::default();
    for f in fields {
        hasher.write_u64(*f);
    }
    hasher.finish()
}

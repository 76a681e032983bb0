//! Content-addressed `hash -> id` memoization for bufferViews, accessors,
//! meshes, materials, and textures (spec §4.6).
//!
//! One `DedupTable` per category; each bucket is keyed by the fast FNV
//! hash of the candidate's canonical byte encoding (raw bytes for
//! bufferViews, a packed key tuple for meshes/materials/textures) and
//! resolves collisions by comparing the actual bytes, per spec. Disabling
//! dedup (`enabled: false`) makes every lookup a miss, so the writer
//! always allocates a fresh id — the map is simply never consulted.

use std::collections::HashMap;

use crate::hash::hash_bytes;

#[derive(Default)]
struct DedupTable {
    buckets: HashMap<u64, Vec<(Vec<u8>, u32)>>,
}

impl DedupTable {
    /// `id` is the index the item would get if this turns out to be new
    /// (the target vec's current length) — the caller only pushes when
    /// `is_new` comes back true, which keeps the id valid.
    fn get_or_insert(&mut self, key: &[u8], id: u32) -> (u32, bool) {
        let hash = hash_bytes(key);
        let bucket = self.buckets.entry(hash).or_default();
        if let Some((_, existing)) = bucket.iter().find(|(k, _)| k.as_slice() == key) {
            return (*existing, false);
        }
        bucket.push((key.to_vec(), id));
        (id, true)
    }
}

#[derive(Default)]
pub struct Deduplicator {
    enabled: bool,
    buffer_views: DedupTable,
    accessors: DedupTable,
    meshes: DedupTable,
    materials: DedupTable,
    textures: DedupTable,
}

impl Deduplicator {
    pub fn new(enabled: bool) -> Self {
        Deduplicator { enabled, ..Default::default() }
    }

    fn dispatch(&mut self, table: fn(&mut Self) -> &mut DedupTable, key: &[u8], id: u32) -> (u32, bool) {
        if !self.enabled {
            return (id, true);
        }
        table(self).get_or_insert(key, id)
    }

    pub fn buffer_view(&mut self, key: &[u8], id: u32) -> (u32, bool) {
        self.dispatch(|s| &mut s.buffer_views, key, id)
    }

    pub fn accessor(&mut self, key: &[u8], id: u32) -> (u32, bool) {
        self.dispatch(|s| &mut s.accessors, key, id)
    }

    pub fn mesh(&mut self, key: &[u8], id: u32) -> (u32, bool) {
        self.dispatch(|s| &mut s.meshes, key, id)
    }

    pub fn material(&mut self, key: &[u8], id: u32) -> (u32, bool) {
        self.dispatch(|s| &mut s.materials, key, id)
    }

    pub fn texture(&mut self, key: &[u8], id: u32) -> (u32, bool) {
        self.dispatch(|s| &mut s.textures, key, id)
    }
}

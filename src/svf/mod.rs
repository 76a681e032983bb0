//! The decoded form of one SVF viewable (spec §3).
//!
//! `SVF`, `Fragment`, `GeometryMetadata` and friends are plain data here —
//! all the parsing lives in [`reader`]. This mirrors how `fdm::container`
//! keeps `Section` as inert data and puts the byte-wrangling in
//! `DieselContainer`/`read_section`.

pub mod fetcher;
pub mod placeholder;
pub mod reader;

use std::collections::HashMap;

use crate::binary::Transform;

pub use fetcher::{AssetFetcher, FetchError, LocalDirFetcher};
pub use reader::{SvfManifest, SvfReader};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
    NegX,
    NegY,
    NegZ,
}

#[derive(Clone, Debug)]
pub struct Metadata {
    /// Scale from the source distance unit to meters.
    pub distance_unit_scale: f64,
    pub world_bbox: Option<(vek::Vec3<f64>, vek::Vec3<f64>)>,
    pub up_axis: Option<Axis>,
    pub front_axis: Option<Axis>,
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata {
            distance_unit_scale: 1.0,
            world_bbox: None,
            up_axis: None,
            front_axis: None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Fragment {
    pub dbid: u32,
    pub geometry_index: u32,
    pub material_index: u32,
    pub transform: Transform,
    pub bbox: (vek::Vec3<f32>, vek::Vec3<f32>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveType {
    Triangles,
    Lines,
    Points,
}

#[derive(Clone, Copy, Debug)]
pub struct GeometryMetadata {
    pub pack_id: u32,
    pub entity_index: u32,
    pub primitive_type: PrimitiveType,
}

/// A triangle-mesh entity: interleaved vertex buffer, optional normals,
/// per-UV-channel buffers, optional per-vertex colors, 16-bit indices.
#[derive(Clone, Debug, Default)]
pub struct MeshEntity {
    /// `xyz` interleaved, `len % 3 == 0`.
    pub vertices: Vec<f32>,
    /// Same length as `vertices` when present.
    pub normals: Option<Vec<f32>>,
    /// One `Vec<f32>` per UV channel, `(u,v)` pairs matching vertex count.
    pub uvs: Vec<Vec<f32>>,
    /// `rgba` interleaved, 4 floats per vertex, when present.
    pub colors: Option<Vec<f32>>,
    pub indices: Vec<u16>,
    pub bbox_min: [f32; 3],
    pub bbox_max: [f32; 3],
}

/// A polyline entity: positions + indices, optional per-vertex color.
#[derive(Clone, Debug, Default)]
pub struct LineEntity {
    pub vertices: Vec<f32>,
    pub colors: Option<Vec<f32>>,
    pub indices: Vec<u16>,
    pub bbox_min: [f32; 3],
    pub bbox_max: [f32; 3],
}

/// A point-cloud entity: positions, optional per-vertex color.
#[derive(Clone, Debug, Default)]
pub struct PointEntity {
    pub vertices: Vec<f32>,
    pub colors: Option<Vec<f32>>,
    pub bbox_min: [f32; 3],
    pub bbox_max: [f32; 3],
}

#[derive(Clone, Debug)]
pub enum MeshPackEntity {
    Mesh(MeshEntity),
    Lines(LineEntity),
    Points(PointEntity),
}

/// Ordered array of entities decoded from one mesh-pack packfile.
#[derive(Clone, Debug, Default)]
pub struct MeshPack {
    pub entities: Vec<MeshPackEntity>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[derive(Clone, Debug)]
pub struct SimplePhong {
    pub diffuse: Rgba,
    pub opacity: f32,
    /// SVF "glossiness"; `None` when the material omits it (§4.5/§9).
    pub glossiness: Option<f32>,
    pub diffuse_map: Option<String>,
}

/// Definitions other than `SimplePhong` are read but downgraded: carried
/// opaquely for logging, never emitted to glTF (§9 Design notes).
#[derive(Clone, Debug)]
pub enum Material {
    SimplePhong(SimplePhong),
    Unknown { definition: String },
}

#[derive(Clone, Debug, Default)]
pub struct ImageSet {
    images: HashMap<String, Vec<u8>>,
}

impl ImageSet {
    pub fn insert(&mut self, uri: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(uri.into(), bytes);
    }

    pub fn get(&self, uri: &str) -> Option<&[u8]> {
        self.images.get(uri).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.images.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Svf {
    pub metadata: Metadata,
    pub fragments: Vec<Fragment>,
    pub geometry_metadata: Vec<GeometryMetadata>,
    pub mesh_packs: Vec<MeshPack>,
    pub materials: Vec<Material>,
    pub images: ImageSet,
}

impl Svf {
    pub fn resolve_geometry(&self, geometry_index: u32) -> Option<&MeshPackEntity> {
        let meta = self.geometry_metadata.get(geometry_index as usize)?;
        let pack = self.mesh_packs.get(meta.pack_id as usize)?;
        pack.entities.get(meta.entity_index as usize)
    }
}

//! IMF: the codec-neutral, read-only scene graph shared between the SVF
//! reader and the glTF writer (spec §3/§4.4).
//!
//! Kept a separate module from both `svf` and `gltf` on purpose — it's
//! the seam the teacher's `fdm`/`bundles` split models for a different
//! pair of formats: inert data types plus a thin conversion layer, no
//! format-specific parsing logic leaking across the boundary.

pub mod adapter;

pub use adapter::SvfToImfAdapter;

use crate::svf::Rgba;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decomposed {
    pub translation: vek::Vec3<f32>,
    /// Quaternion, `xyzw`.
    pub rotation: [f32; 4],
    pub scale: vek::Vec3<f32>,
}

impl Default for Decomposed {
    fn default() -> Self {
        Decomposed {
            translation: vek::Vec3::zero(),
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: vek::Vec3::one(),
        }
    }
}

impl Decomposed {
    pub fn is_identity_translation(&self) -> bool {
        self.translation == vek::Vec3::zero()
    }

    pub fn is_identity_rotation(&self) -> bool {
        self.rotation == [0.0, 0.0, 0.0, 1.0]
    }

    pub fn is_identity_scale(&self) -> bool {
        self.scale == vek::Vec3::one()
    }
}

/// `(I4)` 16 floats, column-major.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transform {
    Matrix([f32; 16]),
    Decomposed(Decomposed),
}

#[derive(Clone, Debug, Default)]
pub struct MeshGeometry {
    pub indices: Vec<u16>,
    pub vertices: Vec<f32>,
    pub normals: Option<Vec<f32>>,
    pub uvs: Vec<Vec<f32>>,
    pub colors: Option<Vec<f32>>,
    pub bbox_min: [f32; 3],
    pub bbox_max: [f32; 3],
}

impl MeshGeometry {
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }
    pub fn normals(&self) -> Option<&[f32]> {
        self.normals.as_deref()
    }
    pub fn uvs(&self, channel: usize) -> Option<&[f32]> {
        self.uvs.get(channel).map(Vec::as_slice)
    }
    pub fn colors(&self) -> Option<&[f32]> {
        self.colors.as_deref()
    }
}

#[derive(Clone, Debug, Default)]
pub struct LinesGeometry {
    pub indices: Vec<u16>,
    pub vertices: Vec<f32>,
    pub colors: Option<Vec<f32>>,
    pub bbox_min: [f32; 3],
    pub bbox_max: [f32; 3],
}

impl LinesGeometry {
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }
    pub fn colors(&self) -> Option<&[f32]> {
        self.colors.as_deref()
    }
}

#[derive(Clone, Debug, Default)]
pub struct PointsGeometry {
    pub vertices: Vec<f32>,
    pub colors: Option<Vec<f32>>,
    pub bbox_min: [f32; 3],
    pub bbox_max: [f32; 3],
}

impl PointsGeometry {
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }
    pub fn colors(&self) -> Option<&[f32]> {
        self.colors.as_deref()
    }
}

#[derive(Clone, Debug, Default)]
pub enum Geometry {
    Mesh(MeshGeometry),
    Lines(LinesGeometry),
    Points(PointsGeometry),
    #[default]
    Empty,
}

#[derive(Clone, Debug, Default)]
pub struct Maps {
    pub diffuse: Option<String>,
}

/// `scale` is the material-level UV scale glTF's `KHR_texture_transform`
/// would carry; nothing in this pipeline populates it, so it is always
/// `None`, but the field is part of the scene model's declared shape.
#[derive(Clone, Debug)]
pub struct Physical {
    pub diffuse: Rgba,
    pub metallic: f32,
    pub roughness: f32,
    pub opacity: f32,
    pub maps: Maps,
    pub scale: Option<vek::Vec2<f32>>,
}

#[derive(Clone, Debug)]
pub enum Node {
    Group { dbid: Option<u32>, children: Vec<usize>, transform: Option<Transform> },
    Object { dbid: u32, geometry_id: usize, material_id: usize, transform: Option<Transform> },
    Camera { transform: Option<Transform> },
    Light { transform: Option<Transform> },
}

/// Declarative, read-only interface writers consume; implemented by
/// [`SvfToImfAdapter`] today, but any reader that can produce this shape
/// can drive the same `GltfWriter`.
pub trait Scene {
    fn node_count(&self) -> usize;
    fn node(&self, index: usize) -> &Node;

    fn geometry_count(&self) -> usize;
    fn geometry(&self, index: usize) -> &Geometry;

    fn material_count(&self) -> usize;
    fn material(&self, index: usize) -> &Physical;

    fn image(&self, uri: &str) -> Option<&[u8]>;

    fn metadata(&self) -> &crate::svf::Metadata;
}

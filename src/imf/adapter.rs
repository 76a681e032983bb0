//! Exposes a decoded [`Svf`] as an [`imf::Scene`](super::Scene) (spec §4.4).
//!
//! Fragments become a **flat** list of `Object` nodes — SVF's dbID tree
//! lives in the external property database, not here, so there is no
//! hierarchy to reconstruct. The writer is the one that wraps this flat
//! set in the root/xform ancestor pair (§4.5).

use vek::Vec3;

use crate::binary::Transform as SvfTransform;
use crate::svf::{Material as SvfMaterial, MeshPackEntity, Svf};

use super::{Decomposed, Geometry, LinesGeometry, Maps, MeshGeometry, Node, Physical, PointsGeometry, Scene, Transform};

pub struct SvfToImfAdapter<'a> {
    svf: &'a Svf,
    nodes: Vec<Node>,
    geometries: Vec<Geometry>,
    materials: Vec<Physical>,
    /// Returned by `geometry()`/`material()` when a fragment's index is
    /// out of range — e.g. `parse_materials` (reader.rs) drops malformed
    /// material groups, desyncing the dense indices (I1) fragments
    /// reference. Degrades gracefully instead of panicking (§7).
    fallback_geometry: Geometry,
    fallback_material: Physical,
}

impl<'a> SvfToImfAdapter<'a> {
    pub fn new(svf: &'a Svf) -> Self {
        let materials = svf.materials.iter().map(material_to_physical).collect();

        let geometries = (0..svf.geometry_metadata.len() as u32)
            .map(|i| entity_to_geometry(svf.resolve_geometry(i)))
            .collect();

        let nodes = svf.fragments.iter().map(fragment_to_object).collect();

        SvfToImfAdapter {
            svf,
            nodes,
            geometries,
            materials,
            fallback_geometry: Geometry::Empty,
            fallback_material: default_physical(),
        }
    }
}

impl<'a> Scene for SvfToImfAdapter<'a> {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    fn geometry(&self, index: usize) -> &Geometry {
        self.geometries.get(index).unwrap_or_else(|| {
            log::warn!("geometry index {index} is out of range ({} geometries); emitting an empty geometry", self.geometries.len());
            &self.fallback_geometry
        })
    }

    fn material_count(&self) -> usize {
        self.materials.len()
    }

    fn material(&self, index: usize) -> &Physical {
        self.materials.get(index).unwrap_or_else(|| {
            log::warn!("material index {index} is out of range ({} materials); emitting a default material", self.materials.len());
            &self.fallback_material
        })
    }

    fn image(&self, uri: &str) -> Option<&[u8]> {
        self.svf.images.get(uri)
    }

    fn metadata(&self) -> &crate::svf::Metadata {
        &self.svf.metadata
    }
}

fn fragment_to_object(fragment: &crate::svf::Fragment) -> Node {
    Node::Object {
        dbid: fragment.dbid,
        geometry_id: fragment.geometry_index as usize,
        material_id: fragment.material_index as usize,
        transform: Some(transform_to_imf(fragment.transform)),
    }
}

fn transform_to_imf(transform: SvfTransform) -> Transform {
    match transform {
        SvfTransform::Translation(t) => Transform::Decomposed(Decomposed {
            translation: vec3_f64_to_f32(t),
            ..Decomposed::default()
        }),
        SvfTransform::RotationTranslation { rotation, translation } => Transform::Decomposed(Decomposed {
            translation: vec3_f64_to_f32(translation),
            rotation: [rotation.x, rotation.y, rotation.z, rotation.w],
            ..Decomposed::default()
        }),
        SvfTransform::Scaled { scale, rotation, translation } => Transform::Decomposed(Decomposed {
            translation: vec3_f64_to_f32(translation),
            rotation: [rotation.x, rotation.y, rotation.z, rotation.w],
            scale: Vec3::new(scale, scale, scale),
        }),
        SvfTransform::Linear { linear, translation } => {
            let m = linear.0;
            Transform::Matrix([
                m[0], m[3], m[6], 0.0,
                m[1], m[4], m[7], 0.0,
                m[2], m[5], m[8], 0.0,
                translation.x as f32, translation.y as f32, translation.z as f32, 1.0,
            ])
        }
    }
}

fn vec3_f64_to_f32(v: crate::binary::Vector3) -> Vec3<f32> {
    Vec3::new(v.x as f32, v.y as f32, v.z as f32)
}

fn entity_to_geometry(entity: Option<&MeshPackEntity>) -> Geometry {
    match entity {
        None => Geometry::Empty,
        Some(MeshPackEntity::Mesh(m)) => Geometry::Mesh(MeshGeometry {
            indices: m.indices.clone(),
            vertices: m.vertices.clone(),
            normals: m.normals.clone(),
            uvs: m.uvs.clone(),
            colors: m.colors.clone(),
            bbox_min: m.bbox_min,
            bbox_max: m.bbox_max,
        }),
        Some(MeshPackEntity::Lines(l)) => Geometry::Lines(LinesGeometry {
            indices: l.indices.clone(),
            vertices: l.vertices.clone(),
            colors: l.colors.clone(),
            bbox_min: l.bbox_min,
            bbox_max: l.bbox_max,
        }),
        Some(MeshPackEntity::Points(p)) => Geometry::Points(PointsGeometry {
            vertices: p.vertices.clone(),
            colors: p.colors.clone(),
            bbox_min: p.bbox_min,
            bbox_max: p.bbox_max,
        }),
    }
}

/// `roughness = clamp(1 - glossiness, 0, 1)`, the experimental mapping
/// spec'd as an open question; glossiness is assumed normalized to
/// `0.0..=1.0` (the source never documents a scale, unlike opacity/diffuse
/// which are explicitly `0..1`).
fn material_to_physical(material: &SvfMaterial) -> Physical {
    match material {
        SvfMaterial::SimplePhong(p) => Physical {
            diffuse: p.diffuse,
            metallic: 0.0,
            roughness: p.glossiness.map(|g| (1.0 - g).clamp(0.0, 1.0)).unwrap_or(1.0),
            opacity: p.opacity,
            maps: Maps { diffuse: p.diffuse_map.clone() },
            scale: None,
        },
        SvfMaterial::Unknown { definition } => {
            log::warn!("material definition \"{definition}\" is not SimplePhong, emitting a default material");
            default_physical()
        }
    }
}

/// Flat black, fully opaque, no texture — the material emitted in place
/// of one that can't be resolved (an `Unknown` definition, or a dangling
/// material index; see `SvfToImfAdapter::fallback_material`).
fn default_physical() -> Physical {
    Physical {
        diffuse: crate::svf::Rgba { r: 0.0, g: 0.0, b: 0.0, a: 1.0 },
        metallic: 0.0,
        roughness: 1.0,
        opacity: 1.0,
        maps: Maps::default(),
        scale: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::{Matrix3x3, Quaternion, Vector3};
    use crate::svf::{Fragment, GeometryMetadata, ImageSet, Material, MeshEntity, MeshPack, Metadata, PrimitiveType, Rgba, SimplePhong};

    fn sample_svf() -> Svf {
        Svf {
            metadata: Metadata::default(),
            fragments: vec![
                Fragment {
                    dbid: 7,
                    geometry_index: 0,
                    material_index: 0,
                    transform: SvfTransform::Linear {
                        linear: Matrix3x3([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]),
                        translation: Vector3 { x: 5.0, y: 0.0, z: 0.0 },
                    },
                    bbox: (Vec3::zero(), Vec3::one()),
                },
            ],
            geometry_metadata: vec![GeometryMetadata { pack_id: 0, entity_index: 0, primitive_type: PrimitiveType::Triangles }],
            mesh_packs: vec![MeshPack {
                entities: vec![crate::svf::MeshPackEntity::Mesh(MeshEntity {
                    vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                    indices: vec![0, 1, 2],
                    ..Default::default()
                })],
            }],
            materials: vec![Material::SimplePhong(SimplePhong {
                diffuse: Rgba { r: 1.0, g: 0.0, b: 0.0, a: 1.0 },
                opacity: 1.0,
                glossiness: None,
                diffuse_map: None,
            })],
            images: ImageSet::default(),
        }
    }

    #[test]
    fn type_3_transform_matches_fixture() {
        let svf = sample_svf();
        let adapter = SvfToImfAdapter::new(&svf);
        match adapter.node(0) {
            Node::Object { transform: Some(Transform::Matrix(m)), .. } => {
                let expected = [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 5.0, 0.0, 0.0, 1.0];
                for (a, b) in m.iter().zip(expected.iter()) {
                    approx::assert_relative_eq!(*a, *b);
                }
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn flat_node_list_has_one_entry_per_fragment() {
        let svf = sample_svf();
        let adapter = SvfToImfAdapter::new(&svf);
        assert_eq!(adapter.node_count(), 1);
        match adapter.node(0) {
            Node::Object { dbid, geometry_id, material_id, .. } => {
                assert_eq!(*dbid, 7);
                assert_eq!(*geometry_id, 0);
                assert_eq!(*material_id, 0);
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn unresolved_geometry_becomes_empty() {
        let mut svf = sample_svf();
        svf.mesh_packs.clear();
        let adapter = SvfToImfAdapter::new(&svf);
        assert!(matches!(adapter.geometry(0), Geometry::Empty));
    }

    /// A fragment's `material_index`/`geometry_index` can exceed the dense
    /// table lengths when `parse_materials` drops malformed groups
    /// upstream (reader.rs); out-of-range lookups must degrade to a
    /// fallback value instead of panicking.
    #[test]
    fn out_of_range_indices_degrade_instead_of_panicking() {
        let svf = sample_svf();
        let adapter = SvfToImfAdapter::new(&svf);

        assert!(matches!(adapter.geometry(99), Geometry::Empty));

        let fallback = adapter.material(99);
        assert_eq!(fallback.diffuse, Rgba { r: 0.0, g: 0.0, b: 0.0, a: 1.0 });
        assert_eq!(fallback.opacity, 1.0);
    }
}

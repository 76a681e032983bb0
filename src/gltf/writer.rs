//! Streams an [`imf::Scene`](crate::imf::Scene) out as a glTF 2.0 manifest
//! plus one or more binary buffers (spec §4.5).
//!
//! Grounded in `landaire-wowsunpack`'s `export::gltf_export` for the
//! `gltf-json` usage pattern (`Root::push`-style index bookkeeping,
//! `Checked::Valid`, `USize64`) — that exporter embeds everything in one
//! GLB, where this writer instead streams external `*.NN.bin` files and
//! adds the buffer-rotation/dedup/filtering machinery the spec calls for.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;
use vek::Vec3;

use crate::error::WriteError;
use crate::imf::{Geometry, LinesGeometry, MeshGeometry, Node, PointsGeometry, Scene, Transform as ImfTransform};
use crate::svf::Metadata;

use super::dedup::Deduplicator;

const IDENTITY_MATRIX: [f32; 16] =
    [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0];

#[derive(Clone, Debug)]
pub struct WriterConfig {
    pub deduplicate: bool,
    pub skip_unused_uvs: bool,
    pub center: bool,
    pub reorient: bool,
    pub max_buffer_size: u32,
    pub filter_db_ids: Option<HashSet<u32>>,
    pub ignore_meshes: bool,
    pub ignore_lines: bool,
    pub ignore_points: bool,
    /// Dump the source SVF metadata to `output.metadata.json` alongside
    /// the manifest (§6 output layout: optional).
    pub dump_metadata: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            deduplicate: false,
            skip_unused_uvs: false,
            center: false,
            reorient: true,
            max_buffer_size: 5 * 1024 * 1024,
            filter_db_ids: None,
            ignore_meshes: false,
            ignore_lines: false,
            ignore_points: false,
            dump_metadata: false,
        }
    }
}

pub struct GltfWriter {
    out_dir: PathBuf,
    config: WriterConfig,
}

impl GltfWriter {
    pub fn new(out_dir: impl Into<PathBuf>, config: WriterConfig) -> Self {
        GltfWriter { out_dir: out_dir.into(), config }
    }

    pub fn write(&self, scene: &dyn Scene) -> Result<(), WriteError> {
        let mut session = Session::new(self.config.clone());
        session.build(scene);
        session.finalize(&self.out_dir)
    }
}

/// Appends raw bytes into a sequence of in-memory buffers, rotating to a
/// new one whenever the next append would cross `max_buffer_size` —
/// checked *before* the write, never mid-accessor (§4.5/§9).
struct BufferState {
    buffers: Vec<Vec<u8>>,
    max_size: u64,
}

impl BufferState {
    fn new(max_size: u32) -> Self {
        BufferState { buffers: vec![Vec::new()], max_size: max_size as u64 }
    }

    fn reserve(&mut self, additional: usize) {
        let cur = self.buffers.last().unwrap();
        if !cur.is_empty() && (cur.len() as u64 + additional as u64) > self.max_size {
            self.buffers.push(Vec::new());
        }
    }

    fn append(&mut self, bytes: &[u8]) -> (u32, usize, usize) {
        self.reserve(bytes.len());
        let index = (self.buffers.len() - 1) as u32;
        let buf = self.buffers.last_mut().unwrap();
        let offset = buf.len();
        buf.extend_from_slice(bytes);
        (index, offset, bytes.len())
    }

    fn pad_current_to(&mut self, align: usize) {
        let buf = self.buffers.last_mut().unwrap();
        while buf.len() % align != 0 {
            buf.push(0);
        }
    }
}

struct Session {
    config: WriterConfig,
    root: json::Root,
    buffers: BufferState,
    dedup: Deduplicator,
    materials_cache: HashMap<usize, json::Index<json::Material>>,
    images_to_copy: Vec<(String, Vec<u8>)>,
    metadata_dump: Option<serde_json::Value>,
}

impl Session {
    fn new(config: WriterConfig) -> Self {
        let dedup = Deduplicator::new(config.deduplicate);
        let buffers = BufferState::new(config.max_buffer_size);
        Session {
            config,
            root: json::Root::default(),
            buffers,
            dedup,
            materials_cache: HashMap::new(),
            images_to_copy: Vec::new(),
            metadata_dump: None,
        }
    }

    fn build(&mut self, scene: &dyn Scene) {
        self.root.asset = json::Asset {
            version: "2.0".to_string(),
            generator: Some("svf2gltf".to_string()),
            ..Default::default()
        };

        if self.config.dump_metadata {
            self.metadata_dump = Some(metadata_dump_json(scene.metadata()));
        }

        let reorient_matrix = reorientation_matrix(scene.metadata(), self.config.reorient);
        let center_translation = if self.config.center { compute_center(scene.metadata()) } else { None };

        let mut leaf_ids = Vec::new();
        for i in 0..scene.node_count() {
            if let Some(leaf) = self.build_leaf_node(scene, i) {
                leaf_ids.push(leaf);
            }
        }

        let xform_node = self.push_node(json::Node {
            name: Some("xform".to_string()),
            translation: center_translation,
            children: if leaf_ids.is_empty() { None } else { Some(leaf_ids) },
            ..Default::default()
        });

        let root_node = self.push_node(json::Node {
            name: Some("root".to_string()),
            matrix: if reorient_matrix == IDENTITY_MATRIX { None } else { Some(reorient_matrix) },
            children: Some(vec![xform_node]),
            ..Default::default()
        });

        let scene_index = self.root.scenes.len() as u32;
        self.root.scenes.push(json::Scene {
            nodes: vec![root_node],
            name: None,
            extensions: Default::default(),
            extras: Default::default(),
        });
        self.root.scene = Some(json::Index::new(scene_index));
    }

    fn push_node(&mut self, node: json::Node) -> json::Index<json::Node> {
        let id = self.root.nodes.len() as u32;
        self.root.nodes.push(node);
        json::Index::new(id)
    }

    fn build_leaf_node(&mut self, scene: &dyn Scene, node_index: usize) -> Option<json::Index<json::Node>> {
        let Node::Object { dbid, geometry_id, material_id, transform } = scene.node(node_index) else {
            return None;
        };
        let dbid = *dbid;
        let geometry_id = *geometry_id;
        let material_id = *material_id;
        let transform = *transform;

        if let Some(filter) = &self.config.filter_db_ids {
            if !filter.contains(&dbid) {
                return None;
            }
        }

        let geometry = scene.geometry(geometry_id);
        let mesh = if self.geometry_is_emittable(geometry) {
            let physical = scene.material(material_id);
            let samples_uv = material_samples_uv(physical, scene);
            let material = self.build_material(material_id, scene);
            self.build_primitive(geometry, material, samples_uv).map(|p| self.push_mesh(p))
        } else {
            None
        };
        if mesh.is_none() {
            log::warn!("fragment dbid={dbid} has no emitted mesh; leaving node without a `mesh` attribute");
        }

        let mut node = json::Node {
            name: Some(dbid.to_string()),
            mesh,
            ..Default::default()
        };
        if let Some(t) = transform {
            let (translation, rotation, scale, matrix) = imf_transform_to_node_fields(t);
            node.translation = translation;
            node.rotation = rotation;
            node.scale = scale;
            node.matrix = matrix;
        }

        Some(self.push_node(node))
    }

    fn build_material(&mut self, scene_material_id: usize, scene: &dyn Scene) -> json::Index<json::Material> {
        if let Some(id) = self.materials_cache.get(&scene_material_id) {
            return *id;
        }

        let physical = scene.material(scene_material_id);
        let key = material_key_bytes(physical);
        let id_guess = self.root.materials.len() as u32;
        let (id, is_new) = self.dedup.material(&key, id_guess);

        if is_new {
            let base_color_texture = physical.maps.diffuse.as_ref().and_then(|uri| self.build_texture(uri, scene));
            let alpha_mode = if physical.opacity < 1.0 {
                json::material::AlphaMode::Blend
            } else {
                json::material::AlphaMode::Opaque
            };
            self.root.materials.push(json::Material {
                pbr_metallic_roughness: json::material::PbrMetallicRoughness {
                    base_color_factor: json::material::PbrBaseColorFactor([
                        physical.diffuse.r,
                        physical.diffuse.g,
                        physical.diffuse.b,
                        physical.diffuse.a,
                    ]),
                    base_color_texture,
                    metallic_factor: json::material::StrengthFactor(physical.metallic),
                    roughness_factor: json::material::StrengthFactor(physical.roughness),
                    metallic_roughness_texture: None,
                    extensions: Default::default(),
                    extras: Default::default(),
                },
                alpha_mode: Valid(alpha_mode),
                name: None,
                ..Default::default()
            });
        }

        let index = json::Index::new(id);
        self.materials_cache.insert(scene_material_id, index);
        index
    }

    fn build_texture(&mut self, uri: &str, scene: &dyn Scene) -> Option<json::texture::Info> {
        let bytes = match scene.image(uri) {
            Some(b) => b,
            None => {
                log::warn!("diffuse map {uri} has no loaded image bytes, omitting its texture");
                return None;
            }
        };

        let id_guess = self.root.textures.len() as u32;
        let (id, is_new) = self.dedup.texture(uri.as_bytes(), id_guess);

        if is_new {
            let image_index = self.root.images.len() as u32;
            self.root.images.push(json::Image {
                uri: Some(uri.to_string()),
                mime_type: None,
                buffer_view: None,
                name: None,
                extensions: Default::default(),
                extras: Default::default(),
            });
            self.root.textures.push(json::Texture {
                sampler: None,
                source: json::Index::new(image_index),
                name: None,
                extensions: Default::default(),
                extras: Default::default(),
            });
            self.images_to_copy.push((uri.to_string(), bytes.to_vec()));
        }

        Some(json::texture::Info {
            index: json::Index::new(id),
            tex_coord: 0,
            extensions: Default::default(),
            extras: Default::default(),
        })
    }

    /// True when `geometry`'s kind would actually be emitted as a
    /// primitive — neither `Empty` nor skipped by the matching
    /// `ignoreMeshes`/`ignoreLines`/`ignorePoints` flag. Checked before
    /// building the node's material so an unemitted (missing-mesh or
    /// ignored-kind) fragment never pulls in a material/texture it
    /// doesn't reference (§4.5).
    fn geometry_is_emittable(&self, geometry: &Geometry) -> bool {
        match geometry {
            Geometry::Empty => false,
            Geometry::Mesh(_) => !self.config.ignore_meshes,
            Geometry::Lines(_) => !self.config.ignore_lines,
            Geometry::Points(_) => !self.config.ignore_points,
        }
    }

    fn build_primitive(
        &mut self,
        geometry: &Geometry,
        material: json::Index<json::Material>,
        samples_uv: bool,
    ) -> Option<json::mesh::Primitive> {
        match geometry {
            Geometry::Empty => None,
            Geometry::Mesh(_) if self.config.ignore_meshes => None,
            Geometry::Lines(_) if self.config.ignore_lines => None,
            Geometry::Points(_) if self.config.ignore_points => None,
            Geometry::Mesh(m) => Some(self.build_mesh_primitive(m, material, samples_uv)),
            Geometry::Lines(l) => Some(self.build_lines_primitive(l, material)),
            Geometry::Points(p) => Some(self.build_points_primitive(p, material)),
        }
    }

    fn build_mesh_primitive(&mut self, m: &MeshGeometry, material: json::Index<json::Material>, samples_uv: bool) -> json::mesh::Primitive {
        let mut attributes = BTreeMap::new();
        let index_acc = self.write_index_accessor(m.indices());
        let pos_acc = self.write_position_accessor(m.vertices(), m.bbox_min, m.bbox_max);
        attributes.insert(Valid(json::mesh::Semantic::Positions), pos_acc);

        if let Some(normals) = m.normals() {
            attributes.insert(Valid(json::mesh::Semantic::Normals), self.write_vec3_accessor(normals));
        }
        if !self.config.skip_unused_uvs || samples_uv {
            if let Some(uv0) = m.uvs(0) {
                attributes.insert(Valid(json::mesh::Semantic::TexCoords(0)), self.write_vec2_accessor(uv0));
            }
        }

        json::mesh::Primitive {
            attributes,
            indices: Some(index_acc),
            material: Some(material),
            mode: Valid(json::mesh::Mode::Triangles),
            targets: None,
            extensions: Default::default(),
            extras: Default::default(),
        }
    }

    fn build_lines_primitive(&mut self, l: &LinesGeometry, material: json::Index<json::Material>) -> json::mesh::Primitive {
        let mut attributes = BTreeMap::new();
        let index_acc = self.write_index_accessor(l.indices());
        let pos_acc = self.write_position_accessor(l.vertices(), l.bbox_min, l.bbox_max);
        attributes.insert(Valid(json::mesh::Semantic::Positions), pos_acc);

        if let Some(colors) = l.colors() {
            let rgb = rgba_to_rgb(colors);
            attributes.insert(Valid(json::mesh::Semantic::Colors(0)), self.write_vec3_accessor(&rgb));
        }

        json::mesh::Primitive {
            attributes,
            indices: Some(index_acc),
            material: Some(material),
            mode: Valid(json::mesh::Mode::Lines),
            targets: None,
            extensions: Default::default(),
            extras: Default::default(),
        }
    }

    fn build_points_primitive(&mut self, p: &PointsGeometry, material: json::Index<json::Material>) -> json::mesh::Primitive {
        let mut attributes = BTreeMap::new();
        let pos_acc = self.write_position_accessor(p.vertices(), p.bbox_min, p.bbox_max);
        attributes.insert(Valid(json::mesh::Semantic::Positions), pos_acc);

        if let Some(colors) = p.colors() {
            let rgb = rgba_to_rgb(colors);
            attributes.insert(Valid(json::mesh::Semantic::Colors(0)), self.write_vec3_accessor(&rgb));
        }

        json::mesh::Primitive {
            attributes,
            indices: None,
            material: Some(material),
            mode: Valid(json::mesh::Mode::Points),
            targets: None,
            extensions: Default::default(),
            extras: Default::default(),
        }
    }

    fn push_mesh(&mut self, primitive: json::mesh::Primitive) -> json::Index<json::Mesh> {
        let mut key = Vec::new();
        if let Some(idx) = &primitive.indices {
            key.extend_from_slice(&idx.value().to_le_bytes());
        }
        for acc in primitive.attributes.values() {
            key.extend_from_slice(&acc.value().to_le_bytes());
        }
        if let Some(mat) = &primitive.material {
            key.extend_from_slice(&mat.value().to_le_bytes());
        }

        let id_guess = self.root.meshes.len() as u32;
        let (id, is_new) = self.dedup.mesh(&key, id_guess);
        if is_new {
            self.root.meshes.push(json::Mesh {
                primitives: vec![primitive],
                weights: None,
                name: None,
                extensions: Default::default(),
                extras: Default::default(),
            });
        }
        json::Index::new(id)
    }

    fn write_bytes_as_view(&mut self, bytes: &[u8], target: Option<json::buffer::Target>) -> json::Index<json::buffer::View> {
        let mut key = vec![target.map(target_tag).unwrap_or(0)];
        key.extend_from_slice(bytes);

        let id_guess = self.root.buffer_views.len() as u32;
        let (id, is_new) = self.dedup.buffer_view(&key, id_guess);

        if is_new {
            let (buffer_index, offset, length) = self.buffers.append(bytes);
            self.buffers.pad_current_to(4);
            self.root.buffer_views.push(json::buffer::View {
                buffer: json::Index::new(buffer_index),
                byte_length: USize64::from(length as u64),
                byte_offset: Some(USize64::from(offset as u64)),
                byte_stride: None,
                target: target.map(Valid),
                name: None,
                extensions: Default::default(),
                extras: Default::default(),
            });
        }
        json::Index::new(id)
    }

    fn write_accessor(
        &mut self,
        view: json::Index<json::buffer::View>,
        component_type: json::accessor::ComponentType,
        type_: json::accessor::Type,
        count: usize,
        min: Option<Vec<f32>>,
        max: Option<Vec<f32>>,
    ) -> json::Index<json::Accessor> {
        let mut key = Vec::new();
        key.extend_from_slice(&view.value().to_le_bytes());
        key.push(component_type_tag(component_type));
        key.push(type_tag(type_));
        key.extend_from_slice(&(count as u32).to_le_bytes());

        let id_guess = self.root.accessors.len() as u32;
        let (id, is_new) = self.dedup.accessor(&key, id_guess);

        if is_new {
            self.root.accessors.push(json::Accessor {
                buffer_view: Some(view),
                byte_offset: Some(USize64(0)),
                count: USize64::from(count as u64),
                component_type: Valid(json::accessor::GenericComponentType(component_type)),
                type_: Valid(type_),
                min: min.map(json::Value::from),
                max: max.map(json::Value::from),
                name: None,
                normalized: false,
                sparse: None,
                extensions: Default::default(),
                extras: Default::default(),
            });
        }
        json::Index::new(id)
    }

    fn write_position_accessor(&mut self, vertices: &[f32], bbox_min: [f32; 3], bbox_max: [f32; 3]) -> json::Index<json::Accessor> {
        let bytes = f32_slice_to_le_bytes(vertices);
        let view = self.write_bytes_as_view(&bytes, Some(json::buffer::Target::ArrayBuffer));
        self.write_accessor(
            view,
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            vertices.len() / 3,
            Some(bbox_min.to_vec()),
            Some(bbox_max.to_vec()),
        )
    }

    fn write_vec3_accessor(&mut self, values: &[f32]) -> json::Index<json::Accessor> {
        let bytes = f32_slice_to_le_bytes(values);
        let view = self.write_bytes_as_view(&bytes, Some(json::buffer::Target::ArrayBuffer));
        self.write_accessor(view, json::accessor::ComponentType::F32, json::accessor::Type::Vec3, values.len() / 3, None, None)
    }

    fn write_vec2_accessor(&mut self, values: &[f32]) -> json::Index<json::Accessor> {
        let bytes = f32_slice_to_le_bytes(values);
        let view = self.write_bytes_as_view(&bytes, Some(json::buffer::Target::ArrayBuffer));
        self.write_accessor(view, json::accessor::ComponentType::F32, json::accessor::Type::Vec2, values.len() / 2, None, None)
    }

    fn write_index_accessor(&mut self, indices: &[u16]) -> json::Index<json::Accessor> {
        let mut bytes = Vec::with_capacity(indices.len() * 2);
        for i in indices {
            bytes.extend_from_slice(&i.to_le_bytes());
        }
        let view = self.write_bytes_as_view(&bytes, Some(json::buffer::Target::ElementArrayBuffer));
        self.write_accessor(view, json::accessor::ComponentType::U16, json::accessor::Type::Scalar, indices.len(), None, None)
    }

    /// Buffers are written first, images second, the manifest last — a
    /// partial run never leaves a glTF file that looks complete (§4.5).
    fn finalize(mut self, out_dir: &Path) -> Result<(), WriteError> {
        std::fs::create_dir_all(out_dir).map_err(|e| WriteError::Io { path: out_dir.display().to_string(), source: e })?;

        for buf in &self.buffers.buffers {
            if buf.is_empty() {
                continue;
            }
            let filename = format!("output.{}.bin", self.root.buffers.len());
            std::fs::write(out_dir.join(&filename), buf).map_err(|e| WriteError::Io { path: filename.clone(), source: e })?;
            self.root.buffers.push(json::Buffer {
                byte_length: USize64::from(buf.len() as u64),
                uri: Some(filename),
                name: None,
                extensions: Default::default(),
                extras: Default::default(),
            });
        }

        for (uri, bytes) in &self.images_to_copy {
            std::fs::write(out_dir.join(uri), bytes).map_err(|e| WriteError::Io { path: uri.clone(), source: e })?;
        }

        if let Some(dump) = &self.metadata_dump {
            let bytes = serde_json::to_vec_pretty(dump)?;
            std::fs::write(out_dir.join("output.metadata.json"), bytes)
                .map_err(|e| WriteError::Io { path: "output.metadata.json".to_string(), source: e })?;
        }

        let manifest = always_present_arrays(serde_json::to_value(&self.root)?);
        let json_bytes = serde_json::to_vec_pretty(&manifest)?;
        std::fs::write(out_dir.join("output.gltf"), json_bytes)
            .map_err(|e| WriteError::Io { path: "output.gltf".to_string(), source: e })?;

        Ok(())
    }
}

/// `gltf_json::Root` skips empty arrays when serializing (`#[serde(skip_serializing_if
/// = "Vec::is_empty")]` on `buffers`/`bufferViews`/`accessors`/`meshes`/
/// `materials`/`nodes`/`scenes`), but §6 mandates those keys are always
/// present in the manifest — unlike `textures`/`images`/`samplers`, which
/// stay omitted when empty. Patches the serialized value rather than the
/// `gltf-json` struct itself, since the crate's own `Serialize` impl is
/// what drops them.
fn always_present_arrays(mut value: serde_json::Value) -> serde_json::Value {
    if let Some(obj) = value.as_object_mut() {
        for key in ["buffers", "bufferViews", "accessors", "meshes", "materials", "nodes", "scenes"] {
            obj.entry(key).or_insert_with(|| serde_json::Value::Array(Vec::new()));
        }
    }
    value
}

fn target_tag(t: json::buffer::Target) -> u8 {
    match t {
        json::buffer::Target::ArrayBuffer => 1,
        json::buffer::Target::ElementArrayBuffer => 2,
    }
}

fn component_type_tag(t: json::accessor::ComponentType) -> u8 {
    use json::accessor::ComponentType::*;
    match t {
        I8 => 1,
        U8 => 2,
        I16 => 3,
        U16 => 4,
        U32 => 5,
        F32 => 6,
    }
}

fn type_tag(t: json::accessor::Type) -> u8 {
    use json::accessor::Type::*;
    match t {
        Scalar => 1,
        Vec2 => 2,
        Vec3 => 3,
        Vec4 => 4,
        Mat2 => 5,
        Mat3 => 6,
        Mat4 => 7,
    }
}

fn f32_slice_to_le_bytes(values: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Drops alpha from an interleaved RGBA buffer — `COLOR_0` on lines/points
/// is emitted as `f32 VEC3` per §4.5, unlike the RGBA source data.
fn rgba_to_rgb(rgba: &[f32]) -> Vec<f32> {
    rgba.chunks_exact(4).flat_map(|c| [c[0], c[1], c[2]]).collect()
}

/// Whether `material` actually samples a UV — has a diffuse map with bytes
/// the scene can resolve (a dangling URI loads no texture either, per
/// `build_texture`, so it doesn't count). Drives `skipUnusedUvs` (§4.5:
/// "omit UV buffers when no referenced material samples a UV").
fn material_samples_uv(material: &crate::imf::Physical, scene: &dyn Scene) -> bool {
    material.maps.diffuse.as_deref().map_or(false, |uri| scene.image(uri).is_some())
}

fn material_key_bytes(m: &crate::imf::Physical) -> Vec<u8> {
    let mut key = Vec::new();
    for f in [m.diffuse.r, m.diffuse.g, m.diffuse.b, m.diffuse.a, m.metallic, m.roughness, m.opacity] {
        key.extend_from_slice(&f.to_le_bytes());
    }
    if let Some(uri) = &m.maps.diffuse {
        key.extend_from_slice(uri.as_bytes());
    }
    key
}

fn imf_transform_to_node_fields(
    t: ImfTransform,
) -> (Option<[f32; 3]>, Option<json::scene::UnitQuaternion>, Option<[f32; 3]>, Option<[f32; 16]>) {
    match t {
        ImfTransform::Matrix(m) => (None, None, None, Some(m)),
        ImfTransform::Decomposed(d) => {
            let translation = if d.is_identity_translation() { None } else { Some([d.translation.x, d.translation.y, d.translation.z]) };
            let rotation = if d.is_identity_rotation() { None } else { Some(json::scene::UnitQuaternion(d.rotation)) };
            let scale = if d.is_identity_scale() { None } else { Some([d.scale.x, d.scale.y, d.scale.z]) };
            (translation, rotation, scale, None)
        }
    }
}

fn axis_vec(axis: crate::svf::Axis) -> Vec3<f32> {
    use crate::svf::Axis::*;
    match axis {
        X => Vec3::new(1.0, 0.0, 0.0),
        Y => Vec3::new(0.0, 1.0, 0.0),
        Z => Vec3::new(0.0, 0.0, 1.0),
        NegX => Vec3::new(-1.0, 0.0, 0.0),
        NegY => Vec3::new(0.0, -1.0, 0.0),
        NegZ => Vec3::new(0.0, 0.0, -1.0),
    }
}

/// Builds the root node's reorientation matrix from the source's up/front
/// axis hints; identity when hints are absent or reorientation is
/// disabled (§4.5: "default assumes Y-up unchanged").
fn reorientation_matrix(metadata: &Metadata, enabled: bool) -> [f32; 16] {
    if !enabled {
        return IDENTITY_MATRIX;
    }
    let (Some(up), Some(front)) = (metadata.up_axis, metadata.front_axis) else {
        return IDENTITY_MATRIX;
    };
    let up_vec = axis_vec(up);
    let front_vec = axis_vec(front);
    let right_vec = front_vec.cross(up_vec);

    [
        right_vec.x, up_vec.x, -front_vec.x, 0.0,
        right_vec.y, up_vec.y, -front_vec.y, 0.0,
        right_vec.z, up_vec.z, -front_vec.z, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ]
}

/// Builds the optional `output.metadata.json` dump (§6). Kept independent
/// of `serde::Serialize` on [`Metadata`] itself: the dump's shape mirrors
/// the source SVF metadata JSON, not the struct layout used internally.
fn metadata_dump_json(metadata: &Metadata) -> serde_json::Value {
    let up_axis = metadata.up_axis.map(axis_name);
    let front_axis = metadata.front_axis.map(axis_name);
    let world_bbox = metadata.world_bbox.map(|(min, max)| {
        serde_json::json!({
            "min": [min.x, min.y, min.z],
            "max": [max.x, max.y, max.z],
        })
    });

    serde_json::json!({
        "distanceUnitScale": metadata.distance_unit_scale,
        "upAxis": up_axis,
        "frontAxis": front_axis,
        "worldBBox": world_bbox,
    })
}

fn axis_name(axis: crate::svf::Axis) -> &'static str {
    use crate::svf::Axis::*;
    match axis {
        X => "X",
        Y => "Y",
        Z => "Z",
        NegX => "-X",
        NegY => "-Y",
        NegZ => "-Z",
    }
}

fn compute_center(metadata: &Metadata) -> Option<[f32; 3]> {
    let (min, max) = metadata.world_bbox?;
    let center = (min + max) * 0.5;
    if center == vek::Vec3::zero() {
        None
    } else {
        Some([-(center.x as f32), -(center.y as f32), -(center.z as f32)])
    }
}

//! Decodes one SVF manifest and its constituent assets into an in-memory
//! [`Svf`] (spec §4.3).
//!
//! The nearest teacher analogue, `bundles::loader::load_bundle_dir`, reads
//! every file synchronously off local disk; here the asset set comes from
//! a remote fetcher and is read **in parallel** instead, since ordering
//! between assets is irrelevant and only the final assembly needs to be
//! deterministic. `tokio::join!` drives the per-kind fetches concurrently
//! and `futures::future::join_all` fans each multi-file kind (mesh packs,
//! images) out within that.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;

use futures::future::join_all;
use serde::Deserialize;
use vek::Vec3;

use crate::binary::{read_transform, PackFileReader};
use crate::error::{PackFileError, StreamError, SvfError};

use super::fetcher::{AssetFetcher, FetchError};
use super::placeholder;
use super::{
    Axis, Fragment, GeometryMetadata, ImageSet, LineEntity, Material, MeshEntity, MeshPack,
    MeshPackEntity, Metadata, PointEntity, PrimitiveType, Rgba, SimplePhong, Svf,
};

/// URIs for one SVF's constituent assets. A simplified stand-in for the
/// real manifest.json asset-list shape: one fragment-list packfile, one
/// geometry-metadata packfile, N mesh-pack files indexed by `packId`.
#[derive(Clone, Debug, Deserialize)]
pub struct SvfManifest {
    pub metadata: String,
    pub fragments: String,
    pub geometry: String,
    #[serde(default)]
    pub mesh_packs: Vec<String>,
    pub materials: Option<String>,
}

pub struct SvfReader;

impl SvfReader {
    pub async fn read(fetcher: &dyn AssetFetcher, manifest: &SvfManifest) -> Result<Svf, SvfError> {
        log::info!("reading svf: {} mesh-pack file(s)", manifest.mesh_packs.len());

        let (metadata_res, fragments_res, geometry_res, mesh_packs_res, materials_res) = tokio::join!(
            fetch_required(fetcher, &manifest.metadata),
            fetch_required(fetcher, &manifest.fragments),
            fetch_required(fetcher, &manifest.geometry),
            join_all(manifest.mesh_packs.iter().map(|uri| fetch_required(fetcher, uri))),
            fetch_optional(fetcher, manifest.materials.as_deref()),
        );

        let metadata = parse_metadata(&metadata_res?, &manifest.metadata)?;
        let fragments = parse_fragments(&fragments_res?, &manifest.fragments)?;
        let geometry_metadata = parse_geometry_metadata(&geometry_res?, &manifest.geometry)?;

        if fragments.is_empty() {
            return Err(SvfError::EmptyManifest);
        }

        let mut mesh_packs = Vec::with_capacity(mesh_packs_res.len());
        for (uri, res) in manifest.mesh_packs.iter().zip(mesh_packs_res) {
            mesh_packs.push(parse_mesh_pack(&res?, uri)?);
        }

        let (materials, texture_uris) = match materials_res? {
            Some(bytes) => parse_materials(&bytes, manifest.materials.as_deref().unwrap())?,
            None => (Vec::new(), Vec::new()),
        };

        let images = fetch_images(fetcher, &texture_uris).await?;

        Ok(Svf {
            metadata,
            fragments,
            geometry_metadata,
            mesh_packs,
            materials,
            images,
        })
    }
}

async fn fetch_required(fetcher: &dyn AssetFetcher, uri: &str) -> Result<Vec<u8>, SvfError> {
    fetcher.fetch(uri).await.map_err(|e| fetch_error_to_svf(uri, e))
}

async fn fetch_optional(fetcher: &dyn AssetFetcher, uri: Option<&str>) -> Result<Option<Vec<u8>>, SvfError> {
    match uri {
        Some(uri) => fetch_required(fetcher, uri).await.map(Some),
        None => Ok(None),
    }
}

fn fetch_error_to_svf(uri: &str, e: FetchError) -> SvfError {
    match e {
        FetchError::NotFound(_) => SvfError::Transport {
            uri: uri.to_string(),
            source: anyhow::anyhow!("asset not found"),
        },
        FetchError::Transport { uri, source } => SvfError::Transport { uri, source },
    }
}

fn corrupt(uri: &str, e: impl Into<PackFileError>) -> SvfError {
    SvfError::CorruptAsset { uri: uri.to_string(), source: e.into() }
}

// ---------------------------------------------------------------- metadata

#[derive(Deserialize)]
struct MetadataFile {
    #[serde(rename = "distanceUnitScale")]
    distance_unit_scale: Option<f64>,
    #[serde(rename = "worldBBox")]
    world_bbox: Option<RawBBox>,
    #[serde(rename = "upAxis")]
    up_axis: Option<String>,
    #[serde(rename = "frontAxis")]
    front_axis: Option<String>,
}

#[derive(Deserialize)]
struct RawBBox {
    min: [f64; 3],
    max: [f64; 3],
}

fn parse_axis(s: &str) -> Option<Axis> {
    match s {
        "X" => Some(Axis::X),
        "Y" => Some(Axis::Y),
        "Z" => Some(Axis::Z),
        "-X" => Some(Axis::NegX),
        "-Y" => Some(Axis::NegY),
        "-Z" => Some(Axis::NegZ),
        _ => None,
    }
}

fn parse_metadata(bytes: &[u8], uri: &str) -> Result<Metadata, SvfError> {
    let raw: MetadataFile = serde_json::from_slice(bytes)
        .map_err(|e| SvfError::MalformedJson { uri: uri.to_string(), source: e })?;

    Ok(Metadata {
        distance_unit_scale: raw.distance_unit_scale.unwrap_or(1.0),
        world_bbox: raw.world_bbox.map(|b| {
            (
                Vec3::new(b.min[0], b.min[1], b.min[2]),
                Vec3::new(b.max[0], b.max[1], b.max[2]),
            )
        }),
        up_axis: raw.up_axis.as_deref().and_then(parse_axis),
        front_axis: raw.front_axis.as_deref().and_then(parse_axis),
    })
}

// ---------------------------------------------------------------- fragments

fn parse_fragments(raw: &[u8], uri: &str) -> Result<Vec<Fragment>, SvfError> {
    let pf = PackFileReader::parse(raw).map_err(|e| corrupt(uri, e))?;
    let mut out = Vec::with_capacity(pf.entry_count() as usize);
    for i in 0..pf.entry_count() {
        let (mut stream, _ty) = pf.seek_entry(i).map_err(|e| corrupt(uri, e))?;
        let dbid = stream.u32().map_err(|e| corrupt(uri, e))?;
        let geometry_index = stream.u32().map_err(|e| corrupt(uri, e))?;
        let material_index = stream.u32().map_err(|e| corrupt(uri, e))?;
        let transform = read_transform(&mut stream).map_err(|e| corrupt(uri, e))?;
        let bbox_min = read_vec3_f32(&mut stream).map_err(|e| corrupt(uri, e))?;
        let bbox_max = read_vec3_f32(&mut stream).map_err(|e| corrupt(uri, e))?;
        out.push(Fragment {
            dbid,
            geometry_index,
            material_index,
            transform,
            bbox: (
                Vec3::new(bbox_min[0], bbox_min[1], bbox_min[2]),
                Vec3::new(bbox_max[0], bbox_max[1], bbox_max[2]),
            ),
        });
    }
    Ok(out)
}

// ------------------------------------------------------- geometry metadata

fn parse_geometry_metadata(raw: &[u8], uri: &str) -> Result<Vec<GeometryMetadata>, SvfError> {
    let pf = PackFileReader::parse(raw).map_err(|e| corrupt(uri, e))?;
    let mut out = Vec::with_capacity(pf.entry_count() as usize);
    for i in 0..pf.entry_count() {
        let (mut stream, _ty) = pf.seek_entry(i).map_err(|e| corrupt(uri, e))?;
        let pack_id = stream.u32().map_err(|e| corrupt(uri, e))?;
        let entity_index = stream.u32().map_err(|e| corrupt(uri, e))?;
        let kind = stream.u8().map_err(|e| corrupt(uri, e))?;
        let primitive_type = primitive_type_from_u8(kind)
            .ok_or_else(|| corrupt(uri, PackFileError::UnknownEntityKind(kind)))?;
        out.push(GeometryMetadata { pack_id, entity_index, primitive_type });
    }
    Ok(out)
}

fn primitive_type_from_u8(tag: u8) -> Option<PrimitiveType> {
    match tag {
        0 => Some(PrimitiveType::Triangles),
        1 => Some(PrimitiveType::Lines),
        2 => Some(PrimitiveType::Points),
        _ => None,
    }
}

// -------------------------------------------------------------- mesh packs

fn parse_mesh_pack(raw: &[u8], uri: &str) -> Result<MeshPack, SvfError> {
    let pf = PackFileReader::parse(raw).map_err(|e| corrupt(uri, e))?;
    let mut entities = Vec::with_capacity(pf.entry_count() as usize);

    for i in 0..pf.entry_count() {
        let (mut stream, _ty) = pf.seek_entry(i).map_err(|e| corrupt(uri, e))?;

        let kind = stream.u8().map_err(|e| corrupt(uri, e))?;
        let primitive_type = primitive_type_from_u8(kind)
            .ok_or_else(|| corrupt(uri, PackFileError::UnknownEntityKind(kind)))?;
        let flags = stream.u8().map_err(|e| corrupt(uri, e))?;
        let has_normals = flags & 0x1 != 0;
        let has_colors = flags & 0x2 != 0;
        let uv_channel_count = stream.u8().map_err(|e| corrupt(uri, e))?;
        let vertex_count = stream.u32().map_err(|e| corrupt(uri, e))? as usize;

        let vertices = read_f32_vec(&mut stream, vertex_count * 3).map_err(|e| corrupt(uri, e))?;
        let normals = if has_normals {
            Some(read_f32_vec(&mut stream, vertex_count * 3).map_err(|e| corrupt(uri, e))?)
        } else {
            None
        };
        let mut uvs = Vec::with_capacity(uv_channel_count as usize);
        for _ in 0..uv_channel_count {
            uvs.push(read_f32_vec(&mut stream, vertex_count * 2).map_err(|e| corrupt(uri, e))?);
        }
        let colors = if has_colors {
            Some(read_f32_vec(&mut stream, vertex_count * 4).map_err(|e| corrupt(uri, e))?)
        } else {
            None
        };

        let entity = match primitive_type {
            PrimitiveType::Triangles => {
                let index_count = stream.u32().map_err(|e| corrupt(uri, e))? as usize;
                let indices = read_u16_vec(&mut stream, index_count).map_err(|e| corrupt(uri, e))?;
                let bbox_min = read_vec3_f32(&mut stream).map_err(|e| corrupt(uri, e))?;
                let bbox_max = read_vec3_f32(&mut stream).map_err(|e| corrupt(uri, e))?;
                MeshPackEntity::Mesh(MeshEntity { vertices, normals, uvs, colors, indices, bbox_min, bbox_max })
            }
            PrimitiveType::Lines => {
                let index_count = stream.u32().map_err(|e| corrupt(uri, e))? as usize;
                let indices = read_u16_vec(&mut stream, index_count).map_err(|e| corrupt(uri, e))?;
                let bbox_min = read_vec3_f32(&mut stream).map_err(|e| corrupt(uri, e))?;
                let bbox_max = read_vec3_f32(&mut stream).map_err(|e| corrupt(uri, e))?;
                MeshPackEntity::Lines(LineEntity { vertices, colors, indices, bbox_min, bbox_max })
            }
            PrimitiveType::Points => {
                let bbox_min = read_vec3_f32(&mut stream).map_err(|e| corrupt(uri, e))?;
                let bbox_max = read_vec3_f32(&mut stream).map_err(|e| corrupt(uri, e))?;
                MeshPackEntity::Points(PointEntity { vertices, colors, bbox_min, bbox_max })
            }
        };
        entities.push(entity);
    }

    Ok(MeshPack { entities })
}

fn read_vec3_f32(stream: &mut crate::binary::BinaryStream) -> Result<[f32; 3], StreamError> {
    Ok([stream.f32()?, stream.f32()?, stream.f32()?])
}

fn read_f32_vec(stream: &mut crate::binary::BinaryStream, count: usize) -> Result<Vec<f32>, StreamError> {
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(stream.f32()?);
    }
    Ok(out)
}

fn read_u16_vec(stream: &mut crate::binary::BinaryStream, count: usize) -> Result<Vec<u16>, StreamError> {
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(stream.u16()?);
    }
    Ok(out)
}

// --------------------------------------------------------------- materials

#[derive(Deserialize)]
struct MaterialsFile {
    materials: HashMap<String, MaterialGroup>,
}

#[derive(Deserialize)]
struct MaterialGroup {
    userassets: Vec<String>,
    materials: HashMap<String, MaterialDef>,
}

#[derive(Deserialize)]
struct MaterialDef {
    definition: String,
    #[serde(default)]
    properties: MaterialProperties,
}

#[derive(Deserialize, Default)]
struct MaterialProperties {
    #[serde(default)]
    colors: HashMap<String, ValuesWrapper<RawColor>>,
    #[serde(default)]
    scalars: HashMap<String, ValuesWrapper<f32>>,
    #[serde(default)]
    uris: HashMap<String, ValuesWrapper<String>>,
}

#[derive(Deserialize)]
struct ValuesWrapper<T> {
    values: Vec<T>,
}

#[derive(Deserialize)]
struct RawColor {
    r: f32,
    g: f32,
    b: f32,
    #[serde(default = "default_alpha")]
    a: f32,
}

fn default_alpha() -> f32 {
    1.0
}

fn gunzip(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = flate2::read::GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Returns the materials, indexed densely by ascending numeric group key
/// (§3 I1), plus the deduplicated set of diffuse-map URIs to fetch.
fn parse_materials(raw: &[u8], uri: &str) -> Result<(Vec<Material>, Vec<String>), SvfError> {
    let json_bytes = gunzip(raw).map_err(|e| SvfError::Transport {
        uri: uri.to_string(),
        source: anyhow::Error::new(e).context("inflating materials.json.gz"),
    })?;
    let file: MaterialsFile = serde_json::from_slice(&json_bytes)
        .map_err(|e| SvfError::MalformedJson { uri: uri.to_string(), source: e })?;

    let mut ordered: BTreeMap<u32, MaterialGroup> = BTreeMap::new();
    for (key, group) in file.materials {
        match key.parse::<u32>() {
            Ok(n) => {
                ordered.insert(n, group);
            }
            Err(_) => log::warn!("material group key {key} is not numeric, dropping"),
        }
    }

    let mut materials = Vec::with_capacity(ordered.len());
    let mut texture_uris = Vec::new();

    for (key, group) in ordered {
        let Some(root_asset) = group.userassets.first() else {
            log::warn!("material group {key} has no userassets, dropping");
            continue;
        };
        let Some(def) = group.materials.get(root_asset) else {
            log::warn!("material group {key} root asset {root_asset} not found, dropping");
            continue;
        };

        if def.definition != "SimplePhong" {
            materials.push(Material::Unknown { definition: def.definition.clone() });
            continue;
        }

        let diffuse = def.properties.colors.get("generic_diffuse").and_then(|w| w.values.first());
        let diffuse = match diffuse {
            Some(c) => Rgba { r: c.r, g: c.g, b: c.b, a: c.a },
            None => {
                log::warn!("material group {key} has no generic_diffuse color, defaulting to zero");
                Rgba::default()
            }
        };

        let opacity = def
            .properties
            .scalars
            .get("opacity")
            .and_then(|w| w.values.first())
            .copied()
            .unwrap_or(1.0);

        let glossiness = def.properties.scalars.get("generic_glossiness").and_then(|w| w.values.first()).copied();

        let diffuse_map = def.properties.uris.get("generic_diffuse").and_then(|w| w.values.first()).cloned();
        if let Some(uri) = &diffuse_map {
            if !texture_uris.contains(uri) {
                texture_uris.push(uri.clone());
            }
        }

        materials.push(Material::SimplePhong(SimplePhong { diffuse, opacity, glossiness, diffuse_map }));
    }

    Ok((materials, texture_uris))
}

// ------------------------------------------------------------------ images

enum ImageOutcome {
    Loaded(String, Vec<u8>),
    Skipped,
    Failed(SvfError),
}

async fn fetch_images(fetcher: &dyn AssetFetcher, uris: &[String]) -> Result<ImageSet, SvfError> {
    let outcomes = join_all(uris.iter().map(|uri| async move {
        match fetcher.fetch(uri).await {
            Ok(bytes) => ImageOutcome::Loaded(uri.clone(), bytes),
            Err(FetchError::NotFound(_)) => {
                log::warn!("image {uri} not found, substituting placeholder");
                match placeholder::for_uri(uri) {
                    Some(bytes) => ImageOutcome::Loaded(uri.clone(), bytes.to_vec()),
                    None => {
                        log::warn!("no placeholder available for extension of {uri}, skipping");
                        ImageOutcome::Skipped
                    }
                }
            }
            Err(FetchError::Transport { uri, source }) => ImageOutcome::Failed(SvfError::Transport { uri, source }),
        }
    }))
    .await;

    let mut images = ImageSet::default();
    for outcome in outcomes {
        match outcome {
            ImageOutcome::Loaded(uri, bytes) => images.insert(uri, bytes),
            ImageOutcome::Skipped => {}
            ImageOutcome::Failed(e) => return Err(e),
        }
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap as StdHashMap;
    use std::sync::Mutex;

    struct MapFetcher {
        files: Mutex<StdHashMap<String, Vec<u8>>>,
    }

    impl MapFetcher {
        fn new(files: Vec<(&str, Vec<u8>)>) -> Self {
            MapFetcher {
                files: Mutex::new(files.into_iter().map(|(k, v)| (k.to_string(), v)).collect()),
            }
        }
    }

    #[async_trait]
    impl AssetFetcher for MapFetcher {
        async fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
            self.files
                .lock()
                .unwrap()
                .get(uri)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(uri.to_string()))
        }
    }

    fn write_varint(buf: &mut Vec<u8>, mut value: u32) {
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            buf.push(byte);
            if value == 0 {
                break;
            }
        }
    }

    fn build_packfile(type_tag: &str, version: i32, entry_payloads: &[Vec<u8>]) -> Vec<u8> {
        let mut buf = Vec::new();
        write_varint(&mut buf, type_tag.len() as u32);
        buf.extend_from_slice(type_tag.as_bytes());
        buf.extend_from_slice(&version.to_le_bytes());

        let mut entry_offsets = Vec::new();
        for payload in entry_payloads {
            entry_offsets.push(buf.len() as u32);
            buf.extend_from_slice(&0u32.to_le_bytes()); // single type index 0
            buf.extend_from_slice(payload);
        }

        let entries_offset = buf.len() as u32;
        write_varint(&mut buf, entry_offsets.len() as u32);
        for off in &entry_offsets {
            buf.extend_from_slice(&off.to_le_bytes());
        }

        let types_offset = buf.len() as u32;
        write_varint(&mut buf, 1);
        write_varint(&mut buf, 1);
        buf.push(b'A');
        write_varint(&mut buf, 1);
        buf.push(b'B');
        write_varint(&mut buf, 1);

        buf.extend_from_slice(&entries_offset.to_le_bytes());
        buf.extend_from_slice(&types_offset.to_le_bytes());
        buf
    }

    fn fragment_payload(dbid: u32, geom: u32, mat: u32, tx: f64, ty: f64, tz: f64) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&dbid.to_le_bytes());
        buf.extend_from_slice(&geom.to_le_bytes());
        buf.extend_from_slice(&mat.to_le_bytes());
        buf.push(0); // transform kind 0: translation only
        buf.extend_from_slice(&tx.to_le_bytes());
        buf.extend_from_slice(&ty.to_le_bytes());
        buf.extend_from_slice(&tz.to_le_bytes());
        for f in [0.0f32, 0.0, 0.0, 1.0, 1.0, 1.0] {
            buf.extend_from_slice(&f.to_le_bytes());
        }
        buf
    }

    #[tokio::test]
    async fn reads_minimal_svf() {
        let metadata_json = br#"{"distanceUnitScale":1.0,"upAxis":"Z"}"#.to_vec();
        let fragments_pf = build_packfile("FragmentList", 1, &[fragment_payload(42, 0, 0, 1.0, 2.0, 3.0)]);

        let mut geom_payload = Vec::new();
        geom_payload.extend_from_slice(&0u32.to_le_bytes()); // pack id
        geom_payload.extend_from_slice(&0u32.to_le_bytes()); // entity index
        geom_payload.push(0); // triangles
        let geometry_pf = build_packfile("GeometryMetadataList", 1, &[geom_payload]);

        let fetcher = MapFetcher::new(vec![
            ("metadata.json", metadata_json),
            ("fragments.pf", fragments_pf),
            ("geometry.pf", geometry_pf),
        ]);

        let manifest = SvfManifest {
            metadata: "metadata.json".to_string(),
            fragments: "fragments.pf".to_string(),
            geometry: "geometry.pf".to_string(),
            mesh_packs: vec![],
            materials: None,
        };

        let svf = SvfReader::read(&fetcher, &manifest).await.unwrap();
        assert_eq!(svf.metadata.up_axis, Some(Axis::Z));
        assert_eq!(svf.fragments.len(), 1);
        assert_eq!(svf.fragments[0].dbid, 42);
        assert_eq!(svf.geometry_metadata.len(), 1);
        assert_eq!(svf.geometry_metadata[0].primitive_type, PrimitiveType::Triangles);
    }

    #[tokio::test]
    async fn empty_fragment_list_is_rejected() {
        let metadata_json = br#"{}"#.to_vec();
        let fragments_pf = build_packfile("FragmentList", 1, &[]);
        let geometry_pf = build_packfile("GeometryMetadataList", 1, &[]);

        let fetcher = MapFetcher::new(vec![
            ("metadata.json", metadata_json),
            ("fragments.pf", fragments_pf),
            ("geometry.pf", geometry_pf),
        ]);
        let manifest = SvfManifest {
            metadata: "metadata.json".to_string(),
            fragments: "fragments.pf".to_string(),
            geometry: "geometry.pf".to_string(),
            mesh_packs: vec![],
            materials: None,
        };

        let err = SvfReader::read(&fetcher, &manifest).await.unwrap_err();
        assert!(matches!(err, SvfError::EmptyManifest));
    }

    #[test]
    fn materials_json_extracts_simplephong_and_queues_textures() {
        let raw = serde_json::json!({
            "materials": {
                "0": {
                    "userassets": ["mat0"],
                    "materials": {
                        "mat0": {
                            "definition": "SimplePhong",
                            "properties": {
                                "colors": { "generic_diffuse": { "values": [{"r":1.0,"g":0.0,"b":0.0,"a":1.0}] } },
                                "scalars": { "opacity": { "values": [1.0] }, "generic_glossiness": { "values": [30.0] } },
                                "uris": { "generic_diffuse": { "values": ["tex.png"] } }
                            }
                        }
                    }
                },
                "1": {
                    "userassets": ["mat1"],
                    "materials": {
                        "mat1": { "definition": "SomethingElse", "properties": {} }
                    }
                }
            }
        });
        let bytes = serde_json::to_vec(&raw).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        std::io::Write::write_all(&mut encoder, &bytes).unwrap();
        let gzipped = encoder.finish().unwrap();

        let (materials, textures) = parse_materials(&gzipped, "materials.json.gz").unwrap();
        assert_eq!(materials.len(), 2);
        assert_eq!(textures, vec!["tex.png".to_string()]);
        match &materials[0] {
            Material::SimplePhong(p) => {
                assert_eq!(p.diffuse, Rgba { r: 1.0, g: 0.0, b: 0.0, a: 1.0 });
                assert_eq!(p.glossiness, Some(30.0));
                assert_eq!(p.diffuse_map.as_deref(), Some("tex.png"));
            }
            other => panic!("wrong variant: {:?}", other),
        }
        assert!(matches!(&materials[1], Material::Unknown { .. }));
    }

    #[tokio::test]
    async fn missing_image_falls_back_to_extension_placeholder() {
        // foo.png is referenced by a material but never fetchable: a 404
        // is recovered with the placeholder bytes for its extension (§7
        // MissingImage, §8 P7, scenario 4).
        let fetcher = MapFetcher::new(vec![]);
        let images = fetch_images(&fetcher, &["foo.png".to_string()]).await.unwrap();
        let bytes = images.get("foo.png").unwrap();
        assert_eq!(bytes, placeholder::for_uri("foo.png").unwrap());
        assert_eq!(&bytes[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[tokio::test]
    async fn missing_image_with_unknown_extension_is_skipped_not_fatal() {
        let fetcher = MapFetcher::new(vec![]);
        let images = fetch_images(&fetcher, &["foo.tga".to_string()]).await.unwrap();
        assert!(images.get("foo.tga").is_none());
    }
}

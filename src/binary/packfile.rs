//! Packfile envelope decoder (spec §4.2).
//!
//! Grounded in `fdm::container::DieselContainer`'s header/section-table
//! shape (sniff a signature, read a trailing table, dispatch per entry)
//! and `bundles::packageheader_reader`'s habit of reading flat offset
//! tables straight out of a byte slice. SVF packfiles additionally wrap
//! the whole buffer in gzip and put their table at the *end* rather than
//! the front, so the header/footer split is read twice: once to find the
//! tables, once per entry to read its payload.

use std::io::Read;

use crate::binary::stream::BinaryStream;
use crate::error::{PackFileError, StreamError};

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

#[derive(Clone, Debug)]
pub struct PackFileType {
    pub class: String,
    pub type_name: String,
    pub version: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// Row-major 3x3 linear part of a transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix3x3(pub [f32; 9]);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transform {
    /// Translation only; implicit identity rotation, unit scale.
    Translation(Vector3),
    /// Rotation + translation, unit scale.
    RotationTranslation { rotation: Quaternion, translation: Vector3 },
    /// Uniform scale + rotation + translation.
    Scaled { scale: f32, rotation: Quaternion, translation: Vector3 },
    /// 3x3 linear part + translation.
    Linear { linear: Matrix3x3, translation: Vector3 },
}

pub struct PackFileReader {
    buf: Vec<u8>,
    pub type_tag: String,
    pub version: i32,
    entries: Vec<u32>,
    types: Vec<PackFileType>,
}

impl PackFileReader {
    pub fn parse(raw: &[u8]) -> Result<Self, PackFileError> {
        let inflated;
        let buf: &[u8] = if raw.len() >= 2 && raw[0..2] == GZIP_MAGIC {
            let mut decoder = flate2::read::GzDecoder::new(raw);
            let mut out = Vec::new();
            decoder.read_to_end(&mut out).map_err(PackFileError::Gzip)?;
            inflated = out;
            &inflated
        } else {
            raw
        };

        if buf.len() < 8 {
            return Err(PackFileError::Stream(StreamError::UnexpectedEof {
                offset: 0,
                wanted: 8,
                remaining: buf.len(),
            }));
        }

        let mut header = BinaryStream::new(buf);
        let header_len = header.varint()? as usize;
        let type_tag = header.utf8(header_len)?;
        let version = header.i32()?;

        let footer_start = buf.len() - 8;
        let mut footer = BinaryStream::new(buf);
        footer.seek(footer_start)?;
        let entries_offset = footer.u32()? as usize;
        let types_offset = footer.u32()? as usize;

        let mut entries_stream = BinaryStream::new(buf);
        entries_stream.seek(entries_offset)?;
        let entry_count = entries_stream.varint()?;
        let mut entries = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            entries.push(entries_stream.u32()?);
        }

        let mut types_stream = BinaryStream::new(buf);
        types_stream.seek(types_offset)?;
        let type_count = types_stream.varint()?;
        let mut types = Vec::with_capacity(type_count as usize);
        for _ in 0..type_count {
            let class = types_stream.varint_utf8()?;
            let type_name = types_stream.varint_utf8()?;
            let version = types_stream.varint()?;
            types.push(PackFileType { class, type_name, version });
        }

        Ok(PackFileReader {
            buf: buf.to_vec(),
            type_tag,
            version,
            entries,
            types,
        })
    }

    pub fn entry_count(&self) -> u32 {
        self.entries.len() as u32
    }

    pub fn types(&self) -> &[PackFileType] {
        &self.types
    }

    /// Seeks to the entry's offset, reads its type index, and returns a
    /// stream positioned right after the type index plus the resolved
    /// type triple, so the caller can read entry-specific fields next.
    pub fn seek_entry(&self, index: u32) -> Result<(BinaryStream<'_>, &PackFileType), PackFileError> {
        let offset = *self
            .entries
            .get(index as usize)
            .ok_or(PackFileError::BadEntryIndex { index, count: self.entry_count() })?;

        let mut stream = BinaryStream::new(&self.buf);
        stream.seek(offset as usize)?;
        let type_index = stream.u32()?;
        let ty = self
            .types
            .get(type_index as usize)
            .ok_or(PackFileError::BadEntryIndex { index: type_index, count: self.types.len() as u32 })?;
        Ok((stream, ty))
    }
}

pub fn read_vector3(stream: &mut BinaryStream) -> Result<Vector3, StreamError> {
    Ok(Vector3 { x: stream.f64()?, y: stream.f64()?, z: stream.f64()? })
}

pub fn read_quaternion(stream: &mut BinaryStream) -> Result<Quaternion, StreamError> {
    Ok(Quaternion {
        x: stream.f32()?,
        y: stream.f32()?,
        z: stream.f32()?,
        w: stream.f32()?,
    })
}

pub fn read_matrix3x3(stream: &mut BinaryStream) -> Result<Matrix3x3, StreamError> {
    let mut m = [0f32; 9];
    for slot in &mut m {
        *slot = stream.f32()?;
    }
    Ok(Matrix3x3(m))
}

pub fn read_transform(stream: &mut BinaryStream) -> Result<Transform, PackFileError> {
    let kind = stream.u8()?;
    match kind {
        0 => Ok(Transform::Translation(read_vector3(stream)?)),
        1 => {
            let rotation = read_quaternion(stream)?;
            let translation = read_vector3(stream)?;
            Ok(Transform::RotationTranslation { rotation, translation })
        }
        2 => {
            let scale = stream.f32()?;
            let rotation = read_quaternion(stream)?;
            let translation = read_vector3(stream)?;
            Ok(Transform::Scaled { scale, rotation, translation })
        }
        3 => {
            let linear = read_matrix3x3(stream)?;
            let translation = read_vector3(stream)?;
            Ok(Transform::Linear { linear, translation })
        }
        other => Err(PackFileError::UnknownTransformKind(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_packfile(type_tag: &str, version: i32, entries: &[(&str, &str, u32, Vec<u8>)]) -> Vec<u8> {
        let mut buf = Vec::new();

        // header: varint len, utf8 type, i32 version
        write_varint(&mut buf, type_tag.len() as u32);
        buf.extend_from_slice(type_tag.as_bytes());
        buf.extend_from_slice(&version.to_le_bytes());

        // one packfile "entry" per input tuple: type-index (u32) then payload bytes
        let mut entry_offsets = Vec::new();
        let mut type_table: Vec<(&str, &str, u32)> = Vec::new();
        for (class, tname, tver, payload) in entries {
            let type_index = type_table
                .iter()
                .position(|(c, t, v)| c == class && t == tname && v == tver)
                .unwrap_or_else(|| {
                    type_table.push((class, tname, *tver));
                    type_table.len() - 1
                }) as u32;
            entry_offsets.push(buf.len() as u32);
            buf.extend_from_slice(&type_index.to_le_bytes());
            buf.extend_from_slice(payload);
        }

        let entries_offset = buf.len() as u32;
        write_varint(&mut buf, entry_offsets.len() as u32);
        for off in &entry_offsets {
            buf.extend_from_slice(&off.to_le_bytes());
        }

        let types_offset = buf.len() as u32;
        write_varint(&mut buf, type_table.len() as u32);
        for (class, tname, tver) in &type_table {
            write_varint(&mut buf, class.len() as u32);
            buf.extend_from_slice(class.as_bytes());
            write_varint(&mut buf, tname.len() as u32);
            buf.extend_from_slice(tname.as_bytes());
            write_varint(&mut buf, *tver);
        }

        buf.extend_from_slice(&entries_offset.to_le_bytes());
        buf.extend_from_slice(&types_offset.to_le_bytes());
        buf
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

    #[test]
    fn parses_uncompressed_envelope() {
        let raw = build_packfile("Autodesk.CloudPlatform.FragmentList", 1, &[
            ("Autodesk.CloudPlatform.Fragment", "Autodesk.CloudPlatform.Fragment", 1, vec![0xAA, 0xBB]),
        ]);
        let pf = PackFileReader::parse(&raw).unwrap();
        assert_eq!(pf.type_tag, "Autodesk.CloudPlatform.FragmentList");
        assert_eq!(pf.version, 1);
        assert_eq!(pf.entry_count(), 1);

        let (mut stream, ty) = pf.seek_entry(0).unwrap();
        assert_eq!(ty.class, "Autodesk.CloudPlatform.Fragment");
        assert_eq!(stream.u8().unwrap(), 0xAA);
        assert_eq!(stream.u8().unwrap(), 0xBB);
    }

    #[test]
    fn gzip_and_inflated_forms_agree() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let raw = build_packfile("T", 2, &[("c", "t", 1, vec![1, 2, 3])]);

        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&raw).unwrap();
        let gzipped = enc.finish().unwrap();

        let plain = PackFileReader::parse(&raw).unwrap();
        let zipped = PackFileReader::parse(&gzipped).unwrap();

        assert_eq!(plain.type_tag, zipped.type_tag);
        assert_eq!(plain.version, zipped.version);
        assert_eq!(plain.entry_count(), zipped.entry_count());
        assert_eq!(plain.types().len(), zipped.types().len());
    }

    #[test]
    fn unknown_transform_kind_errors() {
        let buf = [7u8];
        let mut s = BinaryStream::new(&buf);
        assert!(matches!(read_transform(&mut s), Err(PackFileError::UnknownTransformKind(7))));
    }

    #[test]
    fn transform_kind_3_round_trips() {
        let mut buf = vec![3u8];
        for f in [1.0f32, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0] {
            buf.extend_from_slice(&f.to_le_bytes());
        }
        for f in [5.0f64, 0.0, 0.0] {
            buf.extend_from_slice(&f.to_le_bytes());
        }
        let mut s = BinaryStream::new(&buf);
        let t = read_transform(&mut s).unwrap();
        match t {
            Transform::Linear { linear, translation } => {
                assert_eq!(linear.0, [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
                assert_eq!(translation, Vector3 { x: 5.0, y: 0.0, z: 0.0 });
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }
}

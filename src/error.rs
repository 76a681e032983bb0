//! Error taxonomy for the SVF→glTF pipeline.
//!
//! Each fallible boundary gets its own `thiserror` enum, in the style of
//! `fdm::ParseError`/`bundles::ReadError` from the rest of this crate's
//! lineage: small, one variant per distinct failure, context carried as
//! fields rather than formatted strings.

use thiserror::Error;

/// Errors raised while reading raw bytes out of a [`crate::binary::BinaryStream`].
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("read past end of buffer at offset {offset} (wanted {wanted} bytes, {remaining} remained)")]
    UnexpectedEof {
        offset: usize,
        wanted: usize,
        remaining: usize,
    },

    #[error("seek to {0} is outside the buffer (length {1})")]
    BadOffset(usize, usize),

    #[error("varint at offset {0} did not terminate within 5 bytes")]
    BadVarint(usize),

    #[error("string at offset {0} is not valid UTF-8")]
    BadUtf8(usize),
}

/// Errors raised while parsing a packfile envelope (§4.2).
#[derive(Debug, Error)]
pub enum PackFileError {
    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("failed to inflate gzip-wrapped packfile: {0}")]
    Gzip(#[source] std::io::Error),

    #[error("entry index {index} is out of range (packfile has {count} entries)")]
    BadEntryIndex { index: u32, count: u32 },

    #[error("transform tag {0} is not one of the known kinds 0..=3")]
    UnknownTransformKind(u8),

    #[error("mesh-pack entity kind {0} is not one of the known kinds 0..=2")]
    UnknownEntityKind(u8),
}

/// Errors that abort an entire SVF read (§7: `CorruptSvf`, `TransportError`, `UnknownTransformKind`).
#[derive(Debug, Error)]
pub enum SvfError {
    #[error("asset {uri} is corrupt: {source}")]
    CorruptAsset {
        uri: String,
        #[source]
        source: PackFileError,
    },

    #[error("asset {uri} has malformed JSON: {source}")]
    MalformedJson {
        uri: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("asset {uri} could not be fetched: {source}")]
    Transport {
        uri: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("manifest did not reference any viewable geometry")]
    EmptyManifest,
}

/// Errors raised while writing the glTF output (§7: `WriterIoError`).
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize glTF manifest: {0}")]
    Json(#[from] serde_json::Error),
}

pub mod error;
pub mod hash;

pub mod binary;
pub mod svf;
pub mod imf;
pub mod gltf;

pub use svf::{AssetFetcher, Svf, SvfReader};

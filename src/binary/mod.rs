pub mod packfile;
pub mod stream;

pub use packfile::{PackFileReader, PackFileType, Matrix3x3, Quaternion, Transform, Vector3};
pub use stream::BinaryStream;

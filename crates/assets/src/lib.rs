//! Asset loading for the dicefield renderer.
//!
//! Thin boundary between file formats and the renderer-facing contracts:
//! OBJ text becomes an `IndexedFaceSet`, encoded images become RGBA8
//! `TextureImage`s. Everything here runs before meshes are handed to the
//! renderer; the render loop itself never touches I/O.

mod obj;
mod texture;

pub use obj::{load_obj, parse_obj};
pub use texture::{decode_image, load_image};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OBJ parse error at line {line}: {message}")]
    ObjParse { line: usize, message: String },
    #[error("image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),
}

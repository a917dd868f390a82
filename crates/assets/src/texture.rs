use crate::AssetError;
use dicefield_common::TextureImage;
use std::path::Path;

/// Decode encoded image bytes (PNG or JPEG) into a tightly packed RGBA8
/// texture image.
pub fn decode_image(bytes: &[u8]) -> Result<TextureImage, AssetError> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = decoded.dimensions();
    Ok(TextureImage::from_rgba8(width, height, decoded.into_raw()))
}

/// Read and decode an image file.
pub fn load_image(path: impl AsRef<Path>) -> Result<TextureImage, AssetError> {
    let bytes = std::fs::read(path.as_ref())?;
    let img = decode_image(&bytes)?;
    tracing::debug!(
        path = %path.as_ref().display(),
        width = img.width(),
        height = img.height(),
        "loaded texture"
    );
    Ok(img)
}

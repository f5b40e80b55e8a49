//! Texture images for body surfaces and the starfield.
//!
//! Textures are looked up by stem in a directory: `<dir>/<stem>.jpg` first,
//! then `<dir>/<stem>.png`. A texture that cannot be loaded is replaced by a
//! 1×1 image of the body's fallback colour, so a missing asset never stops the
//! viewer.

use std::path::{Path, PathBuf};

use crate::error::TextureError;

/// File extensions tried for each texture stem, in order.
pub const TEXTURE_EXTENSIONS: [&str; 2] = ["jpg", "png"];

/// Decoded RGBA8 pixel data ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    /// Raw RGBA pixel data (width * height * 4 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureImage {
    /// Decode an image file (PNG or JPEG).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let bytes = std::fs::read(path.as_ref())?;
        let img = image::load_from_memory(&bytes)?.into_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            data: img.into_raw(),
            width,
            height,
        })
    }

    /// Find and decode `<dir>/<stem>.jpg` or `<dir>/<stem>.png`.
    pub fn find(dir: &Path, stem: &str) -> Result<Self, TextureError> {
        let path = locate(dir, stem).ok_or_else(|| TextureError::NotFound(stem.to_string()))?;
        Self::from_file(path)
    }

    /// A single opaque pixel.
    pub fn solid(r: u8, g: u8, b: u8) -> Self {
        Self {
            data: vec![r, g, b, 255],
            width: 1,
            height: 1,
        }
    }

    /// Load by stem, falling back to a solid colour with a warning.
    pub fn load_or_solid(dir: &Path, stem: &str, fallback: [u8; 3]) -> Self {
        match Self::find(dir, stem) {
            Ok(image) => {
                tracing::debug!(stem, width = image.width, height = image.height, "Loaded texture");
                image
            }
            Err(e) => {
                tracing::warn!("Texture `{}` unavailable ({}), using solid colour", stem, e);
                Self::solid(fallback[0], fallback[1], fallback[2])
            }
        }
    }
}

/// First existing candidate path for a texture stem.
pub fn locate(dir: &Path, stem: &str) -> Option<PathBuf> {
    TEXTURE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("solarium-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_solid() {
        let tex = TextureImage::solid(10, 20, 30);
        assert_eq!(tex.width, 1);
        assert_eq!(tex.height, 1);
        assert_eq!(tex.data, vec![10, 20, 30, 255]);
    }

    #[test]
    fn test_missing_texture_falls_back() {
        let dir = scratch_dir("missing");
        assert!(matches!(
            TextureImage::find(&dir, "pluto"),
            Err(TextureError::NotFound(_))
        ));
        let tex = TextureImage::load_or_solid(&dir, "pluto", [1, 2, 3]);
        assert_eq!(tex, TextureImage::solid(1, 2, 3));
    }

    #[test]
    fn test_png_round_trip_from_disk() {
        let dir = scratch_dir("png");
        let img = image::RgbaImage::from_pixel(4, 2, image::Rgba([200, 100, 50, 255]));
        img.save(dir.join("mars.png")).unwrap();

        assert_eq!(locate(&dir, "mars"), Some(dir.join("mars.png")));
        let tex = TextureImage::find(&dir, "mars").unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(&tex.data[..4], &[200, 100, 50, 255]);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = scratch_dir("corrupt");
        std::fs::write(dir.join("venus.jpg"), b"not an image").unwrap();
        assert!(matches!(
            TextureImage::find(&dir, "venus"),
            Err(TextureError::ImageLoad(_))
        ));
    }
}

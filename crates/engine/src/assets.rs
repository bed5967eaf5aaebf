use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read image file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image file {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Shared, immutable RGBA pixel buffer. Opaque to the simulation core; the
/// rendering collaborator reads the pixels, nothing else touches them.
#[derive(Debug, Clone)]
pub struct ImageHandle(Arc<RgbaImage>);

impl ImageHandle {
    pub fn from_image(image: RgbaImage) -> Self {
        Self(Arc::new(image))
    }

    /// Solid-color image, used as the filler tile when a tileset entry
    /// declares no image of its own.
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self::from_image(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.0
    }

    /// Returns a copy scaled to exactly `width` x `height`, or `self` when
    /// the dimensions already match.
    pub fn scaled_to(&self, width: u32, height: u32) -> Self {
        if self.width() == width && self.height() == height {
            return self.clone();
        }
        Self::from_image(imageops::resize(
            self.0.as_ref(),
            width,
            height,
            FilterType::Nearest,
        ))
    }

    /// Composites `overlay` on top of a copy of this image at the given
    /// pixel offset.
    pub fn composited(&self, overlay: &ImageHandle, offset: (i64, i64)) -> Self {
        let mut base = self.0.as_ref().clone();
        imageops::overlay(&mut base, overlay.0.as_ref(), offset.0, offset.1);
        Self::from_image(base)
    }
}

/// Stateless image-loading service injected into the tileset loader. Tests
/// substitute an in-memory implementation.
pub trait ImageLoader {
    fn load_image(&self, path: &Path) -> Result<ImageHandle, AssetError>;
}

/// Loads images from the filesystem via the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskImageLoader;

impl ImageLoader for DiskImageLoader {
    fn load_image(&self, path: &Path) -> Result<ImageHandle, AssetError> {
        let bytes = fs::read(path).map_err(|source| AssetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = image::load_from_memory(&bytes).map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(ImageHandle::from_image(decoded.to_rgba8()))
    }
}

//! Per-type image cache and generated images

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::{imageops::FilterType, Rgba, RgbaImage};
use thiserror::Error;

/// Error type for image loading and writing
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("image not found: {0}")]
    Missing(String),
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fill of the generated default tile (red, alpha 150)
const DEFAULT_TILE_COLOR: Rgba<u8> = Rgba([255, 0, 0, 150]);
/// Placeholder checker colors
const PLACEHOLDER_A: Rgba<u8> = Rgba([255, 0, 255, 255]);
const PLACEHOLDER_B: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A decoded tile image
#[derive(Debug, Clone)]
pub struct TileImage {
    pub rgba: RgbaImage,
    /// True when the real image couldn't be loaded
    pub placeholder: bool,
}

/// Decode an image file into RGBA8
pub fn load_image(path: &Path) -> Result<RgbaImage, AssetError> {
    if !path.is_file() {
        return Err(AssetError::Missing(path.display().to_string()));
    }
    let img = image::open(path).map_err(|source| AssetError::Decode {
        path: path.display().to_string(),
        source,
    })?;
    Ok(img.to_rgba8())
}

/// Magenta/black checker shown for tiles whose image is missing
pub fn placeholder_image(size: u32) -> RgbaImage {
    let cell = (size / 4).max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            PLACEHOLDER_A
        } else {
            PLACEHOLDER_B
        }
    })
}

/// Scale an image to a `size` square, leaving it alone if it already is one
pub fn fit_to_tile(img: RgbaImage, size: u32) -> RgbaImage {
    if img.dimensions() == (size, size) {
        img
    } else {
        image::imageops::resize(&img, size, size, FilterType::Lanczos3)
    }
}

/// Translucent red square used as the stock tile
pub fn default_tile_image(size: u32) -> RgbaImage {
    RgbaImage::from_pixel(size, size, DEFAULT_TILE_COLOR)
}

/// Write the stock tile to `path` unless a file is already there.
/// Returns true if a file was written.
pub fn ensure_default_tile(path: &Path, size: u32) -> Result<bool, AssetError> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    default_tile_image(size)
        .save(path)
        .map_err(|source| AssetError::Encode {
            path: path.display().to_string(),
            source,
        })?;
    Ok(true)
}

/// Tile images keyed by tile type.
///
/// The first tile seen for a type decides its image; later tiles of the same
/// type reuse it without touching the disk.
#[derive(Debug)]
pub struct AssetCache {
    images: HashMap<String, TileImage>,
    /// Base directory for relative image paths
    base_dir: PathBuf,
    /// Edge length of generated placeholders
    tile_size: u32,
}

impl AssetCache {
    pub fn with_base_dir(base_dir: impl Into<PathBuf>, tile_size: u32) -> Self {
        Self {
            images: HashMap::new(),
            base_dir: base_dir.into(),
            tile_size: tile_size.max(1),
        }
    }

    /// Image for a tile type, loading `image_path` the first time the type
    /// is seen and scaling it to the tile size. A missing or broken file is
    /// reported once and replaced by a placeholder.
    pub fn get_or_load(&mut self, tile_type: &str, image_path: &str) -> &TileImage {
        let base_dir = &self.base_dir;
        let tile_size = self.tile_size;
        self.images.entry(tile_type.to_string()).or_insert_with(|| {
            match load_image(&base_dir.join(image_path)) {
                Ok(rgba) => {
                    log::debug!("Loaded image for '{}' from {}", tile_type, image_path);
                    TileImage {
                        rgba: fit_to_tile(rgba, tile_size),
                        placeholder: false,
                    }
                }
                Err(e) => {
                    log::warn!("Tile type '{}': {}, using placeholder", tile_type, e);
                    TileImage {
                        rgba: placeholder_image(tile_size),
                        placeholder: true,
                    }
                }
            }
        })
    }

    pub fn get(&self, tile_type: &str) -> Option<&TileImage> {
        self.images.get(tile_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_default_tile() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("assets/default_tile.png");

        assert!(ensure_default_tile(&path, 50).unwrap());
        assert!(!ensure_default_tile(&path, 50).unwrap());

        let img = load_image(&path).unwrap();
        assert_eq!(img.dimensions(), (50, 50));
        assert_eq!(*img.get_pixel(10, 10), DEFAULT_TILE_COLOR);
    }

    #[test]
    fn test_loads_once_per_type() {
        let dir = TempDir::new().unwrap();
        ensure_default_tile(&dir.path().join("red.png"), 8).unwrap();
        let mut cache = AssetCache::with_base_dir(dir.path(), 8);

        assert!(!cache.get_or_load("default", "red.png").placeholder);
        // Removing the file doesn't matter once the type is cached
        std::fs::remove_file(dir.path().join("red.png")).unwrap();
        assert!(!cache.get_or_load("default", "red.png").placeholder);
        // The first image seen wins, even if a later tile names another file
        assert!(!cache.get_or_load("default", "other.png").placeholder);
        assert!(cache.get("other").is_none());
    }

    #[test]
    fn test_missing_image_uses_placeholder() {
        let dir = TempDir::new().unwrap();
        let mut cache = AssetCache::with_base_dir(dir.path(), 16);

        let image = cache.get_or_load("ghost", "nope.png");
        assert!(image.placeholder);
        assert_eq!(image.rgba.dimensions(), (16, 16));
        assert!(cache.get("ghost").is_some_and(|image| image.placeholder));
    }

    #[test]
    fn test_images_are_scaled_to_tile_size() {
        let dir = TempDir::new().unwrap();
        ensure_default_tile(&dir.path().join("big.png"), 64).unwrap();
        ensure_default_tile(&dir.path().join("small.png"), 4).unwrap();
        let mut cache = AssetCache::with_base_dir(dir.path(), 16);

        assert_eq!(cache.get_or_load("big", "big.png").rgba.dimensions(), (16, 16));
        assert_eq!(cache.get_or_load("small", "small.png").rgba.dimensions(), (16, 16));
        assert_eq!(cache.get("big").map(|image| image.placeholder), Some(false));
    }

    #[test]
    fn test_undecodable_image_uses_placeholder() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"definitely not a png").unwrap();

        assert!(matches!(
            load_image(&dir.path().join("broken.png")),
            Err(AssetError::Decode { .. })
        ));
        let mut cache = AssetCache::with_base_dir(dir.path(), 16);
        assert!(cache.get_or_load("broken", "broken.png").placeholder);
    }

    #[test]
    fn test_placeholder_checker() {
        let img = placeholder_image(8);
        assert_eq!(*img.get_pixel(0, 0), PLACEHOLDER_A);
        assert_eq!(*img.get_pixel(2, 0), PLACEHOLDER_B);
        assert_eq!(*img.get_pixel(2, 2), PLACEHOLDER_A);
    }
}

//! Editor configuration
//!
//! Read from `levelgrid.ron` in the working directory. Every field has a
//! default, so the file can be partial or absent:
//!
//! ```ron
//! (
//!     tile_size: 32,
//!     document_path: "levels/first.json",
//!     palette: [
//!         (tile_type: "grass", image: "assets/grass.png"),
//!         (tile_type: "stone", image: "assets/stone.png"),
//!     ],
//! )
//! ```

use serde::Deserialize;
use thiserror::Error;

use crate::storage::{LocalStorage, StorageError};
use crate::ui::Rect;

/// Config file name, relative to the working directory
pub const CONFIG_FILE: &str = "levelgrid.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] StorageError),
    #[error("config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// A tile type the user can paint with
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaletteEntry {
    pub tile_type: String,
    pub image: String,
}

impl PaletteEntry {
    pub fn new(tile_type: &str, image: &str) -> Self {
        Self {
            tile_type: tile_type.to_string(),
            image: image.to_string(),
        }
    }
}

/// Window, grid and document settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub window_width: i32,
    pub window_height: i32,
    pub caption: String,
    /// Region of the window holding the grid, in window pixels
    pub grid_area: Rect,
    /// Edge length of a (square) tile in pixels
    pub tile_size: i32,
    /// Where the level is loaded from and saved to
    pub document_path: String,
    pub palette: Vec<PaletteEntry>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            window_width: 1100,
            window_height: 600,
            caption: "Level Editor | Editor".to_string(),
            grid_area: Rect::new(1100 - 780, 30, 750, 450),
            tile_size: 50,
            document_path: "level.json".to_string(),
            palette: vec![PaletteEntry::new("default", "assets/default_tile.png")],
        }
    }
}

impl EditorConfig {
    /// Parse a config from RON text, repairing unusable values
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = ron::from_str(text)?;
        Ok(config.sanitized())
    }

    /// Load the config file from storage
    pub fn load(path: &str, storage: &LocalStorage) -> Result<Self, ConfigError> {
        let text = storage.read_text(path)?;
        Self::parse(&text)
    }

    /// Load the config file, falling back to defaults when it is absent or
    /// broken
    pub fn load_or_default(storage: &LocalStorage) -> Self {
        match Self::load(CONFIG_FILE, storage) {
            Ok(config) => {
                log::info!("Loaded config from {}", CONFIG_FILE);
                config
            }
            Err(ConfigError::Io(StorageError::NotFound(_))) => Self::default(),
            Err(e) => {
                log::warn!("Ignoring {}: {}", CONFIG_FILE, e);
                Self::default()
            }
        }
    }

    /// Replace values the editor can't work with by their defaults
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.tile_size <= 0 {
            log::warn!("tile_size must be positive (got {}), using {}", self.tile_size, defaults.tile_size);
            self.tile_size = defaults.tile_size;
        }
        if self.grid_area.is_empty() {
            log::warn!("grid_area has no size ({:?}), using default", self.grid_area);
            self.grid_area = defaults.grid_area;
        }
        if self.window_width <= 0 || self.window_height <= 0 {
            log::warn!("window size must be positive, using default");
            self.window_width = defaults.window_width;
            self.window_height = defaults.window_height;
        }
        self.palette.retain(|entry| !entry.tile_type.is_empty());
        if self.palette.is_empty() {
            log::warn!("palette is empty, using default tile");
            self.palette = defaults.palette;
        }
        if self.document_path.trim().is_empty() {
            self.document_path = defaults.document_path;
        }
        self
    }
}

//! Tilemap document loading and saving
//!
//! Levels are stored as versioned JSON:
//! `{ "version": "...", "layers": { "tiles": [ { "type", "pos", "id", "image" } ] } }`
//!
//! Parsing always validates, so a document that comes back from
//! [`parse_document`] is safe to swap into the editor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Layer, Tile, DEFAULT_LAYER};
use crate::storage::{LocalStorage, StorageError};

/// Validation limits to prevent resource exhaustion from malicious files
pub mod limits {
    /// Maximum number of layers in a document
    pub const MAX_LAYERS: usize = 64;
    /// Maximum tiles in a single layer
    pub const MAX_TILES_PER_LAYER: usize = 65_536;
    /// Maximum string length for layer names, tile types and image paths
    pub const MAX_STRING_LEN: usize = 1024;
    /// Highest tile id a document may carry
    pub const MAX_TILE_ID: u32 = (1 << 24) - 1;
}

/// Error type for document loading and saving
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document not found: {0}")]
    Missing(String),
    #[error("storage error: {0}")]
    Storage(StorageError),
    #[error("parse error: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("validation error: {0}")]
    Validation(String),
}

impl DocumentError {
    /// True for documents that exist but can't be used
    pub fn is_malformed(&self) -> bool {
        matches!(self, DocumentError::Parse(_) | DocumentError::Validation(_))
    }
}

impl From<StorageError> for DocumentError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(path) => DocumentError::Missing(path),
            other => DocumentError::Storage(other),
        }
    }
}

/// The persisted form of a level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilemapDocument {
    pub version: String,
    pub layers: BTreeMap<String, Vec<Tile>>,
}

impl TilemapDocument {
    /// Document holding one layer under the default layer name, stamped with
    /// the running version
    pub fn from_layer(layer: &Layer) -> Self {
        let mut layers = BTreeMap::new();
        layers.insert(DEFAULT_LAYER.to_string(), layer.tiles().to_vec());
        Self {
            version: crate::VERSION.to_string(),
            layers,
        }
    }

    /// Whether the document was written by this version of the editor
    pub fn is_current_version(&self) -> bool {
        self.version == crate::VERSION
    }

    /// Tiles of the default layer, if present
    pub fn default_layer(&self) -> Option<&[Tile]> {
        self.layers.get(DEFAULT_LAYER).map(Vec::as_slice)
    }

    /// Take the default layer out, leaving the others.
    /// Validated documents always have one.
    pub fn take_default_layer(&mut self) -> Vec<Tile> {
        self.layers.remove(DEFAULT_LAYER).unwrap_or_default()
    }

    /// Names of layers other than the default one
    pub fn extra_layers(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str).filter(|name| *name != DEFAULT_LAYER)
    }
}

fn check_len(value: &str, what: &str) -> Result<(), DocumentError> {
    if value.len() > limits::MAX_STRING_LEN {
        return Err(DocumentError::Validation(format!(
            "{} too long ({} > {})",
            what,
            value.len(),
            limits::MAX_STRING_LEN
        )));
    }
    Ok(())
}

/// Validate a tile
fn validate_tile(tile: &Tile, context: &str) -> Result<(), DocumentError> {
    if tile.tile_type().is_empty() {
        return Err(DocumentError::Validation(format!("{}: empty tile type", context)));
    }
    check_len(tile.tile_type(), &format!("{} type", context))?;
    check_len(tile.image(), &format!("{} image", context))?;
    if tile.id() > limits::MAX_TILE_ID {
        return Err(DocumentError::Validation(format!(
            "{}: id {} out of range (> {})",
            context,
            tile.id(),
            limits::MAX_TILE_ID
        )));
    }
    Ok(())
}

/// Check a parsed document against the limits
pub fn validate_document(doc: &TilemapDocument) -> Result<(), DocumentError> {
    if doc.version.trim().is_empty() {
        return Err(DocumentError::Validation("empty version".to_string()));
    }
    check_len(&doc.version, "version")?;

    if doc.layers.len() > limits::MAX_LAYERS {
        return Err(DocumentError::Validation(format!(
            "too many layers ({} > {})",
            doc.layers.len(),
            limits::MAX_LAYERS
        )));
    }

    if doc.default_layer().is_none() {
        return Err(DocumentError::Validation(format!("missing layer '{}'", DEFAULT_LAYER)));
    }

    for (name, tiles) in &doc.layers {
        check_len(name, "layer name")?;
        if tiles.len() > limits::MAX_TILES_PER_LAYER {
            return Err(DocumentError::Validation(format!(
                "layer '{}': too many tiles ({} > {})",
                name,
                tiles.len(),
                limits::MAX_TILES_PER_LAYER
            )));
        }
        for (i, tile) in tiles.iter().enumerate() {
            validate_tile(tile, &format!("layer '{}' tile[{}]", name, i))?;
        }
    }

    Ok(())
}

/// Parse and validate a document from JSON text
pub fn parse_document(text: &str) -> Result<TilemapDocument, DocumentError> {
    let doc: TilemapDocument = serde_json::from_str(text).map_err(DocumentError::Parse)?;
    validate_document(&doc)?;
    Ok(doc)
}

/// Serialize a document to pretty-printed JSON
pub fn serialize_document(doc: &TilemapDocument) -> Result<String, DocumentError> {
    serde_json::to_string_pretty(doc).map_err(DocumentError::Serialize)
}

/// Load a document using the storage backend
pub fn load_document(path: &str, storage: &LocalStorage) -> Result<TilemapDocument, DocumentError> {
    let text = storage.read_text(path)?;
    parse_document(&text)
}

/// Save a document using the storage backend, overwriting any existing file
pub fn save_document(doc: &TilemapDocument, path: &str, storage: &LocalStorage) -> Result<(), DocumentError> {
    let text = serialize_document(doc)?;
    storage.write_text(path, &text)?;
    Ok(())
}

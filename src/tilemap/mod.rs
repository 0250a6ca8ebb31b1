//! Tile map data model
//!
//! Tiles are immutable once placed. A layer is an ordered list of tiles:
//! insertion order is render order, and overlapping tiles all persist.
//! Tile ids come from a [`TileRegistry`] which hands out one id per tile type.

pub mod document;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use document::*;

/// Name of the layer the grid edits
pub const DEFAULT_LAYER: &str = "tiles";

/// Area-local pixel position, always a multiple of the tile size when placed
/// by the editor. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos(pub i32, pub i32);

impl TilePos {
    pub fn x(&self) -> i32 {
        self.0
    }

    pub fn y(&self) -> i32 {
        self.1
    }

    /// True if both axes sit on a `tile_size` boundary
    pub fn is_aligned(&self, tile_size: i32) -> bool {
        tile_size > 0 && self.0.rem_euclid(tile_size) == 0 && self.1.rem_euclid(tile_size) == 0
    }
}

/// One placed tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    #[serde(rename = "type")]
    tile_type: String,
    pos: TilePos,
    id: u32,
    image: String,
}

impl Tile {
    pub fn new(tile_type: impl Into<String>, pos: TilePos, id: u32, image: impl Into<String>) -> Self {
        Self {
            tile_type: tile_type.into(),
            pos,
            id,
            image: image.into(),
        }
    }

    pub fn tile_type(&self) -> &str {
        &self.tile_type
    }

    pub fn pos(&self) -> TilePos {
        self.pos
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Path of the image used to draw this tile
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Same tile with a different id
    pub(crate) fn with_id(self, id: u32) -> Self {
        Self { id, ..self }
    }
}

/// Ordered tile collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    tiles: Vec<Tile>,
}

impl Layer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        Self { tiles }
    }

    pub fn push(&mut self, tile: Tile) {
        self.tiles.push(tile);
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Topmost (last drawn) tile at a position
    pub fn top_at(&self, pos: TilePos) -> Option<&Tile> {
        self.tiles.iter().rev().find(|t| t.pos == pos)
    }

    /// All tiles at a position, in render order
    pub fn all_at(&self, pos: TilePos) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(move |t| t.pos == pos)
    }

    /// Remove the topmost tile at a position
    pub fn remove_top_at(&mut self, pos: TilePos) -> Option<Tile> {
        let index = self.tiles.iter().rposition(|t| t.pos == pos)?;
        Some(self.tiles.remove(index))
    }
}

/// Outcome of registering a `(type, id)` pair read from a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The pair matches (or now extends) the registry
    Accepted,
    /// The type or id was already claimed; the type's registry id is returned
    Renumbered(u32),
}

/// Tile type -> id table.
///
/// Ids are handed out in first-seen order starting at 0, so the same type
/// always gets the same id within a session. Saved ids above
/// `limits::MAX_TILE_ID` are never kept.
#[derive(Debug, Clone, Default)]
pub struct TileRegistry {
    ids: HashMap<String, u32>,
    types: HashMap<u32, String>,
    next_id: u32,
}

impl TileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for a type, registering it if unseen
    pub fn id_for(&mut self, tile_type: &str) -> u32 {
        if let Some(&id) = self.ids.get(tile_type) {
            return id;
        }
        let id = self.next_id;
        self.insert(tile_type, id);
        id
    }

    /// Id of an already registered type
    pub fn get(&self, tile_type: &str) -> Option<u32> {
        self.ids.get(tile_type).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Register a pair read from a saved document, keeping its id when it
    /// doesn't clash with what the registry already knows.
    pub fn register_saved(&mut self, tile_type: &str, id: u32) -> Registration {
        let id_unusable = id > limits::MAX_TILE_ID || self.types.contains_key(&id);
        match (self.get(tile_type), id_unusable) {
            (Some(known), _) if known == id => Registration::Accepted,
            (Some(known), _) => Registration::Renumbered(known),
            (None, true) => Registration::Renumbered(self.id_for(tile_type)),
            (None, false) => {
                self.insert(tile_type, id);
                Registration::Accepted
            }
        }
    }

    fn insert(&mut self, tile_type: &str, id: u32) {
        self.ids.insert(tile_type.to_string(), id);
        self.types.insert(id, tile_type.to_string());
        self.next_id = self.next_id.max(id + 1);
    }
}

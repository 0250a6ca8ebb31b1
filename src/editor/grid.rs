//! Grid manager - tile placement over a fixed screen area
//!
//! Pointer positions are translated into area-local pixels and snapped down
//! to the tile grid. The snapped cell is the highlight: where the next tile
//! goes, and what removal targets.

use macroquad::prelude::*;
use thiserror::Error;

use super::render::TileTextures;
use crate::asset::AssetCache;
use crate::input::InputSnapshot;
use crate::tilemap::{Layer, Registration, Tile, TilePos, TileRegistry};
use crate::ui::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("pointer is outside the grid area")]
    HighlightHidden,
}

/// Snap a local coordinate down to the grid.
///
/// Uses floor semantics, so -1 snaps to -tile_size rather than 0.
pub fn snap_to_grid(coord: i32, tile_size: i32) -> i32 {
    coord.div_euclid(tile_size) * tile_size
}

/// The cell under the pointer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Highlight {
    /// Area-local, snapped
    pub pos: TilePos,
    /// Pointer is inside the grid area
    pub visible: bool,
}

/// Owns the edited layer and the tile id registry
#[derive(Debug, Clone)]
pub struct GridManager {
    area: Rect,
    tile_size: i32,
    highlight: Highlight,
    layer: Layer,
    registry: TileRegistry,
}

impl GridManager {
    /// `tile_size` must be positive
    pub fn new(area: Rect, tile_size: i32) -> Self {
        Self {
            area,
            tile_size: tile_size.max(1),
            highlight: Highlight::default(),
            layer: Layer::new(),
            registry: TileRegistry::new(),
        }
    }

    pub fn highlight(&self) -> Highlight {
        self.highlight
    }

    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    pub fn registry(&self) -> &TileRegistry {
        &self.registry
    }

    /// Recompute the highlighted cell from the pointer
    pub fn update(&mut self, input: &InputSnapshot) {
        let (px, py) = input.pointer();
        let (lx, ly) = self.area.to_local(px, py);
        self.highlight = Highlight {
            pos: TilePos(snap_to_grid(lx, self.tile_size), snap_to_grid(ly, self.tile_size)),
            visible: self.area.contains(px, py),
        };
    }

    /// Append a tile of `tile_type` at the highlighted cell.
    ///
    /// Returns the new tile, or `None` if the topmost tile there already has
    /// this type (so a held button doesn't stack copies).
    pub fn place_tile(&mut self, tile_type: &str, image: &str) -> Result<Option<&Tile>, GridError> {
        if !self.highlight.visible {
            return Err(GridError::HighlightHidden);
        }
        let pos = self.highlight.pos;
        if self.layer.top_at(pos).is_some_and(|t| t.tile_type() == tile_type) {
            return Ok(None);
        }

        let id = self.registry.id_for(tile_type);
        self.layer.push(Tile::new(tile_type, pos, id, image));
        Ok(self.layer.tiles().last())
    }

    /// Remove the topmost tile at the highlighted cell
    pub fn remove_tile(&mut self) -> Result<Option<Tile>, GridError> {
        if !self.highlight.visible {
            return Err(GridError::HighlightHidden);
        }
        Ok(self.layer.remove_top_at(self.highlight.pos))
    }

    /// Topmost tile at a cell
    pub fn tile_at(&self, pos: TilePos) -> Option<&Tile> {
        self.layer.top_at(pos)
    }

    /// Every tile at a cell, in render order
    pub fn tiles_at(&self, pos: TilePos) -> Vec<&Tile> {
        self.layer.all_at(pos).collect()
    }

    /// Replace the whole layer with tiles read from a document.
    ///
    /// The registry is rebuilt from the tiles' saved ids so they stay stable
    /// across sessions. Tiles whose ids clash are renumbered; the count of
    /// renumbered tiles is returned.
    pub fn replace_layer(&mut self, tiles: Vec<Tile>) -> usize {
        let mut registry = TileRegistry::new();
        let mut renumbered = 0;

        let tiles: Vec<Tile> = tiles
            .into_iter()
            .map(|tile| match registry.register_saved(tile.tile_type(), tile.id()) {
                Registration::Accepted => tile,
                Registration::Renumbered(id) => {
                    log::warn!(
                        "Tile '{}' at {:?} has id {}, renumbered to {}",
                        tile.tile_type(),
                        tile.pos(),
                        tile.id(),
                        id
                    );
                    renumbered += 1;
                    tile.with_id(id)
                }
            })
            .collect();

        for tile in tiles.iter().filter(|t| !t.pos().is_aligned(self.tile_size)) {
            log::debug!("Tile '{}' at {:?} is off the {}px grid", tile.tile_type(), tile.pos(), self.tile_size);
        }

        self.layer = Layer::from_tiles(tiles);
        self.registry = registry;
        renumbered
    }

    /// Drop every tile and forget registered types
    pub fn clear(&mut self) {
        self.layer = Layer::new();
        self.registry = TileRegistry::new();
    }

    /// Draw tiles in insertion order, then the highlight, then grid lines
    pub fn draw(&self, textures: &mut TileTextures, assets: &AssetCache) {
        let area = self.area;
        let (ax, ay) = (area.x as f32, area.y as f32);
        let size = self.tile_size as f32;

        draw_rectangle(ax, ay, area.w as f32, area.h as f32, BLACK);

        for tile in self.layer.tiles() {
            if let Some(texture) = textures.get(tile.tile_type(), assets) {
                draw_texture_ex(
                    texture,
                    ax + tile.pos().x() as f32,
                    ay + tile.pos().y() as f32,
                    WHITE,
                    DrawTextureParams {
                        dest_size: Some(vec2(size, size)),
                        ..Default::default()
                    },
                );
            }
        }

        if self.highlight.visible {
            draw_rectangle(
                ax + self.highlight.pos.x() as f32,
                ay + self.highlight.pos.y() as f32,
                size,
                size,
                Color::from_rgba(255, 0, 0, 150),
            );
        }

        for col in 0..area.w / self.tile_size {
            let x = ax + (col * self.tile_size) as f32;
            draw_line(x, ay, x, ay + area.h as f32, 1.0, WHITE);
        }
        for row in 0..area.h / self.tile_size {
            let y = ay + (row * self.tile_size) as f32;
            draw_line(ax, y, ax + area.w as f32, y, 1.0, WHITE);
        }
        draw_rectangle_lines(ax, ay, area.w as f32, area.h as f32, 1.0, WHITE);
    }
}

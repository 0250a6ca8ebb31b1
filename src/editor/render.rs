//! GPU-side drawing helpers

use std::collections::HashMap;

use macroquad::prelude::*;

use super::EditorState;
use crate::asset::AssetCache;
use crate::ui::Rect;

/// Height of the status bar at the bottom of the window
pub const STATUS_BAR_HEIGHT: i32 = 22;

/// Textures uploaded from the asset cache, keyed by tile type
#[derive(Default)]
pub struct TileTextures {
    textures: HashMap<String, Texture2D>,
}

impl TileTextures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture for a tile type, uploading it on first use.
    /// `None` if the asset cache has no image for the type yet, or the image
    /// is too large for a texture.
    pub fn get(&mut self, tile_type: &str, assets: &AssetCache) -> Option<&Texture2D> {
        if !self.textures.contains_key(tile_type) {
            let image = assets.get(tile_type)?;
            let (w, h) = texture_size(image.rgba.dimensions()).or_else(|| {
                log::warn!(
                    "Image for '{}' is {:?}, too large to upload",
                    tile_type,
                    image.rgba.dimensions()
                );
                None
            })?;
            let texture = Texture2D::from_rgba8(w, h, image.rgba.as_raw());
            texture.set_filter(FilterMode::Nearest);
            self.textures.insert(tile_type.to_string(), texture);
        }
        self.textures.get(tile_type)
    }
}

/// Image dimensions as texture dimensions, if they fit
fn texture_size((w, h): (u32, u32)) -> Option<(u16, u16)> {
    Some((u16::try_from(w).ok()?, u16::try_from(h).ok()?))
}

/// One-line summary: active palette tile, hovered cell, tile counts, save
/// state and the current status message
pub fn status_text(state: &EditorState) -> String {
    let mut status = format!(
        "Tile: {} ({}/{})",
        state.selected_tile().map(|entry| entry.tile_type.as_str()).unwrap_or("-"),
        state.selected_index() + 1,
        state.palette().len(),
    );

    let highlight = state.grid.highlight();
    if highlight.visible {
        let pos = highlight.pos;
        let stacked = state.grid.tiles_at(pos).len();
        match state.grid.tile_at(pos) {
            Some(top) => {
                status.push_str(&format!(" | Cell ({}, {}): {}", pos.x(), pos.y(), top.tile_type()));
                if stacked > 1 {
                    status.push_str(&format!(" +{}", stacked - 1));
                }
                if state.assets().get(top.tile_type()).is_some_and(|image| image.placeholder) {
                    status.push_str(" (missing image)");
                }
            }
            None => status.push_str(&format!(" | Cell ({}, {}): empty", pos.x(), pos.y())),
        }
    }

    status.push_str(&format!(
        " | Tiles: {} ({} types) | {}",
        state.grid.layer().len(),
        state.grid.registry().len(),
        if state.dirty { "Modified" } else { "Saved" }
    ));
    if let Some(message) = state.status() {
        status.push_str(" | ");
        status.push_str(message);
    }
    status
}

pub fn draw_status_bar(rect: Rect, state: &EditorState) {
    draw_rectangle(rect.x as f32, rect.y as f32, rect.w as f32, rect.h as f32, Color::from_rgba(40, 40, 45, 255));
    draw_text(&status_text(state), rect.x as f32 + 8.0, rect.y as f32 + 15.0, 16.0, WHITE);
}

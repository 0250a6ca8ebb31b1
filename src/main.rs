//! levelgrid: a minimal 2D tile level editor
//!
//! - Fixed grid area, snapped cell highlight under the pointer
//! - Left click places the selected tile, right click removes the top one
//! - 1-9 pick a tile from the palette, S saves, L reloads, Esc quits
//! - Levels are versioned JSON documents

/// Version from Cargo.toml, also stamped into saved documents
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;
mod asset;
mod config;
mod editor;
mod input;
mod storage;
mod tilemap;
mod ui;

use macroquad::miniquad::conf::Icon;
use macroquad::prelude::*;

use app::AppState;
use asset::ensure_default_tile;
use config::EditorConfig;
use input::InputSnapshot;
use storage::LocalStorage;

/// Image path of the stock palette tile, generated when missing
const DEFAULT_TILE_IMAGE: &str = "assets/default_tile.png";

/// RGBA icon: a red tile with a white grid, `size` pixels square
fn icon_pixels<const N: usize>(size: usize) -> [u8; N] {
    let mut pixels = [0u8; N];
    let step = (size / 4).max(1);
    for (i, px) in pixels.chunks_exact_mut(4).enumerate() {
        let (x, y) = (i % size, i / size);
        let on_line = x % step == 0 || y % step == 0 || x == size - 1 || y == size - 1;
        let rgba = if on_line { [255, 255, 255, 255] } else { [200, 30, 30, 255] };
        px.copy_from_slice(&rgba);
    }
    pixels
}

fn window_conf() -> Conf {
    let config = EditorConfig::load_or_default(&LocalStorage::new());
    Conf {
        window_title: format!("{} v{}", config.caption, VERSION),
        window_width: config.window_width,
        window_height: config.window_height,
        window_resizable: false,
        icon: Some(Icon {
            small: icon_pixels::<1024>(16),
            medium: icon_pixels::<4096>(32),
            big: icon_pixels::<16384>(64),
        }),
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("levelgrid v{}", VERSION);

    // Window close becomes a Quit event for the exit scheme
    prevent_quit();

    let storage = LocalStorage::new();
    let config = EditorConfig::load_or_default(&storage);

    if config.palette.iter().any(|entry| entry.image == DEFAULT_TILE_IMAGE) {
        match ensure_default_tile(&storage.resolve(DEFAULT_TILE_IMAGE), config.tile_size as u32) {
            Ok(true) => log::info!("Generated {}", DEFAULT_TILE_IMAGE),
            Ok(false) => {}
            Err(e) => log::warn!("Could not create {}: {}", DEFAULT_TILE_IMAGE, e),
        }
    }

    let mut app = AppState::new(&config, storage);
    app.editor.start();

    while app.is_running() {
        let input = InputSnapshot::capture();
        app.update(&input);
        app.draw();
        next_frame().await;
    }

    log::info!("Exiting");
}

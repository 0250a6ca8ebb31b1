//! Application state
//!
//! One editor plus the application-level exit controls. A frame is
//! `update` followed by `draw`; the main loop runs while `is_running`.

use macroquad::prelude::*;

use crate::config::EditorConfig;
use crate::editor::{EditorState, TileTextures};
use crate::input::bindings::{self, action};
use crate::input::{ControlScheme, InputSnapshot};
use crate::storage::LocalStorage;
use crate::ui::Rect;

pub struct AppState {
    pub editor: EditorState,
    exit_scheme: ControlScheme,
    textures: TileTextures,
    running: bool,
}

impl AppState {
    pub fn new(config: &EditorConfig, storage: LocalStorage) -> Self {
        Self {
            editor: EditorState::new(config, storage),
            exit_scheme: bindings::exit_scheme(),
            textures: TileTextures::new(),
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Handle one frame of input. Quitting ends the loop instead of
    /// aborting the process.
    pub fn update(&mut self, input: &InputSnapshot) {
        if self.exit_scheme.is_active(input, action::QUIT) {
            if self.editor.dirty {
                log::warn!("Quitting with unsaved changes");
            }
            log::info!("Quit requested");
            self.running = false;
            return;
        }
        self.editor.update(input);
    }

    pub fn draw(&mut self) {
        clear_background(BLACK);
        let screen = Rect::new(0, 0, screen_width() as i32, screen_height() as i32);
        self.editor.draw(&mut self.textures, screen);
    }
}

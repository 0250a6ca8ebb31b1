//! Editor state and frame update
//!
//! ```text
//! Init ──start()──► Ready ◄──────────────┐
//!                    │  save action      │
//!                    ├──► Saving ────────┤
//!                    │  load action      │
//!                    └──► Loading ───────┘
//! ```
//!
//! Every load/save failure is recovered here; nothing propagates further.

use super::grid::{GridError, GridManager};
use super::render::{draw_status_bar, TileTextures, STATUS_BAR_HEIGHT};
use crate::asset::AssetCache;
use crate::config::{EditorConfig, PaletteEntry};
use crate::input::bindings::{self, action};
use crate::input::{ControlScheme, InputSnapshot};
use crate::storage::LocalStorage;
use crate::tilemap::{load_document, save_document, DocumentError, TilemapDocument};
use crate::ui::Rect;

/// How long status messages stay on screen (seconds)
const STATUS_DURATION: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Init,
    Ready,
    Saving,
    Loading,
}

/// Result of reading the tilemap document
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded {
        tiles: usize,
        /// Tiles whose saved id clashed and was replaced
        renumbered: usize,
        /// Document was written by another version
        version_mismatch: bool,
    },
    /// No document at the path; the layer is empty
    Missing,
    /// Unreadable or malformed document
    Failed(DocumentError),
}

pub struct EditorState {
    pub grid: GridManager,
    controls: ControlScheme,
    assets: AssetCache,
    storage: LocalStorage,
    document_path: String,
    palette: Vec<PaletteEntry>,
    selected: usize,
    phase: EditorPhase,
    /// Has unsaved changes
    pub dirty: bool,
    status_message: Option<(String, f64)>, // (message, expiry_time)
    /// Timestamp of the current frame
    now: f64,
}

impl EditorState {
    pub fn new(config: &EditorConfig, storage: LocalStorage) -> Self {
        let tile_size = config.tile_size.max(1);
        Self {
            grid: GridManager::new(config.grid_area, tile_size),
            controls: bindings::editor_scheme(),
            assets: AssetCache::with_base_dir(storage.base_dir(), tile_size as u32),
            storage,
            document_path: config.document_path.clone(),
            palette: config.palette.clone(),
            selected: 0,
            phase: EditorPhase::Init,
            dirty: false,
            status_message: None,
            now: 0.0,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> EditorPhase {
        self.phase
    }

    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    pub fn palette(&self) -> &[PaletteEntry] {
        &self.palette
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_tile(&self) -> Option<&PaletteEntry> {
        self.palette.get(self.selected)
    }

    /// Make a palette entry the one placed by clicks
    pub fn select_tile(&mut self, index: usize) {
        if let Some(entry) = self.palette.get(index) {
            log::debug!("Selected tile '{}'", entry.tile_type);
            self.selected = index;
        }
    }

    /// Set a status message that will be displayed for a duration
    pub fn set_status(&mut self, message: &str, duration_secs: f64) {
        self.status_message = Some((message.to_string(), self.now + duration_secs));
    }

    /// Get current status message if not expired
    pub fn status(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, expiry)) if self.now < *expiry => Some(msg),
            _ => None,
        }
    }

    /// Initial load. An absent or broken document leaves an empty layer.
    pub fn start(&mut self) -> LoadOutcome {
        self.phase = EditorPhase::Loading;

        let outcome = self.load();
        if !matches!(outcome, LoadOutcome::Loaded { .. }) {
            self.grid.clear();
        }
        self.report_load(&outcome, true);

        self.phase = EditorPhase::Ready;
        outcome
    }

    /// Re-read the document from disk, replacing unsaved edits.
    /// On failure the current layer is kept.
    pub fn reload(&mut self) -> LoadOutcome {
        self.phase = EditorPhase::Loading;

        let had_unsaved = self.dirty;
        let outcome = self.load();
        self.report_load(&outcome, false);
        if had_unsaved && matches!(outcome, LoadOutcome::Loaded { .. }) {
            log::warn!("Reloaded {} over unsaved changes", self.document_path);
            self.set_status(
                &format!("Reloaded {}, unsaved changes discarded", self.document_path),
                STATUS_DURATION,
            );
        }

        self.phase = EditorPhase::Ready;
        outcome
    }

    fn load(&mut self) -> LoadOutcome {
        match load_document(&self.document_path, &self.storage) {
            Ok(doc) => self.apply_document(doc),
            Err(DocumentError::Missing(_)) => LoadOutcome::Missing,
            Err(e) => LoadOutcome::Failed(e),
        }
    }

    /// Log a load and put it in the status bar
    fn report_load(&mut self, outcome: &LoadOutcome, initial: bool) {
        let path = self.document_path.clone();
        match outcome {
            LoadOutcome::Loaded {
                tiles,
                renumbered,
                version_mismatch,
            } => {
                log::info!("Loaded {} tiles from {}", tiles, path);
                if *renumbered > 0 {
                    log::warn!("{}: {} tiles had clashing ids and were renumbered", path, renumbered);
                    self.set_status(&format!("Loaded {}, renumbered {} tiles", path, renumbered), STATUS_DURATION);
                } else if !*version_mismatch {
                    self.set_status(&format!("Loaded {}", path), STATUS_DURATION);
                }
            }
            LoadOutcome::Missing if initial => log::info!("No level at {}, starting empty", path),
            LoadOutcome::Missing => {
                log::warn!("Nothing to load at {}", path);
                self.set_status(&format!("Nothing to load at {}", path), STATUS_DURATION);
            }
            LoadOutcome::Failed(e) => {
                if e.is_malformed() {
                    log::warn!("{} is not a valid level: {}", path, e);
                } else {
                    log::error!("Failed to read {}: {}", path, e);
                }
                let kept = if initial { "starting empty" } else { "keeping current level" };
                self.set_status(&format!("Load failed: {}, {}", e, kept), STATUS_DURATION);
            }
        }
    }

    /// Write the layer to the document path, overwriting it
    pub fn save(&mut self) -> Result<(), DocumentError> {
        self.phase = EditorPhase::Saving;

        let doc = TilemapDocument::from_layer(self.grid.layer());
        let result = save_document(&doc, &self.document_path, &self.storage);
        match &result {
            Ok(()) => {
                log::info!("Saved {} tiles to {}", self.grid.layer().len(), self.document_path);
                self.set_status(&format!("Saved {}", self.document_path), STATUS_DURATION);
                self.dirty = false;
            }
            Err(e) => {
                log::error!("Failed to save {}: {}", self.document_path, e);
                self.set_status(&format!("Save failed: {}", e), STATUS_DURATION);
            }
        }

        self.phase = EditorPhase::Ready;
        result
    }

    /// Swap a loaded document in as the edited layer
    fn apply_document(&mut self, mut doc: TilemapDocument) -> LoadOutcome {
        let version_mismatch = !doc.is_current_version();
        if version_mismatch {
            log::warn!(
                "{} was written by version {} (running {}), loading anyway",
                self.document_path,
                doc.version,
                crate::VERSION
            );
            self.set_status(&format!("Loaded file from version {}", doc.version), STATUS_DURATION);
        }
        for name in doc.extra_layers() {
            log::warn!("Ignoring layer '{}' in {}", name, self.document_path);
        }

        let tiles = doc.take_default_layer();
        for tile in &tiles {
            self.assets.get_or_load(tile.tile_type(), tile.image());
        }
        let count = tiles.len();
        let renumbered = self.grid.replace_layer(tiles);
        self.dirty = renumbered > 0;

        LoadOutcome::Loaded {
            tiles: count,
            renumbered,
            version_mismatch,
        }
    }

    fn place_selected(&mut self) {
        let Some(entry) = self.palette.get(self.selected) else { return };
        match self.grid.place_tile(&entry.tile_type, &entry.image) {
            Ok(Some(tile)) => {
                log::debug!("Placed '{}' at {:?}", tile.tile_type(), tile.pos());
                self.assets.get_or_load(&entry.tile_type, &entry.image);
                self.dirty = true;
            }
            Ok(None) | Err(GridError::HighlightHidden) => {}
        }
    }

    fn remove_highlighted(&mut self) {
        match self.grid.remove_tile() {
            Ok(Some(tile)) => {
                log::debug!("Removed '{}' at {:?}", tile.tile_type(), tile.pos());
                self.dirty = true;
            }
            Ok(None) | Err(GridError::HighlightHidden) => {}
        }
    }

    /// Run one frame: move the highlight, then act on this frame's controls
    pub fn update(&mut self, input: &InputSnapshot) {
        if self.phase == EditorPhase::Init {
            self.start();
        }
        self.now = input.time;
        self.grid.update(input);

        let actions: Vec<String> = self
            .controls
            .active_actions(input)
            .into_iter()
            .map(str::to_owned)
            .collect();

        for name in &actions {
            match name.as_str() {
                action::SAVE => {
                    // Failure is already logged and shown in the status bar
                    let _ = self.save();
                }
                action::LOAD => {
                    self.reload();
                }
                action::PLACE => self.place_selected(),
                action::REMOVE => self.remove_highlighted(),
                other => {
                    if let Some(index) = bindings::parse_select_action(other) {
                        self.select_tile(index);
                    }
                }
            }
        }
    }

    pub fn draw(&self, textures: &mut TileTextures, screen: Rect) {
        self.grid.draw(textures, &self.assets);
        draw_status_bar(screen.slice_bottom(STATUS_BAR_HEIGHT), self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputEvent, MouseButtons};
    use crate::tilemap::{Tile, TilePos};
    use macroquad::prelude::{KeyCode, MouseButton};
    use tempfile::TempDir;

    fn setup() -> (TempDir, EditorState) {
        let dir = TempDir::new().unwrap();
        let editor = EditorState::new(&test_config(), LocalStorage::with_base_dir(dir.path()));
        (dir, editor)
    }

    fn test_config() -> EditorConfig {
        EditorConfig {
            palette: vec![
                PaletteEntry::new("grass", "grass.png"),
                PaletteEntry::new("stone", "stone.png"),
            ],
            ..EditorConfig::default()
        }
    }

    fn click_at(x: i32, y: i32) -> InputSnapshot {
        InputSnapshot::from_parts(
            vec![InputEvent::MouseDown(MouseButton::Left)],
            &[],
            (x, y),
            MouseButtons { left: true, ..Default::default() },
        )
    }

    fn right_click_at(x: i32, y: i32) -> InputSnapshot {
        InputSnapshot::from_parts(
            vec![InputEvent::MouseDown(MouseButton::Right)],
            &[],
            (x, y),
            MouseButtons { right: true, ..Default::default() },
        )
    }

    fn key(code: KeyCode) -> InputSnapshot {
        InputSnapshot::from_parts(vec![InputEvent::KeyDown(code)], &[code], (0, 0), MouseButtons::default())
    }

    fn tuples(editor: &EditorState) -> Vec<(String, TilePos, u32, String)> {
        editor
            .grid
            .layer()
            .tiles()
            .iter()
            .map(|t| (t.tile_type().to_string(), t.pos(), t.id(), t.image().to_string()))
            .collect()
    }

    #[test]
    fn test_start_without_document() {
        let (_dir, mut editor) = setup();
        assert_eq!(editor.phase(), EditorPhase::Init);

        assert!(matches!(editor.start(), LoadOutcome::Missing));
        assert_eq!(editor.phase(), EditorPhase::Ready);
        assert_eq!(editor.grid.layer().len(), 0);
    }

    #[test]
    fn test_first_update_starts_editor() {
        let (_dir, mut editor) = setup();
        editor.update(&InputSnapshot::empty());
        assert_eq!(editor.phase(), EditorPhase::Ready);
    }

    #[test]
    fn test_place_and_remove_with_mouse() {
        let (_dir, mut editor) = setup();
        editor.start();

        editor.update(&click_at(400, 80));
        assert_eq!(editor.grid.tile_at(TilePos(50, 50)).map(Tile::tile_type), Some("grass"));
        assert!(editor.dirty);
        assert!(editor.assets.get("grass").is_some());

        // Outside the grid: nothing happens
        editor.update(&click_at(100, 100));
        assert_eq!(editor.grid.layer().len(), 1);

        editor.update(&right_click_at(410, 90));
        assert_eq!(editor.grid.layer().len(), 0);
    }

    #[test]
    fn test_palette_selection() {
        let (_dir, mut editor) = setup();
        editor.start();

        editor.update(&key(KeyCode::Key2));
        assert_eq!(editor.selected_tile().map(|e| e.tile_type.as_str()), Some("stone"));

        // Slot without an entry is ignored
        editor.update(&key(KeyCode::Key9));
        assert_eq!(editor.selected_index(), 1);

        editor.update(&click_at(320, 30));
        assert_eq!(editor.grid.tile_at(TilePos(0, 0)).map(Tile::tile_type), Some("stone"));
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let (dir, mut editor) = setup();
        editor.start();

        editor.update(&click_at(320, 30));
        editor.update(&key(KeyCode::Key2));
        editor.update(&click_at(370, 30));
        editor.update(&key(KeyCode::Key1));
        editor.update(&click_at(420, 80));
        let before = tuples(&editor);
        assert_eq!(before.len(), 3);

        editor.update(&key(KeyCode::S));
        assert!(!editor.dirty);
        assert_eq!(editor.phase(), EditorPhase::Ready);
        assert!(dir.path().join("level.json").is_file());

        let mut reopened = EditorState::new(&test_config(), LocalStorage::with_base_dir(dir.path()));
        let outcome = reopened.start();
        assert!(matches!(
            outcome,
            LoadOutcome::Loaded { tiles: 3, renumbered: 0, version_mismatch: false }
        ));
        assert_eq!(tuples(&reopened), before);
    }

    #[test]
    fn test_malformed_document_on_start() {
        let (dir, mut editor) = setup();
        std::fs::write(dir.path().join("level.json"), r#"{"version": "0.1.0"}"#).unwrap();

        match editor.start() {
            LoadOutcome::Failed(e) => assert!(e.is_malformed()),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(editor.grid.layer().len(), 0);
        assert_eq!(editor.phase(), EditorPhase::Ready);
        assert!(editor.status().is_some());
    }

    #[test]
    fn test_failed_reload_keeps_layer() {
        let (dir, mut editor) = setup();
        editor.start();
        editor.update(&click_at(400, 80));
        editor.update(&key(KeyCode::S));

        std::fs::write(dir.path().join("level.json"), "{ broken").unwrap();
        editor.update(&click_at(500, 80));
        let before = tuples(&editor);

        assert!(matches!(editor.reload(), LoadOutcome::Failed(_)));
        assert_eq!(tuples(&editor), before);
        assert!(editor.dirty);
    }

    #[test]
    fn test_reload_without_tiles_layer_keeps_layer() {
        let (dir, mut editor) = setup();
        editor.start();
        editor.update(&click_at(400, 80));
        let before = tuples(&editor);

        for text in [
            r#"{"version": "0.1.0", "layers": {"background": []}}"#,
            r#"{"version": "0.1.0", "layers": {}}"#,
        ] {
            std::fs::write(dir.path().join("level.json"), text).unwrap();
            match editor.reload() {
                LoadOutcome::Failed(e) => assert!(e.is_malformed()),
                other => panic!("expected failure, got {:?}", other),
            }
            assert_eq!(tuples(&editor), before);
            assert!(editor.dirty);
        }
    }

    #[test]
    fn test_reload_over_unsaved_changes_is_reported() {
        let (_dir, mut editor) = setup();
        editor.start();
        editor.update(&click_at(400, 80));
        editor.update(&key(KeyCode::S));
        assert!(editor.status().is_some_and(|s| !s.contains("discarded")));

        editor.update(&click_at(600, 200));
        editor.update(&key(KeyCode::L));
        assert_eq!(editor.grid.layer().len(), 1);
        assert!(editor.status().is_some_and(|s| s.contains("unsaved changes discarded")));

        // Clean reload: plain message
        editor.update(&key(KeyCode::L));
        assert!(editor.status().is_some_and(|s| !s.contains("discarded")));
    }

    #[test]
    fn test_load_action_replaces_layer() {
        let (_dir, mut editor) = setup();
        editor.start();
        editor.update(&click_at(400, 80));
        editor.update(&key(KeyCode::S));

        editor.update(&click_at(600, 200));
        assert_eq!(editor.grid.layer().len(), 2);

        editor.update(&key(KeyCode::L));
        assert_eq!(editor.grid.layer().len(), 1);
        assert!(!editor.dirty);
    }

    #[test]
    fn test_version_mismatch_is_a_warning() {
        let (dir, mut editor) = setup();
        std::fs::write(
            dir.path().join("level.json"),
            r#"{"version": "0.0.1", "layers": {"tiles": [{"type": "grass", "pos": [0, 0], "id": 0, "image": "grass.png"}]}}"#,
        )
        .unwrap();

        assert!(matches!(
            editor.start(),
            LoadOutcome::Loaded { tiles: 1, version_mismatch: true, .. }
        ));
        assert_eq!(editor.grid.layer().len(), 1);
        assert!(editor.status().is_some_and(|s| s.contains("0.0.1")));
    }

    #[test]
    fn test_missing_image_gets_placeholder() {
        let (dir, mut editor) = setup();
        std::fs::write(
            dir.path().join("level.json"),
            r#"{"version": "0.1.0", "layers": {"tiles": [{"type": "ghost", "pos": [0, 0], "id": 0, "image": "missing.png"}]}}"#,
        )
        .unwrap();

        editor.start();
        assert_eq!(editor.grid.layer().len(), 1);
        assert!(editor.assets.get("ghost").is_some_and(|img| img.placeholder));
    }

    #[test]
    fn test_save_does_not_stop_editing() {
        let (_dir, mut editor) = setup();
        editor.start();
        editor.update(&key(KeyCode::S));
        editor.update(&click_at(400, 80));
        assert_eq!(editor.grid.layer().len(), 1);
        assert_eq!(editor.phase(), EditorPhase::Ready);
    }

    #[test]
    fn test_status_expires() {
        let (_dir, mut editor) = setup();
        editor.start();
        editor.update(&key(KeyCode::S).with_time(10.0));
        assert!(editor.status().is_some());

        editor.update(&InputSnapshot::empty().with_time(10.0 + STATUS_DURATION + 0.1));
        assert!(editor.status().is_none());
    }
}

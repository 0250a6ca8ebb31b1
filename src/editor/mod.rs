//! Level Editor
//!
//! - Grid area with a cell highlight under the pointer
//! - Click to place the selected palette tile, right-click to remove
//! - Save/load of the tile layer as a JSON document
//! - Status bar

mod state;
mod grid;
mod render;

pub use state::*;
pub use grid::*;
pub use render::*;

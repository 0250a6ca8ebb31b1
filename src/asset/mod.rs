//! Tile image assets
//!
//! ```text
//! tile type ──► AssetCache ──► RgbaImage (decoded once per type)
//!                   │
//!                   └─ missing/broken file ──► checker placeholder
//! ```
//!
//! The cache is owned by the editor and lives for the whole session. GPU
//! textures are made from it lazily at draw time.

mod cache;

pub use cache::*;

//! Input handling
//!
//! A frozen per-frame snapshot of keyboard/mouse state, plus named control
//! schemes evaluated against it.

mod state;
mod scheme;
pub mod bindings;

pub use state::*;
pub use scheme::*;

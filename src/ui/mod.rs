//! Screen layout primitives

mod rect;

pub use rect::*;

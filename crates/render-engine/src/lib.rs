//! Snapstrip Render Engine
//!
//! Turns a completed photo session into one vertically stacked strip image:
//! each photo is graded for a vintage film look, darkened toward the edges,
//! dusted with procedural grain, and framed with a border; the footer band
//! carries a serial/timestamp stamp and the optional caption.

pub mod compositor;
pub mod export;
pub mod font;

pub use compositor::*;
pub use export::*;

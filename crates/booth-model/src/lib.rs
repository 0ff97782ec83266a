//! Snapstrip Booth Model
//!
//! The data model shared by the capture, render, and caption crates:
//! - Captured frames and fixed-size photo sessions
//! - The composited strip artifact
//! - The booth scene state machine (Landing / Shooting / Processing / Result)

pub mod frame;
pub mod scene;
pub mod strip;

pub use frame::*;
pub use scene::*;
pub use strip::*;

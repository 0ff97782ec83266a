//! Snapstrip Caption Client
//!
//! One-shot Gemini call that turns a finished strip into a short retro
//! caption. The client never surfaces an error to its caller: any failure
//! resolves to a themed fallback string, so the booth flow cannot be
//! blocked by the network.

pub mod client;
pub mod types;

pub use client::{CaptionClient, CaptionClientConfig, CORRUPTED_CAPTION, OFFLINE_CAPTION};

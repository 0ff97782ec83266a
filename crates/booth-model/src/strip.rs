//! The composited strip artifact.

use base64::Engine;
use chrono::{DateTime, Local};

/// A finished photo strip: the PNG produced by the render engine together
/// with the footer metadata that was stamped onto it.
///
/// Immutable once produced; a caption change means a fresh render.
#[derive(Debug, Clone)]
pub struct CompositedStrip {
    /// Encoded PNG bytes.
    pub png: Vec<u8>,

    /// Canvas width in pixels.
    pub width: u32,

    /// Canvas height in pixels.
    pub height: u32,

    /// The 4-digit serial number stamped in the footer.
    pub serial: u16,

    /// Render timestamp stamped in the footer.
    pub rendered_at: DateTime<Local>,

    /// Caption rendered above the footer, if one was set.
    pub caption: Option<String>,
}

impl CompositedStrip {
    /// The strip as a `data:image/png;base64,...` URI.
    pub fn to_data_uri(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.png);
        format!("data:image/png;base64,{encoded}")
    }

    /// Timestamp-derived download file name.
    pub fn download_file_name(&self) -> String {
        format!("photobooth-{}.png", self.rendered_at.timestamp_millis())
    }
}

//! Strip export: PNG encoding and disk writes.

use std::path::{Path, PathBuf};

use image::RgbaImage;

use snapstrip_booth_model::CompositedStrip;
use snapstrip_common::error::{BoothError, BoothResult};

/// Encode a canvas as PNG bytes.
pub fn encode_png(canvas: &RgbaImage) -> BoothResult<Vec<u8>> {
    let mut png = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png);
    canvas
        .write_with_encoder(encoder)
        .map_err(|e| BoothError::render(format!("PNG encode failed: {e}")))?;
    Ok(png)
}

/// Write a strip into `dir` under its timestamp-derived file name.
///
/// Creates the directory if needed and returns the full path written.
pub fn write_strip(strip: &CompositedStrip, dir: &Path) -> BoothResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(strip.download_file_name());
    std::fs::write(&path, &strip.png)?;
    tracing::info!(path = %path.display(), bytes = strip.png.len(), "Strip written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use image::Rgba;

    #[test]
    fn test_encode_png_round_trips_dimensions() {
        let canvas = RgbaImage::from_pixel(30, 50, Rgba([10, 20, 30, 255]));
        let png = encode_png(&canvas).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 30);
        assert_eq!(decoded.height(), 50);
    }

    #[test]
    fn test_write_strip_creates_dir_and_file() {
        let dir = std::env::temp_dir().join(format!("snapstrip-export-{}", std::process::id()));
        let strip = CompositedStrip {
            png: encode_png(&RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]))).unwrap(),
            width: 4,
            height: 4,
            serial: 7,
            rendered_at: Local.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            caption: None,
        };

        let path = write_strip(&strip, &dir).unwrap();
        assert!(path.exists());
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("photobooth-1700000000000.png")
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }
}

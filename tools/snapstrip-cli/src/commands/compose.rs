//! Render a strip from photos already on disk.

use std::path::PathBuf;

use chrono::TimeZone;

use snapstrip_booth_model::{CapturedFrame, PhotoSession};
use snapstrip_common::config::AppConfig;
use snapstrip_render_engine::{write_strip, RenderOptions, StripCompositor};

pub fn run(
    dir: PathBuf,
    output: Option<PathBuf>,
    caption: Option<String>,
    serial: Option<u16>,
    seed: Option<u64>,
    timestamp: Option<i64>,
) -> anyhow::Result<()> {
    let mut photos: Vec<PathBuf> = std::fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("jpg") | Some("jpeg")
            )
        })
        .collect();
    photos.sort();

    anyhow::ensure!(
        !photos.is_empty(),
        "No .jpg/.jpeg photos found in {}",
        dir.display()
    );

    tracing::debug!(photos = photos.len(), dir = %dir.display(), "Composing strip from disk");
    let mut session = PhotoSession::new(photos.len());
    for path in &photos {
        println!("  + {}", path.display());
        session.push_frame(CapturedFrame::new(std::fs::read(path)?))?;
    }

    let rendered_at = match timestamp {
        Some(millis) => Some(
            chrono::Local
                .timestamp_millis_opt(millis)
                .single()
                .ok_or_else(|| anyhow::anyhow!("Timestamp {millis} is out of range"))?,
        ),
        None => None,
    };

    let opts = RenderOptions {
        caption,
        serial,
        rendered_at,
        grain_seed: seed,
    };
    let strip = StripCompositor::default().render(&session, &opts)?;

    let out_dir = output.unwrap_or_else(|| AppConfig::load().output_dir);
    let path = write_strip(&strip, &out_dir)?;
    println!();
    println!(
        "Strip #{:04} ({}x{}) saved to: {}",
        strip.serial,
        strip.width,
        strip.height,
        path.display()
    );
    Ok(())
}

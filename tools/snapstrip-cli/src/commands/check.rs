//! Check camera and caption service readiness.

use snapstrip_capture_engine::feed::enumerate_camera_devices;
use snapstrip_common::config::AppConfig;

pub fn run() -> anyhow::Result<()> {
    println!("Snapstrip System Check");
    println!("{}", "=".repeat(50));

    let devices = enumerate_camera_devices();
    if devices.is_empty() {
        println!("[WARN] No /dev/video* devices found");
    } else {
        println!("[OK] Video devices detected: {}", devices.len());
        for d in &devices {
            let verdict = if d.score >= 100 {
                "webcam"
            } else if d.score == 0 {
                "not a webcam"
            } else {
                "maybe"
            };
            println!("     {} \"{}\" ({verdict})", d.path, d.name);
        }
    }

    println!();
    match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.is_empty() => println!("[OK] GEMINI_API_KEY is set"),
        _ => println!("[WARN] GEMINI_API_KEY not set; captions will fall back"),
    }

    let config = AppConfig::load();
    println!();
    println!("Output directory: {}", config.output_dir.display());
    println!(
        "Booth defaults: {} shots, countdown from {}, {}x{} @ q{}",
        config.booth.photo_count,
        config.booth.countdown_start,
        config.booth.capture_width,
        config.booth.capture_height,
        config.booth.jpeg_quality
    );

    Ok(())
}

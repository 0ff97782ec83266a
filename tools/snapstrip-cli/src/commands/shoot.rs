//! Run a full booth session.

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::sync::mpsc;

use snapstrip_booth_model::{BoothState, SceneEvent};
use snapstrip_caption_client::CaptionClient;
use snapstrip_capture_engine::feed::{FeedConfig, GstCameraFeed};
use snapstrip_capture_engine::sequencer::{
    CaptureSequencer, SequenceOutcome, SequencerConfig, SequencerEvent,
};
use snapstrip_common::config::AppConfig;
use snapstrip_render_engine::{write_strip, RenderOptions, StripCompositor};

/// Cosmetic pause between capture and the strip reveal.
const DEVELOP_DELAY: Duration = Duration::from_secs(2);

pub async fn run(
    output: Option<PathBuf>,
    device: Option<String>,
    count: usize,
    countdown: u32,
    caption: bool,
    fast: bool,
) -> anyhow::Result<()> {
    let config = AppConfig::load();
    let out_dir = output.unwrap_or_else(|| config.output_dir.clone());

    let feed = GstCameraFeed::new(FeedConfig {
        device: device.unwrap_or_else(|| config.booth.camera_device.clone()),
        width: config.booth.capture_width,
        height: config.booth.capture_height,
        jpeg_quality: config.booth.jpeg_quality,
    });
    let mut seq_config = SequencerConfig {
        photo_count: count,
        countdown_start: countdown,
        ..SequencerConfig::default()
    };
    let develop_delay = if fast {
        seq_config.tick = Duration::from_millis(200);
        seq_config.completion_delay = Duration::from_millis(200);
        Duration::from_millis(300)
    } else {
        DEVELOP_DELAY
    };
    let sequencer = CaptureSequencer::new(Box::new(feed), seq_config);

    let mut state = BoothState::new();
    state.apply(SceneEvent::Start)?;

    tracing::info!(count, countdown, fast, out_dir = %out_dir.display(), "Starting booth session");
    println!("Snapstrip session: {count} shots");
    println!("Press Ctrl+C to cancel.");
    println!();

    // Ctrl+C trips the shared cancel flag; the sequencer notices at its
    // next suspension point and releases the camera on the way out.
    let cancel = sequencer.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let (tx, mut rx) = mpsc::channel(64);
    let run = tokio::spawn(sequencer.run(tx));

    while let Some(event) = rx.recv().await {
        match event {
            SequencerEvent::CountdownTick { shot, value } => {
                println!("  Shot {}: {value}...", shot + 1);
            }
            SequencerEvent::Flash { shot, .. } => {
                println!("  Shot {}: *FLASH*", shot + 1);
            }
            SequencerEvent::FrameCaptured { .. } => {}
            SequencerEvent::SessionComplete => {
                println!();
                println!("All shots captured.");
            }
        }
    }

    let session = match run.await? {
        Ok(SequenceOutcome::Completed(session)) => session,
        Ok(SequenceOutcome::Cancelled) => {
            state.apply(SceneEvent::Cancel)?;
            println!();
            println!("Session cancelled.");
            return Ok(());
        }
        Err(e) => {
            state.apply(SceneEvent::Cancel)?;
            anyhow::bail!("Capture failed: {e}");
        }
    };
    state.apply(SceneEvent::SequencerComplete(session))?;

    println!("Developing...");
    tokio::time::sleep(develop_delay).await;
    state.apply(SceneEvent::ProcessingDone)?;

    // Pin the footer inputs so the captioned re-render matches the first.
    let mut opts = RenderOptions {
        caption: None,
        serial: Some(rand::random::<u16>() % 10_000),
        rendered_at: Some(chrono::Local::now()),
        grain_seed: Some(rand::random()),
    };

    let compositor = StripCompositor::default();
    let session = state
        .session()
        .ok_or_else(|| anyhow::anyhow!("Session missing after processing"))?
        .clone();
    let mut strip = compositor.render(&session, &opts)?;
    state.apply(SceneEvent::StripRevealed)?;

    if caption && state.can_request_caption() {
        state.apply(SceneEvent::CaptionRequested)?;
        println!("Requesting caption...");
        let text = CaptionClient::from_env()?.request_caption(&strip.png).await;
        tracing::info!(caption = %text, "Caption resolved");
        println!("Caption: {text}");
        state.apply(SceneEvent::CaptionReady(text.clone()))?;

        opts.caption = Some(text);
        strip = compositor.render(&session, &opts)?;
    }

    let path = write_strip(&strip, &out_dir)?;
    println!();
    println!("Strip saved to: {}", path.display());
    Ok(())
}

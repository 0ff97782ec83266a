//! Camera feed acquisition.
//!
//! The live feed is a GStreamer pipeline: `v4l2src` into an `appsink`, with
//! a horizontal flip in-pipeline so pulled stills already carry the mirror
//! effect the sitter sees in a preview. Frames are encoded to JPEG at pull
//! time.

use std::sync::OnceLock;

use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use image::RgbImage;

use snapstrip_booth_model::CapturedFrame;
use snapstrip_common::error::{BoothError, BoothResult};

/// A live camera feed that stills can be grabbed from.
///
/// The feed owns the underlying device handle exclusively between `open`
/// and `close`. `close` must be safe to call at any point, including before
/// `open` or twice.
pub trait CameraFeed: Send {
    /// Acquire the camera. Fails with [`BoothError::CameraUnavailable`]
    /// when permission is denied or no usable device exists.
    fn open(&mut self) -> BoothResult<()>;

    /// Synchronously capture one mirrored still from the live feed.
    fn grab_frame(&mut self) -> BoothResult<CapturedFrame>;

    /// Release the camera stream and device handle.
    fn close(&mut self);
}

/// Configuration for the GStreamer camera feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Device path; empty means auto-detect.
    pub device: String,

    /// Ideal capture width.
    pub width: u32,

    /// Ideal capture height.
    pub height: u32,

    /// JPEG quality for grabbed stills (0-100).
    pub jpeg_quality: u8,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            width: 1280,
            height: 720,
            jpeg_quality: 95,
        }
    }
}

/// Camera feed backed by a `v4l2src ! appsink` pipeline.
pub struct GstCameraFeed {
    config: FeedConfig,
    pipeline: Option<gst::Pipeline>,
    sink: Option<gst_app::AppSink>,
}

impl GstCameraFeed {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config,
            pipeline: None,
            sink: None,
        }
    }

    fn launch_string(&self, device: &str) -> String {
        let FeedConfig { width, height, .. } = self.config;
        // videoflip gives the mirror effect; appsink holds at most two
        // buffers and drops stale ones so a grab always sees a fresh frame.
        format!(
            "v4l2src device=\"{device}\" ! videoconvert ! videoscale ! \
             video/x-raw,format=RGB,width={width},height={height} ! \
             videoflip method=horizontal-flip ! \
             appsink name=stills max-buffers=2 drop=true sync=false"
        )
    }
}

impl CameraFeed for GstCameraFeed {
    fn open(&mut self) -> BoothResult<()> {
        if self.pipeline.is_some() {
            return Err(BoothError::capture("Camera feed already open"));
        }

        init_gstreamer()?;

        let device = if self.config.device.is_empty() {
            detect_camera_device()
                .map(|d| d.path)
                .ok_or_else(|| BoothError::camera_unavailable("No webcam device found"))?
        } else {
            self.config.device.clone()
        };

        tracing::info!(device = %device, "Opening camera feed");

        let launch = self.launch_string(&device);
        let element = gst::parse::launch(&launch).map_err(|e| {
            BoothError::camera_unavailable(format!("Failed to build camera pipeline: {e}"))
        })?;
        let pipeline = element.dynamic_cast::<gst::Pipeline>().map_err(|_| {
            BoothError::camera_unavailable("Launch string did not produce a pipeline")
        })?;

        let sink = pipeline
            .by_name("stills")
            .and_then(|e| e.dynamic_cast::<gst_app::AppSink>().ok())
            .ok_or_else(|| BoothError::capture("Pipeline is missing the stills appsink"))?;

        pipeline.set_state(gst::State::Playing).map_err(|e| {
            BoothError::camera_unavailable(format!("Failed to start camera: {e:?}"))
        })?;

        // GStreamer state changes are async; wait until the source has
        // actually opened the device before declaring the feed live.
        match pipeline.state(gst::ClockTime::from_seconds(10)) {
            (Ok(_), gst::State::Playing, _) => {}
            (Ok(_), state, _) => {
                tracing::warn!(?state, "Camera pipeline did not reach Playing within timeout");
            }
            (Err(e), _, _) => {
                let _ = pipeline.set_state(gst::State::Null);
                return Err(BoothError::camera_unavailable(format!(
                    "Camera failed to start: {e:?}"
                )));
            }
        }

        self.pipeline = Some(pipeline);
        self.sink = Some(sink);
        Ok(())
    }

    fn grab_frame(&mut self) -> BoothResult<CapturedFrame> {
        let sink = self
            .sink
            .as_ref()
            .ok_or_else(|| BoothError::capture("Camera feed is not open"))?;

        let sample = sink
            .try_pull_sample(gst::ClockTime::from_seconds(2))
            .ok_or_else(|| BoothError::capture("Camera feed produced no frame within 2s"))?;

        let caps = sample
            .caps()
            .ok_or_else(|| BoothError::capture("Frame sample carries no caps"))?;
        let s = caps
            .structure(0)
            .ok_or_else(|| BoothError::capture("Frame caps are empty"))?;
        let width = s
            .get::<i32>("width")
            .map_err(|e| BoothError::capture(format!("Frame caps missing width: {e}")))? as u32;
        let height = s
            .get::<i32>("height")
            .map_err(|e| BoothError::capture(format!("Frame caps missing height: {e}")))? as u32;

        let buffer = sample
            .buffer()
            .ok_or_else(|| BoothError::capture("Frame sample carries no buffer"))?;
        let map = buffer
            .map_readable()
            .map_err(|_| BoothError::capture("Frame buffer is not readable"))?;

        let expected = (width * height * 3) as usize;
        if map.size() < expected {
            return Err(BoothError::capture(format!(
                "Frame buffer too small: {} bytes for {width}x{height} RGB",
                map.size()
            )));
        }

        let rgb = RgbImage::from_raw(width, height, map.as_slice()[..expected].to_vec())
            .ok_or_else(|| BoothError::capture("Frame buffer did not form an RGB image"))?;

        let jpeg = encode_jpeg(&rgb, self.config.jpeg_quality)?;
        Ok(CapturedFrame::new(jpeg))
    }

    fn close(&mut self) {
        self.sink = None;
        if let Some(pipeline) = self.pipeline.take() {
            if pipeline.set_state(gst::State::Null).is_err() {
                tracing::warn!("Camera pipeline did not shut down cleanly");
            } else {
                tracing::info!("Camera feed released");
            }
        }
    }
}

impl Drop for GstCameraFeed {
    fn drop(&mut self) {
        self.close();
    }
}

/// Encode an RGB image as JPEG at the given quality.
pub fn encode_jpeg(rgb: &RgbImage, quality: u8) -> BoothResult<Vec<u8>> {
    let mut jpeg = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| BoothError::capture(format!("JPEG encode failed: {e}")))?;
    Ok(jpeg)
}

fn init_gstreamer() -> BoothResult<()> {
    static GST_INIT: OnceLock<Result<(), String>> = OnceLock::new();
    let init_res = GST_INIT.get_or_init(|| gst::init().map_err(|e| e.to_string()));
    match init_res {
        Ok(()) => Ok(()),
        Err(e) => Err(BoothError::camera_unavailable(format!(
            "Failed to initialize GStreamer: {e}"
        ))),
    }
}

/// A V4L2 device that looks like a camera, with a detection score.
#[derive(Debug, Clone)]
pub struct CameraDevice {
    /// Device node path (`/dev/videoN`).
    pub path: String,

    /// Device name as reported by sysfs, if any.
    pub name: String,

    /// Heuristic score; higher means more webcam-like.
    pub score: u32,
}

/// Enumerate `/dev/video*` nodes and score each as a webcam candidate.
pub fn enumerate_camera_devices() -> Vec<CameraDevice> {
    let mut devices = Vec::new();
    for idx in 0..16u32 {
        let path = format!("/dev/video{idx}");
        if !std::path::Path::new(&path).exists() {
            continue;
        }
        let name = std::fs::read_to_string(format!("/sys/class/video4linux/video{idx}/name"))
            .unwrap_or_default()
            .trim()
            .to_string();
        let score = score_device_name(&name);
        devices.push(CameraDevice { path, name, score });
    }
    devices.sort_by(|a, b| b.score.cmp(&a.score));
    devices
}

/// Pick the most webcam-like device, if any exists.
pub fn detect_camera_device() -> Option<CameraDevice> {
    let devices = enumerate_camera_devices();
    let best = devices.into_iter().next()?;
    if best.score == 0 {
        tracing::debug!(device = %best.path, name = %best.name, "Best candidate is not webcam-like");
        return None;
    }
    tracing::info!(device = %best.path, name = %best.name, score = best.score, "Selected camera device");
    Some(best)
}

/// Score a V4L2 device name as a webcam candidate (0 = definitely not).
fn score_device_name(name: &str) -> u32 {
    let name = name.to_lowercase();

    // Capture cards, tuners, and codec nodes masquerade as /dev/video*.
    let non_webcam = [
        "tuner", "tv", "dvb", "hdmi", "encoder", "decoder", "hauppauge", "blackmagic", "magewell",
    ];
    if non_webcam.iter().any(|kw| name.contains(kw)) {
        return 0;
    }

    let webcam = [
        "webcam",
        "camera",
        "cam",
        "facetime",
        "logitech",
        "microsoft",
        "creative",
        "razer",
        "elgato",
        "v4l2loopback",
    ];
    if webcam.iter().any(|kw| name.contains(kw)) {
        100
    } else if name.is_empty() {
        // No sysfs info at all; usable as a last resort.
        10
    } else {
        50
    }
}

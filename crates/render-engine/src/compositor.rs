//! Strip composition.
//!
//! Layout is a single column: every photo scaled to one fixed cell, cells
//! separated by a gap, the whole column padded and followed by a footer
//! band. Each photo runs through the same pipeline before it is blitted:
//!
//! ```text
//!   decode JPEG -> fit to cell -> grade -> vignette -> grain -> border
//! ```
//!
//! Grading and vignette are pure pixel math, so a render is reproducible:
//! the same session, serial, timestamp, and grain seed produce the same PNG
//! byte for byte.

use chrono::{DateTime, Local};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use snapstrip_booth_model::{CompositedStrip, PhotoSession};
use snapstrip_common::error::{BoothError, BoothResult};

use crate::export::encode_png;
use crate::font;

/// Strip geometry in pixels.
#[derive(Debug, Clone)]
pub struct StripLayout {
    /// Width of each photo cell.
    pub photo_width: u32,

    /// Height of each photo cell.
    pub photo_height: u32,

    /// Vertical gap between adjacent cells.
    pub gap: u32,

    /// Horizontal padding on both sides of the column.
    pub padding_x: u32,

    /// Vertical padding above the first and below the last cell.
    pub padding_y: u32,

    /// Height of the footer band below the photos.
    pub footer_band: u32,
}

impl Default for StripLayout {
    fn default() -> Self {
        Self {
            photo_width: 400,
            photo_height: 300,
            gap: 20,
            padding_x: 24,
            padding_y: 24,
            footer_band: 100,
        }
    }
}

impl StripLayout {
    /// Full canvas width.
    pub fn canvas_width(&self) -> u32 {
        self.photo_width + 2 * self.padding_x
    }

    /// Full canvas height for `count` photos.
    pub fn canvas_height(&self, count: u32) -> u32 {
        count * self.photo_height
            + count.saturating_sub(1) * self.gap
            + 2 * self.padding_y
            + self.footer_band
    }

    /// Top-left corner of photo cell `index`.
    pub fn photo_origin(&self, index: u32) -> (u32, u32) {
        (
            self.padding_x,
            self.padding_y + index * (self.photo_height + self.gap),
        )
    }
}

/// Tone and texture parameters for the vintage look.
#[derive(Debug, Clone)]
pub struct StripStyle {
    /// Contrast multiplier around mid-grey.
    pub contrast: f32,

    /// Brightness multiplier.
    pub brightness: f32,

    /// Saturation multiplier (1.0 = unchanged, 0.0 = greyscale).
    pub saturation: f32,

    /// Peak darkening of the vignette at the photo corners (0.0-1.0).
    pub vignette_darkness: f32,

    /// Global opacity of the grain pass.
    pub grain_opacity: f32,

    /// Fraction of grain tile pixels that carry a speck.
    pub grain_density: f64,

    /// Side length of the repeating grain tile.
    pub grain_tile: u32,
}

impl Default for StripStyle {
    fn default() -> Self {
        Self {
            contrast: 1.3,
            brightness: 0.8,
            saturation: 0.4,
            vignette_darkness: 0.5,
            grain_opacity: 0.3,
            grain_density: 0.5,
            grain_tile: 100,
        }
    }
}

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);
const BORDER: Rgba<u8> = Rgba([0x33, 0x33, 0x33, 255]);
const FOOTER_INK: Rgba<u8> = Rgba([0x88, 0x88, 0x88, 255]);
const CAPTION_INK: Rgba<u8> = Rgba([255, 255, 255, 255]);

const BORDER_THICKNESS: u32 = 1;
const FOOTER_SCALE: u32 = 2;
const CAPTION_SCALE: u32 = 3;

/// Alpha of a single grain speck before the global opacity is applied.
const GRAIN_SPECK_ALPHA: f32 = 0x22 as f32 / 255.0;

/// Inner radius of the vignette as a fraction of cell height.
const VIGNETTE_INNER: f32 = 1.0 / 3.0;

/// Outer radius of the vignette as a fraction of cell height.
const VIGNETTE_OUTER: f32 = 1.0 / 1.1;

/// Normalized radius where the vignette starts to bite.
const VIGNETTE_KNEE: f32 = 0.6;

/// Per-render inputs that are not part of the fixed look.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Caption stamped above the footer line. None leaves the space blank.
    pub caption: Option<String>,

    /// Footer serial number; random when unset.
    pub serial: Option<u16>,

    /// Footer timestamp; the current local time when unset.
    pub rendered_at: Option<DateTime<Local>>,

    /// Grain RNG seed; random when unset. Fix it for reproducible output.
    pub grain_seed: Option<u64>,
}

/// Renders completed sessions into strip PNGs.
#[derive(Debug, Clone, Default)]
pub struct StripCompositor {
    pub layout: StripLayout,
    pub style: StripStyle,
}

impl StripCompositor {
    pub fn new(layout: StripLayout, style: StripStyle) -> Self {
        Self { layout, style }
    }

    /// Render a complete session into a strip.
    ///
    /// Fails if the session is not complete or any frame fails to decode.
    pub fn render(
        &self,
        session: &PhotoSession,
        opts: &RenderOptions,
    ) -> BoothResult<CompositedStrip> {
        if !session.is_complete() {
            return Err(BoothError::session(format!(
                "Session incomplete: {} of {} frames",
                session.len(),
                session.capacity()
            )));
        }

        let count = session.capacity() as u32;
        let width = self.layout.canvas_width();
        let height = self.layout.canvas_height(count);

        let serial = opts.serial.unwrap_or_else(|| rand::random::<u16>() % 10_000);
        let rendered_at = opts.rendered_at.unwrap_or_else(Local::now);
        let seed = opts.grain_seed.unwrap_or_else(rand::random);

        tracing::info!(width, height, serial, seed, "Rendering strip");

        let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);
        let grain = GrainTile::generate(self.style.grain_tile, self.style.grain_density, seed);

        for (index, frame) in session.frames().iter().enumerate() {
            let mut photo = self.decode_and_fit(&frame.jpeg).map_err(|e| {
                BoothError::render(format!("Frame {} failed to decode: {e}", frame.id))
            })?;

            self.grade(&mut photo);
            self.vignette(&mut photo);
            self.apply_grain(&mut photo, &grain);

            let (x, y) = self.layout.photo_origin(index as u32);
            imageops::replace(&mut canvas, &photo, i64::from(x), i64::from(y));
            self.draw_border(&mut canvas, x, y);
        }

        self.stamp_footer(&mut canvas, serial, &rendered_at);
        if let Some(caption) = opts.caption.as_deref() {
            self.stamp_caption(&mut canvas, caption);
        }

        let png = encode_png(&canvas)?;
        Ok(CompositedStrip {
            png,
            width,
            height,
            serial,
            rendered_at,
            caption: opts.caption.clone(),
        })
    }

    /// Decode a JPEG and scale it to fill the photo cell, cropping overflow.
    fn decode_and_fit(&self, jpeg: &[u8]) -> BoothResult<RgbaImage> {
        let decoded = image::load_from_memory(jpeg)
            .map_err(|e| BoothError::render(format!("JPEG decode failed: {e}")))?;
        let fitted = decoded.resize_to_fill(
            self.layout.photo_width,
            self.layout.photo_height,
            FilterType::Triangle,
        );
        Ok(fitted.to_rgba8())
    }

    /// Contrast, then brightness, then saturation, per channel.
    fn grade(&self, photo: &mut RgbaImage) {
        let StripStyle {
            contrast,
            brightness,
            saturation,
            ..
        } = self.style;

        for pixel in photo.pixels_mut() {
            let [r, g, b, a] = pixel.0;
            let mut r = f32::from(r) / 255.0;
            let mut g = f32::from(g) / 255.0;
            let mut b = f32::from(b) / 255.0;

            r = (r - 0.5) * contrast + 0.5;
            g = (g - 0.5) * contrast + 0.5;
            b = (b - 0.5) * contrast + 0.5;

            r *= brightness;
            g *= brightness;
            b *= brightness;

            let luma = 0.2126 * r + 0.7152 * g + 0.0722 * b;
            r = luma + (r - luma) * saturation;
            g = luma + (g - luma) * saturation;
            b = luma + (b - luma) * saturation;

            pixel.0 = [to_u8(r), to_u8(g), to_u8(b), a];
        }
    }

    /// Radial darkening toward the corners, multiplied into the photo.
    ///
    /// Flat inside the inner radius, then ramps to `vignette_darkness` at
    /// the outer radius.
    fn vignette(&self, photo: &mut RgbaImage) {
        let (w, h) = (photo.width() as f32, photo.height() as f32);
        let (cx, cy) = (w / 2.0, h / 2.0);
        let r0 = h * VIGNETTE_INNER;
        let r1 = h * VIGNETTE_OUTER;
        let darkness = self.style.vignette_darkness;

        for (x, y, pixel) in photo.enumerate_pixels_mut() {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let d = (dx * dx + dy * dy).sqrt();
            let t = ((d - r0) / (r1 - r0)).clamp(0.0, 1.0);
            if t <= VIGNETTE_KNEE {
                continue;
            }
            let alpha = (t - VIGNETTE_KNEE) / (1.0 - VIGNETTE_KNEE) * darkness;
            let keep = 1.0 - alpha;
            let [r, g, b, a] = pixel.0;
            pixel.0 = [
                (f32::from(r) * keep) as u8,
                (f32::from(g) * keep) as u8,
                (f32::from(b) * keep) as u8,
                a,
            ];
        }
    }

    /// Tile white specks over the photo with an overlay blend.
    fn apply_grain(&self, photo: &mut RgbaImage, grain: &GrainTile) {
        let opacity = self.style.grain_opacity;
        for (x, y, pixel) in photo.enumerate_pixels_mut() {
            if !grain.speck_at(x, y) {
                continue;
            }
            let alpha = GRAIN_SPECK_ALPHA * opacity;
            let [r, g, b, a] = pixel.0;
            pixel.0 = [
                overlay_white(r, alpha),
                overlay_white(g, alpha),
                overlay_white(b, alpha),
                a,
            ];
        }
    }

    fn draw_border(&self, canvas: &mut RgbaImage, x: u32, y: u32) {
        for inset in 0..BORDER_THICKNESS {
            let rect = imageproc::rect::Rect::at((x + inset) as i32, (y + inset) as i32).of_size(
                self.layout.photo_width - 2 * inset,
                self.layout.photo_height - 2 * inset,
            );
            imageproc::drawing::draw_hollow_rect_mut(canvas, rect, BORDER);
        }
    }

    /// Right-aligned "#SSSS • date time" near the bottom edge.
    fn stamp_footer(&self, canvas: &mut RgbaImage, serial: u16, rendered_at: &DateTime<Local>) {
        let text = format!(
            "#{serial:04} • {}",
            rendered_at.format("%m/%d/%Y %H:%M")
        );
        let text_w = font::measure(&text, FOOTER_SCALE);
        let x = canvas.width().saturating_sub(self.layout.padding_x + text_w);
        let y = canvas
            .height()
            .saturating_sub(15 + font::line_height(FOOTER_SCALE));
        font::draw_text(canvas, &text, x, y, FOOTER_SCALE, FOOTER_INK);
    }

    /// Centered caption above the footer line.
    fn stamp_caption(&self, canvas: &mut RgbaImage, caption: &str) {
        let text_w = font::measure(caption, CAPTION_SCALE);
        let x = canvas.width().saturating_sub(text_w) / 2;
        let y = canvas
            .height()
            .saturating_sub(55 + font::line_height(CAPTION_SCALE));
        font::draw_text(canvas, caption, x, y, CAPTION_SCALE, CAPTION_INK);
    }
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Overlay blend of a white speck onto one channel, mixed by `alpha`.
fn overlay_white(base: u8, alpha: f32) -> u8 {
    let b = f32::from(base) / 255.0;
    // Overlay with a white top layer: doubles dark values, saturates light.
    let blended = if b < 0.5 { 2.0 * b } else { 1.0 };
    to_u8(b * (1.0 - alpha) + blended * alpha)
}

/// Precomputed repeating speck mask.
struct GrainTile {
    size: u32,
    specks: Vec<bool>,
}

impl GrainTile {
    fn generate(size: u32, density: f64, seed: u64) -> Self {
        // A zero-sized tile would divide by zero in speck_at.
        let size = size.max(1);
        let mut rng = StdRng::seed_from_u64(seed);
        let specks = (0..size * size).map(|_| rng.gen_bool(density)).collect();
        Self { size, specks }
    }

    fn speck_at(&self, x: u32, y: u32) -> bool {
        let tx = x % self.size;
        let ty = y % self.size;
        self.specks[(ty * self.size + tx) as usize]
    }
}

use chrono::{Local, TimeZone};
use image::GenericImageView;

use snapstrip_booth_model::{CapturedFrame, PhotoSession};
use snapstrip_render_engine::{RenderOptions, StripCompositor, StripLayout};

fn gradient_jpeg(offset: u8) -> Vec<u8> {
    let img = image::RgbImage::from_fn(640, 480, |x, y| {
        image::Rgb([
            ((x / 3) as u8).wrapping_add(offset),
            ((y / 2) as u8).wrapping_add(offset),
            offset,
        ])
    });
    let mut out = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, 95);
    img.write_with_encoder(encoder)
        .expect("fixture jpeg should encode");
    out
}

fn four_shot_session() -> PhotoSession {
    let mut session = PhotoSession::new(4);
    for offset in [0u8, 60, 120, 180] {
        session
            .push_frame(CapturedFrame::new(gradient_jpeg(offset)))
            .expect("session should accept four frames");
    }
    session
}

fn pinned_options() -> RenderOptions {
    RenderOptions {
        caption: Some("Static In The Air".into()),
        serial: Some(1234),
        rendered_at: Some(
            Local
                .timestamp_millis_opt(1_750_000_000_000)
                .single()
                .expect("fixed timestamp"),
        ),
        grain_seed: Some(0xC0FFEE),
    }
}

#[test]
fn four_shot_strip_has_expected_geometry() {
    let strip = StripCompositor::default()
        .render(&four_shot_session(), &pinned_options())
        .expect("render should succeed");

    assert_eq!(strip.width, 448);
    assert_eq!(strip.height, 1408);

    let decoded = image::load_from_memory(&strip.png).expect("strip png should decode");
    assert_eq!(decoded.dimensions(), (448, 1408));
}

#[test]
fn background_padding_and_footer_band_stay_black() {
    let strip = StripCompositor::default()
        .render(&four_shot_session(), &pinned_options())
        .expect("render should succeed");
    let img = image::load_from_memory(&strip.png)
        .expect("strip png should decode")
        .to_rgba8();

    // Padding corners sit outside every photo cell and every stamp.
    for (x, y) in [(2, 2), (445, 2), (2, 1290)] {
        assert_eq!(img.get_pixel(x, y).0, [0, 0, 0, 255], "({x},{y}) not black");
    }
}

#[test]
fn photos_land_inside_their_cells_with_borders() {
    let strip = StripCompositor::default()
        .render(&four_shot_session(), &pinned_options())
        .expect("render should succeed");
    let img = image::load_from_memory(&strip.png)
        .expect("strip png should decode")
        .to_rgba8();

    let layout = StripLayout::default();
    for index in 0..4 {
        let (x, y) = layout.photo_origin(index);

        // Border pixel on the cell edge.
        assert_eq!(
            img.get_pixel(x, y).0,
            [0x33, 0x33, 0x33, 255],
            "cell {index} missing border"
        );

        // Cell center carries image data, not background.
        let center = img.get_pixel(x + 200, y + 150).0;
        assert_ne!(center, [0, 0, 0, 255], "cell {index} center is blank");
    }
}

#[test]
fn footer_and_caption_ink_appear_in_the_footer_band() {
    let strip = StripCompositor::default()
        .render(&four_shot_session(), &pinned_options())
        .expect("render should succeed");
    let img = image::load_from_memory(&strip.png)
        .expect("strip png should decode")
        .to_rgba8();

    let band_top = 1408 - 100;
    let mut footer_ink = 0usize;
    let mut caption_ink = 0usize;
    for y in band_top..1408 {
        for x in 0..448 {
            match img.get_pixel(x, y).0 {
                [0x88, 0x88, 0x88, 255] => footer_ink += 1,
                [255, 255, 255, 255] => caption_ink += 1,
                _ => {}
            }
        }
    }
    assert!(footer_ink > 0, "serial/timestamp stamp missing");
    assert!(caption_ink > 0, "caption stamp missing");
}

#[test]
fn render_is_byte_stable_for_pinned_inputs() {
    let session = four_shot_session();
    let compositor = StripCompositor::default();

    let first = compositor
        .render(&session, &pinned_options())
        .expect("render should succeed");
    let second = compositor
        .render(&session, &pinned_options())
        .expect("render should succeed");

    assert_eq!(first.png, second.png);
    assert_eq!(first.to_data_uri(), second.to_data_uri());
}

#[test]
fn caption_is_optional() {
    let mut opts = pinned_options();
    opts.caption = None;

    let strip = StripCompositor::default()
        .render(&four_shot_session(), &opts)
        .expect("render should succeed");
    assert!(strip.caption.is_none());

    let img = image::load_from_memory(&strip.png)
        .expect("strip png should decode")
        .to_rgba8();
    let band_top = 1408 - 100;
    let white = (band_top..1408)
        .flat_map(|y| (0..448).map(move |x| (x, y)))
        .filter(|&(x, y)| img.get_pixel(x, y).0 == [255, 255, 255, 255])
        .count();
    assert_eq!(white, 0, "no caption ink expected");
}

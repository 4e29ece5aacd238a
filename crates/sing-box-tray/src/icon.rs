//! Recoloring of the embedded base icon.

use image::RgbaImage;

/// Opacity boost applied to every visible pixel on top of the configured
/// alpha offset; fully transparent pixels stay transparent.
const ALPHA_BOOST: i32 = 38;

/// Apply the configured per-channel offsets to the base icon, clamping
/// each channel to the valid byte range.
pub(crate) fn recolor(base: &RgbaImage, offsets: [i16; 4]) -> RgbaImage {
    let mut image = base.clone();

    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        pixel.0 = [
            shift(r, i32::from(offsets[0])),
            shift(g, i32::from(offsets[1])),
            shift(b, i32::from(offsets[2])),
            if a == 0 {
                0
            } else {
                shift(a, ALPHA_BOOST + i32::from(offsets[3]))
            },
        ];
    }

    image
}

fn shift(channel: u8, offset: i32) -> u8 {
    (i32::from(channel) + offset).clamp(0, 255) as u8
}

//! RGB to HSV conversion.
//!
//! Converts an interleaved RGB raster into one [`HsvPixel`] per pixel,
//! on the scales the acceptance tables use: hue in half-degrees
//! (0-180), saturation and value in 0-255.
//!
//! This is the first step in the pipeline: raster in, HSV samples out.

use image::RgbImage;

use crate::types::HsvPixel;

/// Convert a raster to per-pixel HSV samples.
///
/// Output ordering matches the raster's row-major pixel ordering.
/// Every pixel is converted independently.
#[must_use = "returns the per-pixel HSV samples"]
pub fn convert(image: &RgbImage) -> Vec<HsvPixel> {
    image
        .pixels()
        .map(|px| hsv_from_rgb(px.0[0], px.0[1], px.0[2]))
        .collect()
}

/// Convert a single RGB triple to HSV.
///
/// Standard hexcone conversion: `v` is the channel maximum, `s` is
/// `delta / max`, and hue is computed piecewise from whichever channel
/// is the maximum, wrapped into [0, 360) and then halved. Achromatic
/// pixels (`delta == 0`) report zero hue and saturation.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn hsv_from_rgb(r: u8, g: u8, b: u8) -> HsvPixel {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    if delta == 0 {
        return HsvPixel::new(0, 0, max);
    }

    // The 1/255 normalization cancels in every ratio below, so hue and
    // saturation come straight from the byte differences.
    let delta_f = f64::from(delta);
    let sixth = if max == r {
        (f64::from(g) - f64::from(b)) / delta_f % 6.0
    } else if max == g {
        (f64::from(b) - f64::from(r)) / delta_f + 2.0
    } else {
        (f64::from(r) - f64::from(g)) / delta_f + 4.0
    };

    let mut degrees = sixth * 60.0;
    if degrees < 0.0 {
        degrees += 360.0;
    }

    let saturation = delta_f / f64::from(max);

    HsvPixel::new(
        (degrees / 2.0).round() as u8,
        (saturation * 255.0).round() as u8,
        max,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_red() {
        assert_eq!(hsv_from_rgb(255, 0, 0), HsvPixel::new(0, 255, 255));
    }

    #[test]
    fn pure_yellow() {
        assert_eq!(hsv_from_rgb(255, 255, 0), HsvPixel::new(30, 255, 255));
    }

    #[test]
    fn pure_black() {
        assert_eq!(hsv_from_rgb(0, 0, 0), HsvPixel::new(0, 0, 0));
    }

    #[test]
    fn pure_green() {
        assert_eq!(hsv_from_rgb(0, 255, 0), HsvPixel::new(60, 255, 255));
    }

    #[test]
    fn pure_blue() {
        assert_eq!(hsv_from_rgb(0, 0, 255), HsvPixel::new(120, 255, 255));
    }

    #[test]
    fn white_is_achromatic() {
        assert_eq!(hsv_from_rgb(255, 255, 255), HsvPixel::new(0, 0, 255));
    }

    #[test]
    fn gray_keeps_value() {
        assert_eq!(hsv_from_rgb(100, 100, 100), HsvPixel::new(0, 0, 100));
    }

    #[test]
    fn negative_hue_wraps_into_range() {
        // Red max with blue above green lands the piecewise hue below
        // zero before wrapping: 360 - 30.1 degrees, halved.
        assert_eq!(hsv_from_rgb(255, 0, 128), HsvPixel::new(165, 255, 255));
    }

    #[test]
    fn hue_is_always_at_most_180() {
        for (r, g, b) in [(255, 0, 1), (0, 1, 255), (1, 255, 0), (255, 0, 255)] {
            let px = hsv_from_rgb(r, g, b);
            assert!(px.h <= 180, "hue {} out of range for ({r},{g},{b})", px.h);
        }
    }

    #[test]
    fn convert_preserves_pixel_order() {
        let mut image = RgbImage::new(2, 2);
        image.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        image.put_pixel(1, 0, image::Rgb([0, 255, 0]));
        image.put_pixel(0, 1, image::Rgb([0, 0, 255]));
        image.put_pixel(1, 1, image::Rgb([0, 0, 0]));

        let samples = convert(&image);
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0], HsvPixel::new(0, 255, 255));
        assert_eq!(samples[1], HsvPixel::new(60, 255, 255));
        assert_eq!(samples[2], HsvPixel::new(120, 255, 255));
        assert_eq!(samples[3], HsvPixel::new(0, 0, 0));
    }
}

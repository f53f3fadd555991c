//! Color-space conversions
//!
//! Per-pixel transforms feeding the feature map:
//! - **Lab**: CIE L\*a\*b\* (D65) through linear sRGB
//! - **HSV**: hue in degrees, saturation and value in [0, 1]
//! - **Vegetation indices**: excess green `2G - R - B`, excess blue `2B - R - G`
//! - **Luma**: BT.601 grayscale used for texture
//!
//! Inputs are sRGB samples in [0, 1].

use palette::{FromColor, Hsv, Lab, Srgb};

/// Lab coordinates `[L, a, b]`: L in [0, 100], a and b roughly in [-128, 127]
pub fn lab(rgb: [f32; 3]) -> [f64; 3] {
    let lab: Lab = Lab::from_color(Srgb::new(rgb[0], rgb[1], rgb[2]).into_linear());
    [lab.l as f64, lab.a as f64, lab.b as f64]
}

/// HSV coordinates `[hue_degrees, saturation, value]`, hue in [0, 360)
pub fn hsv(rgb: [f32; 3]) -> [f64; 3] {
    let hsv: Hsv = Hsv::from_color(Srgb::new(rgb[0], rgb[1], rgb[2]));
    let hue = hsv.hue.into_positive_degrees() as f64;
    // Wrap 360 back to 0 so the normalized hue stays below 1
    let hue = if hue >= 360.0 { 0.0 } else { hue };
    [hue, hsv.saturation as f64, hsv.value as f64]
}

/// Excess green `2G - R - B`, in [-2, 2]
#[inline]
pub fn excess_green(rgb: [f32; 3]) -> f64 {
    2.0 * rgb[1] as f64 - rgb[0] as f64 - rgb[2] as f64
}

/// Excess blue `2B - R - G`, in [-2, 2]
#[inline]
pub fn excess_blue(rgb: [f32; 3]) -> f64 {
    2.0 * rgb[2] as f64 - rgb[0] as f64 - rgb[1] as f64
}

/// BT.601 luma in [0, 1]
#[inline]
pub fn luma(rgb: [f32; 3]) -> f64 {
    0.299 * rgb[0] as f64 + 0.587 * rgb[1] as f64 + 0.114 * rgb[2] as f64
}

/// Share of blue in the raw RGB sum; 0 for black
#[inline]
pub fn blue_chromaticity(rgb: [f32; 3]) -> f64 {
    let sum = rgb[0] as f64 + rgb[1] as f64 + rgb[2] as f64;
    rgb[2] as f64 / (sum + 1e-9)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lab_extremes() {
        let white = lab([1.0, 1.0, 1.0]);
        assert!((white[0] - 100.0).abs() < 0.5, "white L = {}", white[0]);
        assert!(white[1].abs() < 0.5 && white[2].abs() < 0.5);

        let black = lab([0.0, 0.0, 0.0]);
        assert!(black[0].abs() < 1e-6);
    }

    #[test]
    fn test_lab_blue_has_negative_b() {
        let blue = lab([40.0 / 255.0, 80.0 / 255.0, 160.0 / 255.0]);
        assert!(blue[2] < -20.0, "blue b = {}", blue[2]);
    }

    #[test]
    fn test_hsv_primaries() {
        let red = hsv([1.0, 0.0, 0.0]);
        assert!(red[0].abs() < 1e-3);
        assert!((red[1] - 1.0).abs() < 1e-6);
        assert!((red[2] - 1.0).abs() < 1e-6);

        let blue = hsv([0.0, 0.0, 1.0]);
        assert!((blue[0] - 240.0).abs() < 1e-3);

        let gray = hsv([0.5, 0.5, 0.5]);
        assert!(gray[1].abs() < 1e-6);
        assert!((gray[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_vegetation_indices() {
        let green = [0.1, 0.8, 0.1];
        assert!((excess_green(green) - 1.4).abs() < 1e-6);
        assert!((excess_blue(green) + 0.7).abs() < 1e-6);
        assert!(excess_green([0.3, 0.3, 0.3]).abs() < 1e-6);
    }

    #[test]
    fn test_luma_and_chromaticity() {
        assert!((luma([1.0, 1.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((blue_chromaticity([0.2, 0.2, 0.2]) - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(blue_chromaticity([0.0, 0.0, 0.0]), 0.0);
    }
}

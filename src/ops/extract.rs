//! Dominant-color extraction via k-means clustering.
//!
//! The image is shrunk to a fixed 200×200 working size (clustering cost must
//! not scale with source resolution), its pixels converted to Lab, and the
//! cluster centroids become the palette. The seed is fixed so the same image
//! always yields the same palette.

use image::RgbImage;
use image::imageops::FilterType;
use kmeans_colors::get_kmeans;
use palette::{IntoColor, Lab, Srgb};

use crate::color::rgb_to_hex;

/// Working size the image is reduced to before clustering.
const CLUSTER_SIDE: u32 = 200;
const KMEANS_MAX_ITER: usize = 20;
const KMEANS_CONVERGE: f32 = 1e-4;
const KMEANS_SEED: u64 = 42;

/// Extract `num_colors` dominant colors as canonical hex strings.
///
/// Returns an error for empty images or a zero color count; otherwise the
/// result always has exactly `num_colors` entries.
pub fn extract_colors(image: &RgbImage, num_colors: usize) -> Result<Vec<String>, String> {
    if num_colors == 0 {
        return Err("color count must be at least 1".to_string());
    }
    if image.width() == 0 || image.height() == 0 {
        return Err("image has no pixels".to_string());
    }

    let small = image::imageops::resize(image, CLUSTER_SIDE, CLUSTER_SIDE, FilterType::Triangle);

    let lab_pixels: Vec<Lab> = small
        .pixels()
        .map(|p| {
            let srgb = Srgb::<u8>::new(p.0[0], p.0[1], p.0[2]);
            srgb.into_linear().into_color()
        })
        .collect();

    let kmeans = get_kmeans(
        num_colors,
        KMEANS_MAX_ITER,
        KMEANS_CONVERGE,
        false,
        &lab_pixels,
        KMEANS_SEED,
    );

    let mut colors: Vec<String> = kmeans
        .centroids
        .iter()
        .map(|&lab| {
            let rgb: Srgb<f32> = Srgb::from_linear(lab.into_color());
            let rgb = rgb.into_format::<u8>();
            rgb_to_hex(rgb.red, rgb.green, rgb.blue)
        })
        .collect();

    // k-means can return fewer centroids than requested for tiny color
    // ranges; pad by repeating the last centroid so callers always get N.
    while colors.len() < num_colors {
        let last = colors.last().cloned().unwrap_or_else(|| "#000000".to_string());
        colors.push(last);
    }

    Ok(colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn rejects_degenerate_inputs() {
        let img = RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]));
        assert!(extract_colors(&img, 0).is_err());
        assert!(extract_colors(&RgbImage::new(0, 0), 3).is_err());
    }

    #[test]
    fn returns_requested_count() {
        let img = RgbImage::from_pixel(16, 16, Rgb([200, 50, 50]));
        let colors = extract_colors(&img, 5).unwrap();
        assert_eq!(colors.len(), 5);
        for c in &colors {
            assert!(crate::color::hex_to_rgb(c).is_some(), "invalid hex {c}");
        }
    }

    #[test]
    fn repeated_runs_yield_identical_palettes() {
        // Seeded k-means over a fixed working size: same image in, same
        // palette out, every time.
        let mut img = RgbImage::new(12, 12);
        for y in 0..12 {
            for x in 0..12 {
                img.put_pixel(x, y, Rgb([(x * 20) as u8, (y * 20) as u8, 128]));
            }
        }
        let first = extract_colors(&img, 4).unwrap();
        let second = extract_colors(&img, 4).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn solid_image_yields_its_color() {
        let img = RgbImage::from_pixel(16, 16, Rgb([250, 10, 10]));
        let colors = extract_colors(&img, 1).unwrap();
        let [r, g, b] = crate::color::hex_to_rgb(&colors[0]).unwrap();
        // Lab round trip is not bit-exact; stay within a small tolerance.
        assert!((r as i32 - 250).abs() <= 3, "r={r}");
        assert!((g as i32 - 10).abs() <= 3, "g={g}");
        assert!((b as i32 - 10).abs() <= 3, "b={b}");
    }

    #[test]
    fn two_region_image_finds_both_colors() {
        let mut img = RgbImage::new(20, 10);
        for y in 0..10 {
            for x in 0..20 {
                let px = if x < 10 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) };
                img.put_pixel(x, y, px);
            }
        }
        let mut colors = extract_colors(&img, 2).unwrap();
        colors.sort();
        let rgb: Vec<[u8; 3]> = colors
            .iter()
            .map(|c| crate::color::hex_to_rgb(c).unwrap())
            .collect();
        assert!(rgb.iter().any(|c| c[0] > 200 && c[2] < 60), "no red centroid in {colors:?}");
        assert!(rgb.iter().any(|c| c[2] > 200 && c[0] < 60), "no blue centroid in {colors:?}");
    }
}

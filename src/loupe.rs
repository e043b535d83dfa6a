//! Loupe math: magnified pixel patch, crosshair sizing, and placement.
//!
//! The loupe shows an up-to-13×13 source-pixel neighborhood around the active
//! marker, scaled with nearest-neighbor so the user sees the exact sampled
//! pixel unblurred. Everything here is pure computation; the stage turns the
//! patch into a texture and draws the crosshair with the painter.

use crate::sampler::PixelSampler;

/// Source-pixel radius of the magnified neighborhood (13×13 max).
pub const SOURCE_RADIUS: u32 = 6;
/// Side of the square preview, in screen pixels.
pub const CANVAS_PX: usize = 96;
/// Height of the hex readout strip under the preview.
pub const HEX_STRIP_PX: f32 = 20.0;
/// Minimum gap kept between the loupe and the stage edges.
pub const EDGE_MARGIN: f32 = 6.0;
const BOTTOM_MARGIN: f32 = 4.0;

/// Overall loupe box (preview + hex strip + border padding).
pub fn loupe_size() -> (f32, f32) {
    let w = CANVAS_PX as f32 + 8.0;
    let h = CANVAS_PX as f32 + HEX_STRIP_PX + 8.0;
    (w, h)
}

/// Extract the neighborhood around the sampled pixel at (`norm_x`, `norm_y`)
/// and scale it into a `CANVAS_PX`² RGB buffer, nearest-neighbor.
///
/// Mirrors the sampler's clamping: the source window is shifted (not
/// shrunk asymmetrically) at image borders, exactly like a canvas blit from
/// a clamped source rect. Returns `None` when no raster is built.
pub fn magnified_patch(sampler: &PixelSampler, norm_x: f32, norm_y: f32) -> Option<Vec<u8>> {
    let (width, height) = sampler.dimensions()?;

    let center_x = (norm_x.clamp(0.0, 1.0) * (width - 1) as f32).round() as i64;
    let center_y = (norm_y.clamp(0.0, 1.0) * (height - 1) as f32).round() as i64;
    let r = SOURCE_RADIUS as i64;

    let side = 2 * r + 1;
    let src_x = (center_x - r).clamp(0, (width as i64 - side).max(0));
    let src_y = (center_y - r).clamp(0, (height as i64 - side).max(0));
    let src_w = side.min(width as i64) as u32;
    let src_h = side.min(height as i64) as u32;

    let mut out = vec![0u8; CANVAS_PX * CANVAS_PX * 3];
    for dy in 0..CANVAS_PX {
        let sy = src_y as u32 + (dy as u32 * src_h) / CANVAS_PX as u32;
        for dx in 0..CANVAS_PX {
            let sx = src_x as u32 + (dx as u32 * src_w) / CANVAS_PX as u32;
            let px = sampler.pixel(sx, sy)?;
            let off = (dy * CANVAS_PX + dx) * 3;
            out[off..off + 3].copy_from_slice(&px);
        }
    }
    Some(out)
}

/// Crosshair half-size and line width for a given stage width. Small stages
/// get a smaller crosshair so it does not overwhelm the loupe.
pub fn crosshair_for_stage(stage_width: f32) -> (f32, f32) {
    if stage_width <= 575.0 {
        (5.0, 1.0)
    } else if stage_width <= 768.0 {
        (6.0, 1.15)
    } else {
        (10.0, 1.5)
    }
}

/// Place the loupe near the marker at (`marker_x`, `marker_y`) — both in
/// stage-local coordinates — offset up-and-right by default, flipping below
/// or clamping when an edge would clip it. The result always stays at least
/// [`EDGE_MARGIN`] from the stage's top/left/right edges.
pub fn reposition(
    stage_w: f32,
    stage_h: f32,
    marker_x: f32,
    marker_y: f32,
    loupe_w: f32,
    loupe_h: f32,
) -> (f32, f32) {
    let mut left = marker_x + 18.0;
    let mut top = marker_y - loupe_h - 12.0;

    if left + loupe_w > stage_w {
        left = stage_w - loupe_w - EDGE_MARGIN;
    }
    if left < EDGE_MARGIN {
        left = EDGE_MARGIN;
    }
    if top < EDGE_MARGIN {
        top = marker_y + 18.0;
    }
    if top + loupe_h > stage_h - BOTTOM_MARGIN {
        top = stage_h - loupe_h - BOTTOM_MARGIN;
    }

    (left, top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{PixelSampler, SamplerConfig};
    use image::{Rgb, RgbImage};

    #[test]
    fn patch_is_solid_for_solid_image() {
        let img = RgbImage::from_pixel(32, 32, Rgb([12, 34, 56]));
        let mut sampler = PixelSampler::new(SamplerConfig::default());
        sampler.rebuild(&img);

        let patch = magnified_patch(&sampler, 0.5, 0.5).unwrap();
        assert_eq!(patch.len(), CANVAS_PX * CANVAS_PX * 3);
        assert!(patch.chunks(3).all(|p| p == [12, 34, 56]));
    }

    #[test]
    fn patch_requires_raster() {
        let sampler = PixelSampler::new(SamplerConfig::default());
        assert!(magnified_patch(&sampler, 0.5, 0.5).is_none());
    }

    #[test]
    fn patch_center_matches_sampled_pixel() {
        // Distinct center pixel on a white field; the preview center must
        // show exactly that pixel (nearest-neighbor, no smoothing).
        let mut img = RgbImage::from_pixel(31, 31, Rgb([255, 255, 255]));
        img.put_pixel(15, 15, Rgb([200, 10, 10]));
        let mut sampler = PixelSampler::new(SamplerConfig::default());
        sampler.rebuild(&img);

        let patch = magnified_patch(&sampler, 0.5, 0.5).unwrap();
        let mid = CANVAS_PX / 2;
        let off = (mid * CANVAS_PX + mid) * 3;
        assert_eq!(&patch[off..off + 3], &[200, 10, 10]);
    }

    #[test]
    fn crosshair_tiers() {
        assert_eq!(crosshair_for_stage(400.0), (5.0, 1.0));
        assert_eq!(crosshair_for_stage(700.0), (6.0, 1.15));
        assert_eq!(crosshair_for_stage(1400.0), (10.0, 1.5));
    }

    #[test]
    fn reposition_stays_inside_stage_for_all_corners() {
        let (lw, lh) = loupe_size();
        for &side in &[200.0f32, 320.0, 640.0, 1024.0, 2000.0] {
            for &(mx, my) in &[
                (0.0, 0.0),
                (side, 0.0),
                (0.0, side),
                (side, side),
                (side / 2.0, side / 2.0),
            ] {
                let (left, top) = reposition(side, side, mx, my, lw, lh);
                assert!(left >= EDGE_MARGIN, "left clipped at side={side} mx={mx} my={my}");
                assert!(
                    left + lw <= side - EDGE_MARGIN + 0.01 || side < lw + 2.0 * EDGE_MARGIN,
                    "right clipped at side={side} mx={mx} my={my}"
                );
                assert!(
                    top + lh <= side + 0.01 || side < lh,
                    "bottom clipped at side={side} mx={mx} my={my}"
                );
            }
        }
    }

    #[test]
    fn reposition_flips_below_near_top_edge() {
        let (lw, lh) = loupe_size();
        let (_, top) = reposition(1000.0, 1000.0, 500.0, 10.0, lw, lh);
        assert_eq!(top, 10.0 + 18.0);
    }
}

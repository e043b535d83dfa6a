//! Pixel sampling over an offscreen copy of the loaded image.
//!
//! The sampler owns the only pixel-readable raster in the app. It is rebuilt
//! wholesale whenever a new image loads and answers two questions: what color
//! sits at a normalized coordinate, and where in the image a given palette
//! color occurs. The occurrence search runs on a downsampled copy so its cost
//! is bounded by `max_search_side²` regardless of source resolution — a
//! full-resolution nearest search would be O(width × height) per color and is
//! deliberately not offered.

use image::RgbImage;
use image::imageops::FilterType;

use crate::geometry::NormPos;

/// Tuning knobs for the best-match search. The defaults are empirical: small
/// enough to keep a worst-case scan around 240×240 pixels, spread out enough
/// that identical target colors land on visibly distinct spots.
#[derive(Clone, Copy, Debug)]
pub struct SamplerConfig {
    /// Longest side of the downsampled search raster, in pixels.
    pub max_search_side: u32,
    /// Radius (in downsampled pixels) of the exclusion disk claimed around
    /// each accepted match.
    pub exclusion_radius: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_search_side: 240,
            exclusion_radius: 3,
        }
    }
}

/// Offscreen raster mirroring the displayed image.
///
/// Unbuilt (`raster == None`) until the first successful [`rebuild`]; every
/// query on an unbuilt sampler returns `None` and callers treat that as
/// "try again later", never as an error.
///
/// [`rebuild`]: PixelSampler::rebuild
pub struct PixelSampler {
    raster: Option<RgbImage>,
    config: SamplerConfig,
}

impl PixelSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            raster: None,
            config,
        }
    }

    pub fn config(&self) -> SamplerConfig {
        self.config
    }

    /// True once an image has been copied in.
    pub fn is_built(&self) -> bool {
        self.raster.is_some()
    }

    /// Replace the raster wholesale with a copy of `image`. Returns `false`
    /// and keeps the previous raster if the image has zero dimensions
    /// (not yet decoded).
    pub fn rebuild(&mut self, image: &RgbImage) -> bool {
        if image.width() == 0 || image.height() == 0 {
            return false;
        }
        self.raster = Some(image.clone());
        true
    }

    /// Drop the raster entirely (new-upload reset).
    pub fn invalidate(&mut self) {
        self.raster = None;
    }

    /// Natural dimensions of the built raster.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.raster.as_ref().map(|r| r.dimensions())
    }

    /// Direct pixel read at integer raster coordinates (loupe patch path).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        let raster = self.raster.as_ref()?;
        if x >= raster.width() || y >= raster.height() {
            return None;
        }
        Some(raster.get_pixel(x, y).0)
    }

    /// Color at a normalized coordinate. Coordinates are clamped to `[0,1]`
    /// and mapped to the nearest integer pixel.
    pub fn sample_at(&self, norm_x: f32, norm_y: f32) -> Option<[u8; 3]> {
        let raster = self.raster.as_ref()?;
        let x = (norm_x.clamp(0.0, 1.0) * (raster.width() - 1) as f32).round() as u32;
        let y = (norm_y.clamp(0.0, 1.0) * (raster.height() - 1) as f32).round() as u32;
        Some(raster.get_pixel(x, y).0)
    }

    /// For each target color, in order, find the normalized position of the
    /// nearest-colored pixel (squared Euclidean RGB distance) in a
    /// downsampled copy of the raster.
    ///
    /// Each accepted match claims an exclusion disk so that repeated or
    /// similar targets spread out instead of stacking; when every pixel is
    /// already claimed, that single color falls back to an unmasked rescan.
    /// Returns `None` when no raster is built — callers fall back to the
    /// grid layout instead.
    pub fn find_best_match_positions(&self, targets: &[[u8; 3]]) -> Option<Vec<NormPos>> {
        if targets.is_empty() {
            return None;
        }
        let raster = self.raster.as_ref()?;

        let scale =
            (self.config.max_search_side as f32 / raster.width().max(raster.height()) as f32)
                .min(1.0);
        let search_w = ((raster.width() as f32 * scale).round() as u32).max(1);
        let search_h = ((raster.height() as f32 * scale).round() as u32).max(1);

        let search: RgbImage = if (search_w, search_h) == raster.dimensions() {
            raster.clone()
        } else {
            image::imageops::resize(raster, search_w, search_h, FilterType::Triangle)
        };
        let data = search.as_raw();
        let pixel_count = (search_w * search_h) as usize;
        let mut used = vec![false; pixel_count];

        let mut positions = Vec::with_capacity(targets.len());
        for target in targets {
            let best = best_index(data, target, Some(&used))
                // Pathological case: every candidate claimed. Ignore the mask
                // for this one color rather than failing the whole set.
                .or_else(|| best_index(data, target, None))?;

            mark_used_disk(&mut used, best, search_w, search_h, self.config.exclusion_radius);

            let x = (best as u32) % search_w;
            let y = (best as u32) / search_w;
            positions.push(NormPos::new(
                axis_norm(x, search_w),
                axis_norm(y, search_h),
            ));
        }

        Some(positions)
    }
}

fn axis_norm(coord: u32, dim: u32) -> f32 {
    if dim > 1 {
        coord as f32 / (dim - 1) as f32
    } else {
        0.5
    }
}

/// Linear scan for the pixel nearest to `target`, skipping masked pixels
/// when a mask is given. Exact matches short-circuit.
fn best_index(data: &[u8], target: &[u8; 3], mask: Option<&[bool]>) -> Option<usize> {
    let mut best_index = None;
    let mut best_distance = u32::MAX;

    for i in 0..data.len() / 3 {
        if let Some(mask) = mask
            && mask[i]
        {
            continue;
        }
        let offset = i * 3;
        let dr = target[0] as i32 - data[offset] as i32;
        let dg = target[1] as i32 - data[offset + 1] as i32;
        let db = target[2] as i32 - data[offset + 2] as i32;
        let distance = (dr * dr + dg * dg + db * db) as u32;
        if distance < best_distance {
            best_distance = distance;
            best_index = Some(i);
            if distance == 0 {
                break;
            }
        }
    }

    best_index
}

/// Claim a disk of `radius` around flat index `center` in the exclusion mask.
fn mark_used_disk(mask: &mut [bool], center: usize, width: u32, height: u32, radius: u32) {
    let cx = (center as u32 % width) as i64;
    let cy = (center as u32 / width) as i64;
    let r = radius as i64;

    for y in (cy - r)..=(cy + r) {
        if y < 0 || y >= height as i64 {
            continue;
        }
        for x in (cx - r)..=(cx + r) {
            if x < 0 || x >= width as i64 {
                continue;
            }
            let dx = x - cx;
            let dy = y - cy;
            if dx * dx + dy * dy <= r * r {
                mask[(y * width as i64 + x) as usize] = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// 2×2 test image: red, green / blue, white.
    fn quad() -> RgbImage {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));
        img.put_pixel(0, 1, Rgb([0, 0, 255]));
        img.put_pixel(1, 1, Rgb([255, 255, 255]));
        img
    }

    fn built(img: &RgbImage) -> PixelSampler {
        let mut sampler = PixelSampler::new(SamplerConfig::default());
        assert!(sampler.rebuild(img));
        sampler
    }

    #[test]
    fn unbuilt_sampler_returns_none() {
        let sampler = PixelSampler::new(SamplerConfig::default());
        assert!(!sampler.is_built());
        assert_eq!(sampler.sample_at(0.5, 0.5), None);
        assert_eq!(sampler.find_best_match_positions(&[[0, 0, 0]]), None);
    }

    #[test]
    fn rebuild_rejects_empty_image() {
        let mut sampler = PixelSampler::new(SamplerConfig::default());
        assert!(!sampler.rebuild(&RgbImage::new(0, 0)));
        assert!(!sampler.is_built());
    }

    #[test]
    fn sample_at_reads_corners() {
        let sampler = built(&quad());
        assert_eq!(sampler.sample_at(0.0, 0.0), Some([255, 0, 0]));
        assert_eq!(sampler.sample_at(1.0, 0.0), Some([0, 255, 0]));
        assert_eq!(sampler.sample_at(0.0, 1.0), Some([0, 0, 255]));
        assert_eq!(sampler.sample_at(1.0, 1.0), Some([255, 255, 255]));
    }

    #[test]
    fn sample_at_is_idempotent() {
        let sampler = built(&quad());
        assert_eq!(sampler.sample_at(0.3, 0.7), sampler.sample_at(0.3, 0.7));
    }

    #[test]
    fn sample_at_clamps_out_of_range_coordinates() {
        let sampler = built(&quad());
        assert_eq!(sampler.sample_at(-0.5, 2.0), sampler.sample_at(0.0, 1.0));
    }

    #[test]
    fn match_positions_round_trip_exact_colors() {
        let sampler = built(&quad());
        let positions = sampler
            .find_best_match_positions(&[[255, 0, 0], [255, 255, 255]])
            .unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(sampler.sample_at(positions[0].x, positions[0].y), Some([255, 0, 0]));
        assert_eq!(
            sampler.sample_at(positions[1].x, positions[1].y),
            Some([255, 255, 255])
        );
        assert_ne!(positions[0], positions[1]);
    }

    #[test]
    fn identical_targets_get_distinct_positions() {
        // 10×1 strip of a single color: plenty of exact matches, the
        // exclusion disk must push the second hit away from the first.
        let mut img = RgbImage::new(10, 1);
        for x in 0..10 {
            img.put_pixel(x, 0, Rgb([10, 20, 30]));
        }
        let sampler = built(&img);
        let positions = sampler
            .find_best_match_positions(&[[10, 20, 30], [10, 20, 30]])
            .unwrap();
        assert_ne!(positions[0], positions[1]);
    }

    #[test]
    fn exhausted_mask_falls_back_per_color() {
        // Single pixel image with a huge exclusion radius: the second target
        // finds everything masked and must still resolve via the unmasked
        // rescan rather than failing the set.
        let mut img = RgbImage::new(1, 1);
        img.put_pixel(0, 0, Rgb([5, 5, 5]));
        let mut sampler = PixelSampler::new(SamplerConfig {
            max_search_side: 240,
            exclusion_radius: 10,
        });
        assert!(sampler.rebuild(&img));
        let positions = sampler
            .find_best_match_positions(&[[5, 5, 5], [5, 5, 5]])
            .unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0], NormPos::CENTER);
        assert_eq!(positions[1], NormPos::CENTER);
    }

    #[test]
    fn large_images_are_downsampled_before_search() {
        // 1000×500 solid image; the search still succeeds and the position
        // samples back to the same color at full resolution.
        let img = RgbImage::from_pixel(1000, 500, Rgb([80, 90, 100]));
        let sampler = built(&img);
        let positions = sampler.find_best_match_positions(&[[80, 90, 100]]).unwrap();
        assert_eq!(
            sampler.sample_at(positions[0].x, positions[0].y),
            Some([80, 90, 100])
        );
    }
}

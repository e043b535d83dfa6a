//! Coordinate conversion between normalized image space and screen space,
//! plus the fallback grid layout for marker placement.
//!
//! Normalized positions live in `[0,1]²` relative to the image's own
//! width/height, so they survive window resizes and zoom changes; only the
//! conversion to screen pixels depends on where the image currently sits.

use egui::{Pos2, Rect};

/// A position in normalized image space, both axes in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormPos {
    pub x: f32,
    pub y: f32,
}

impl NormPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const CENTER: NormPos = NormPos { x: 0.5, y: 0.5 };
}

/// Arrange `count` markers in a near-square grid of cell centers, row-major.
///
/// Used when color matching cannot place markers. One marker sits at the
/// image center; zero markers yield an empty layout.
pub fn default_positions(count: usize) -> Vec<NormPos> {
    if count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![NormPos::CENTER];
    }

    let cols = (count as f32).sqrt().ceil() as usize;
    let rows = count.div_ceil(cols);

    (0..count)
        .map(|i| {
            let col = i % cols;
            let row = i / cols;
            NormPos::new(
                (col as f32 + 0.5) / cols as f32,
                (row as f32 + 0.5) / rows as f32,
            )
        })
        .collect()
}

/// Convert a screen-space point to a normalized position within `image_rect`,
/// clamping to the image bounds. Must be called against the *current* rect —
/// the image box can move or resize without a new image load.
pub fn normalized_from_screen(pos: Pos2, image_rect: Rect) -> NormPos {
    let w = image_rect.width().max(f32::EPSILON);
    let h = image_rect.height().max(f32::EPSILON);
    NormPos::new(
        ((pos.x - image_rect.left()) / w).clamp(0.0, 1.0),
        ((pos.y - image_rect.top()) / h).clamp(0.0, 1.0),
    )
}

/// Convert a normalized position to screen space within `image_rect`.
pub fn screen_from_normalized(norm: NormPos, image_rect: Rect) -> Pos2 {
    Pos2::new(
        image_rect.left() + norm.x * image_rect.width(),
        image_rect.top() + norm.y * image_rect.height(),
    )
}

/// Largest rect with the image's aspect ratio that fits centered inside
/// `stage` (letterboxing). Zero-sized inputs collapse to a point at the
/// stage center.
pub fn fit_image_rect(stage: Rect, image_w: u32, image_h: u32) -> Rect {
    if image_w == 0 || image_h == 0 || stage.width() <= 0.0 || stage.height() <= 0.0 {
        return Rect::from_center_size(stage.center(), egui::Vec2::ZERO);
    }
    let fit = (stage.width() / image_w as f32).min(stage.height() / image_h as f32);
    let size = egui::Vec2::new(image_w as f32 * fit, image_h as f32 * fit);
    Rect::from_center_size(stage.center(), size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_counts_and_bounds() {
        for n in 1..=20 {
            let positions = default_positions(n);
            assert_eq!(positions.len(), n);
            for p in &positions {
                assert!(p.x > 0.0 && p.x < 1.0, "x out of range for n={n}");
                assert!(p.y > 0.0 && p.y < 1.0, "y out of range for n={n}");
            }
        }
    }

    #[test]
    fn grid_positions_distinct_for_small_counts() {
        let two = default_positions(2);
        assert_ne!(two[0], two[1]);
    }

    #[test]
    fn single_marker_centers() {
        assert_eq!(default_positions(1), vec![NormPos::CENTER]);
        assert!(default_positions(0).is_empty());
    }

    #[test]
    fn screen_conversion_round_trip() {
        let rect = Rect::from_min_size(Pos2::new(40.0, 20.0), egui::Vec2::new(200.0, 100.0));
        let norm = normalized_from_screen(Pos2::new(140.0, 70.0), rect);
        assert!((norm.x - 0.5).abs() < 1e-5);
        assert!((norm.y - 0.5).abs() < 1e-5);
        let back = screen_from_normalized(norm, rect);
        assert!((back.x - 140.0).abs() < 1e-3);
        assert!((back.y - 70.0).abs() < 1e-3);
    }

    #[test]
    fn screen_conversion_clamps_outside_points() {
        let rect = Rect::from_min_size(Pos2::new(0.0, 0.0), egui::Vec2::new(100.0, 100.0));
        let norm = normalized_from_screen(Pos2::new(-50.0, 250.0), rect);
        assert_eq!(norm, NormPos::new(0.0, 1.0));
    }

    #[test]
    fn letterbox_preserves_aspect() {
        let stage = Rect::from_min_size(Pos2::ZERO, egui::Vec2::new(400.0, 400.0));
        let rect = fit_image_rect(stage, 200, 100);
        assert!((rect.width() / rect.height() - 2.0).abs() < 1e-4);
        assert!(rect.width() <= stage.width() + 0.5);
        assert!(rect.height() <= stage.height() + 0.5);
    }
}

//! Marker list and drag state machine, independent of any rendering.
//!
//! One marker exists per palette color, holding a normalized position into
//! image space. The drag session is the only transient state: it records
//! which marker is being dragged and which pointer owns the drag, so events
//! from a second pointer can never move a marker mid-drag. The egui stage
//! feeds events in; everything here is plain data and unit-testable.

use crate::geometry::{self, NormPos};
use crate::sampler::PixelSampler;

/// Identifier of the input pointer that owns a drag. The mouse is pointer 0;
/// touch pointers get their device ids.
pub type PointerId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DragSession {
    marker: usize,
    pointer: PointerId,
}

/// Markers for the current palette plus the active selection and at most one
/// in-flight drag.
#[derive(Default)]
pub struct MarkerModel {
    positions: Vec<NormPos>,
    active: Option<usize>,
    drag: Option<DragSession>,
}

impl MarkerModel {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[NormPos] {
        &self.positions
    }

    pub fn position(&self, index: usize) -> Option<NormPos> {
        self.positions.get(index).copied()
    }

    /// Index of the marker currently showing the loupe, if any.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Index of the marker being dragged, if a drag session is live.
    pub fn dragging(&self) -> Option<usize> {
        self.drag.map(|s| s.marker)
    }

    /// Select a marker without resampling (plain click on a handle).
    pub fn set_active(&mut self, index: usize) {
        if index < self.positions.len() {
            self.active = Some(index);
        }
    }

    /// Remove all markers and forcibly terminate any drag in progress
    /// (palette replaced or image reloaded mid-drag).
    pub fn clear(&mut self) {
        self.positions.clear();
        self.active = None;
        self.drag = None;
    }

    /// (Re)place markers for a palette of `targets` colors.
    ///
    /// Placement prefers the sampler's best-match search; when that cannot
    /// produce a full set (raster unbuilt), every marker falls back to the
    /// grid layout — never a mix of matched and grid-placed markers.
    ///
    /// Positions are kept as-is when the palette size is unchanged and
    /// `force` is false, so color edits and window resizes do not move
    /// markers. A live drag survives only if its marker index still exists.
    pub fn reset_for_palette(&mut self, targets: &[[u8; 3]], sampler: &PixelSampler, force: bool) {
        if targets.is_empty() {
            self.clear();
            return;
        }

        if force || self.positions.len() != targets.len() {
            self.positions = sampler
                .find_best_match_positions(targets)
                .unwrap_or_else(|| geometry::default_positions(targets.len()));
            self.active = Some(0);
            self.drag = None;
        } else if let Some(session) = self.drag
            && session.marker >= self.positions.len()
        {
            self.drag = None;
        }
    }

    // ---- drag state machine -------------------------------------------------

    /// Idle → Dragging on primary-button pointer-down over marker `index`.
    ///
    /// Rejected while another drag is live (the single-session invariant is
    /// an explicit guard, not an accident of event ordering) or for an
    /// out-of-range index. On success the marker also becomes active; the
    /// caller is expected to resample at the down position immediately.
    pub fn begin_drag(&mut self, index: usize, pointer: PointerId) -> bool {
        if self.drag.is_some() || index >= self.positions.len() {
            return false;
        }
        self.drag = Some(DragSession {
            marker: index,
            pointer,
        });
        self.active = Some(index);
        true
    }

    /// Dragging → Dragging on pointer-move. Moves from a pointer that does
    /// not own the session are ignored. Returns the index of the marker that
    /// moved so the caller can resample and push the color into the palette.
    pub fn drag_move(&mut self, pointer: PointerId, norm: NormPos) -> Option<usize> {
        let session = self.drag?;
        if session.pointer != pointer {
            return None;
        }
        self.positions[session.marker] = norm;
        self.active = Some(session.marker);
        Some(session.marker)
    }

    /// Dragging → Idle on pointer-up or pointer-cancel from the owning
    /// pointer. Returns `true` when a session actually ended.
    pub fn end_drag(&mut self, pointer: PointerId) -> bool {
        match self.drag {
            Some(session) if session.pointer == pointer => {
                self.drag = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::SamplerConfig;
    use image::{Rgb, RgbImage};

    fn unbuilt_sampler() -> PixelSampler {
        PixelSampler::new(SamplerConfig::default())
    }

    #[test]
    fn reset_falls_back_to_grid_without_raster() {
        let mut markers = MarkerModel::default();
        markers.reset_for_palette(&[[0, 0, 0]; 4], &unbuilt_sampler(), true);
        assert_eq!(markers.len(), 4);
        assert_eq!(markers.active(), Some(0));
        assert_eq!(markers.positions(), geometry::default_positions(4).as_slice());
    }

    #[test]
    fn reset_with_empty_palette_clears() {
        let mut markers = MarkerModel::default();
        markers.reset_for_palette(&[[0, 0, 0]; 3], &unbuilt_sampler(), true);
        markers.reset_for_palette(&[], &unbuilt_sampler(), false);
        assert!(markers.is_empty());
        assert_eq!(markers.active(), None);
    }

    #[test]
    fn reset_keeps_positions_when_size_unchanged() {
        let mut markers = MarkerModel::default();
        markers.reset_for_palette(&[[0, 0, 0]; 2], &unbuilt_sampler(), true);
        markers.begin_drag(1, 0);
        markers.drag_move(0, NormPos::new(0.9, 0.9));
        markers.end_drag(0);

        // Color edit path: same size, no force — the moved marker stays put.
        markers.reset_for_palette(&[[1, 1, 1]; 2], &unbuilt_sampler(), false);
        assert_eq!(markers.position(1), Some(NormPos::new(0.9, 0.9)));
    }

    #[test]
    fn reset_uses_color_matches_when_raster_built() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 0, 255]));
        let mut sampler = unbuilt_sampler();
        assert!(sampler.rebuild(&img));

        let mut markers = MarkerModel::default();
        markers.reset_for_palette(&[[0, 0, 255]], &sampler, true);
        assert_eq!(markers.position(0), Some(NormPos::new(1.0, 0.5)));
    }

    #[test]
    fn foreign_pointer_cannot_move_a_drag() {
        let mut markers = MarkerModel::default();
        markers.reset_for_palette(&[[0, 0, 0]; 2], &unbuilt_sampler(), true);
        let start = markers.position(0).unwrap();

        assert!(markers.begin_drag(0, 7));
        // Move with a different pointer id: must be ignored.
        assert_eq!(markers.drag_move(99, NormPos::new(0.1, 0.1)), None);
        assert_eq!(markers.position(0), Some(start));
        // Up with the original id still ends the session.
        assert!(markers.end_drag(7));
        assert_eq!(markers.dragging(), None);
    }

    #[test]
    fn second_drag_start_is_rejected() {
        let mut markers = MarkerModel::default();
        markers.reset_for_palette(&[[0, 0, 0]; 2], &unbuilt_sampler(), true);
        assert!(markers.begin_drag(0, 1));
        assert!(!markers.begin_drag(1, 2));
        assert_eq!(markers.dragging(), Some(0));
    }

    #[test]
    fn foreign_pointer_up_does_not_end_session() {
        let mut markers = MarkerModel::default();
        markers.reset_for_palette(&[[0, 0, 0]; 1], &unbuilt_sampler(), true);
        assert!(markers.begin_drag(0, 3));
        assert!(!markers.end_drag(4));
        assert_eq!(markers.dragging(), Some(0));
    }

    #[test]
    fn clear_terminates_live_drag() {
        let mut markers = MarkerModel::default();
        markers.reset_for_palette(&[[0, 0, 0]; 2], &unbuilt_sampler(), true);
        markers.begin_drag(1, 0);
        markers.clear();
        assert_eq!(markers.dragging(), None);
        assert!(markers.is_empty());
        // A stale up event after the forced clear is a no-op.
        assert!(!markers.end_drag(0));
    }

    #[test]
    fn drag_move_updates_position_and_selection() {
        let mut markers = MarkerModel::default();
        markers.reset_for_palette(&[[0, 0, 0]; 3], &unbuilt_sampler(), true);
        markers.set_active(2);
        markers.begin_drag(1, 0);
        assert_eq!(markers.drag_move(0, NormPos::new(0.25, 0.75)), Some(1));
        assert_eq!(markers.position(1), Some(NormPos::new(0.25, 0.75)));
        assert_eq!(markers.active(), Some(1));
    }
}

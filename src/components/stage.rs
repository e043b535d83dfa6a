//! The image stage: displayed image, draggable color markers, and the loupe.
//!
//! All geometry/sampling decisions live in the pure modules (`geometry`,
//! `markers`, `sampler`, `loupe`); this component only feeds them pointer
//! input and paints the results. The image box is recomputed every frame, so
//! window resizes reposition markers without touching their normalized
//! positions.

use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, TextureOptions, Vec2};
use image::RgbImage;

use crate::geometry;
use crate::loupe;
use crate::markers::{MarkerModel, PointerId};
use crate::sampler::PixelSampler;
use crate::session::PaletteSession;

/// The single mouse pointer. Touch pointers would carry their device ids;
/// the drag model does not care which is which.
const MOUSE_POINTER: PointerId = 0;

const MARKER_RADIUS: f32 = 9.0;

/// Something the stage did that the app must react to.
pub enum StageEvent {
    /// A drag resampled the pixel under marker `index`; push `hex` into the
    /// palette entry (swatch, hex field and persisted session all follow).
    ColorSampled { index: usize, hex: String },
}

pub struct StagePanel {
    image_texture: Option<egui::TextureHandle>,
    /// Generation of the image currently uploaded to the GPU; compared with
    /// the app's counter so a texture upload happens once per image load.
    uploaded_generation: u64,
    loupe_texture: Option<egui::TextureHandle>,
}

impl Default for StagePanel {
    fn default() -> Self {
        Self {
            image_texture: None,
            uploaded_generation: 0,
            loupe_texture: None,
        }
    }
}

impl StagePanel {
    /// Render the stage and run marker interaction for this frame.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        image: Option<&RgbImage>,
        image_generation: u64,
        sampler: &PixelSampler,
        markers: &mut MarkerModel,
        session: &PaletteSession,
    ) -> Vec<StageEvent> {
        let mut events = Vec::new();
        let stage_rect = ui.available_rect_before_wrap();
        ui.allocate_rect(stage_rect, Sense::hover());

        let Some(image) = image else {
            self.image_texture = None;
            ui.painter().text(
                stage_rect.center(),
                Align2::CENTER_CENTER,
                "Drop an image here or use Open…",
                FontId::proportional(16.0),
                ui.visuals().weak_text_color(),
            );
            return events;
        };

        self.ensure_image_texture(ui.ctx(), image, image_generation);
        let image_rect = geometry::fit_image_rect(stage_rect, image.width(), image.height());

        if let Some(texture) = &self.image_texture {
            ui.painter().image(
                texture.id(),
                image_rect,
                Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        self.interact_markers(ui, image_rect, sampler, markers, &mut events);
        self.draw_markers(ui, image_rect, markers, session);
        self.draw_loupe(ui, stage_rect, image_rect, sampler, markers, session);

        events
    }

    fn ensure_image_texture(&mut self, ctx: &egui::Context, image: &RgbImage, generation: u64) {
        if self.image_texture.is_some() && self.uploaded_generation == generation {
            return;
        }
        let size = [image.width() as usize, image.height() as usize];
        let color_image = egui::ColorImage::from_rgb(size, image.as_raw());
        self.image_texture = Some(ctx.load_texture("stage_image", color_image, TextureOptions::LINEAR));
        self.uploaded_generation = generation;
    }

    /// Pointer handling for every marker handle. Movement outside the image
    /// box keeps tracking (egui drags follow the pointer anywhere) and the
    /// normalized position clamps to the image bounds.
    fn interact_markers(
        &mut self,
        ui: &mut egui::Ui,
        image_rect: Rect,
        sampler: &PixelSampler,
        markers: &mut MarkerModel,
        events: &mut Vec<StageEvent>,
    ) {
        for index in 0..markers.len() {
            let Some(norm) = markers.position(index) else {
                continue;
            };
            let center = geometry::screen_from_normalized(norm, image_rect);
            let handle = Rect::from_center_size(center, Vec2::splat(MARKER_RADIUS * 2.0 + 4.0));
            let response = ui.interact(
                handle,
                ui.id().with(("palette_marker", index)),
                Sense::click_and_drag(),
            );

            if response.drag_started()
                && markers.begin_drag(index, MOUSE_POINTER)
                && let Some(pos) = response.interact_pointer_pos()
            {
                // A drag begins with a resample at the down position, not
                // only on the first move.
                self.move_and_sample(pos, image_rect, sampler, markers, events);
            }

            if response.dragged()
                && markers.dragging() == Some(index)
                && let Some(pos) = response.interact_pointer_pos()
            {
                self.move_and_sample(pos, image_rect, sampler, markers, events);
            }

            if response.drag_released() {
                markers.end_drag(MOUSE_POINTER);
            }

            // Plain click: select for inspection, no resample.
            if response.clicked() {
                markers.set_active(index);
            }
        }
    }

    fn move_and_sample(
        &mut self,
        pointer: Pos2,
        image_rect: Rect,
        sampler: &PixelSampler,
        markers: &mut MarkerModel,
        events: &mut Vec<StageEvent>,
    ) {
        let norm = geometry::normalized_from_screen(pointer, image_rect);
        if let Some(index) = markers.drag_move(MOUSE_POINTER, norm)
            && let Some([r, g, b]) = sampler.sample_at(norm.x, norm.y)
        {
            events.push(StageEvent::ColorSampled {
                index,
                hex: crate::color::rgb_to_hex(r, g, b),
            });
        }
    }

    fn draw_markers(
        &self,
        ui: &mut egui::Ui,
        image_rect: Rect,
        markers: &MarkerModel,
        session: &PaletteSession,
    ) {
        let painter = ui.painter();
        for (index, norm) in markers.positions().iter().enumerate() {
            let center = geometry::screen_from_normalized(*norm, image_rect);
            let fill = session
                .color(index)
                .and_then(crate::color::hex_to_rgb)
                .map(|[r, g, b]| Color32::from_rgb(r, g, b))
                .unwrap_or(Color32::BLACK);

            let dragging = markers.dragging() == Some(index);
            let active = markers.active() == Some(index);
            let radius = if dragging {
                MARKER_RADIUS + 3.0
            } else {
                MARKER_RADIUS
            };

            painter.circle_filled(center, radius + 2.0, Color32::from_black_alpha(60));
            painter.circle_filled(center, radius, fill);
            let ring = if active {
                Stroke::new(2.5, Color32::WHITE)
            } else {
                Stroke::new(1.5, Color32::from_white_alpha(180))
            };
            painter.circle_stroke(center, radius, ring);
        }
    }

    /// Magnified preview beside the active marker. Hidden whenever there is
    /// no active marker or no raster to read from.
    fn draw_loupe(
        &mut self,
        ui: &mut egui::Ui,
        stage_rect: Rect,
        image_rect: Rect,
        sampler: &PixelSampler,
        markers: &MarkerModel,
        session: &PaletteSession,
    ) {
        let Some(active) = markers.active() else {
            return;
        };
        let Some(norm) = markers.position(active) else {
            return;
        };
        let Some(patch) = loupe::magnified_patch(sampler, norm.x, norm.y) else {
            return;
        };

        let color_image =
            egui::ColorImage::from_rgb([loupe::CANVAS_PX, loupe::CANVAS_PX], &patch);
        match &mut self.loupe_texture {
            Some(texture) => texture.set(color_image, TextureOptions::NEAREST),
            None => {
                self.loupe_texture =
                    Some(ui.ctx()
                        .load_texture("loupe", color_image, TextureOptions::NEAREST));
            }
        }

        let marker_screen = geometry::screen_from_normalized(norm, image_rect);
        let (loupe_w, loupe_h) = loupe::loupe_size();
        let (left, top) = loupe::reposition(
            stage_rect.width(),
            stage_rect.height(),
            marker_screen.x - stage_rect.left(),
            marker_screen.y - stage_rect.top(),
            loupe_w,
            loupe_h,
        );
        let loupe_rect = Rect::from_min_size(
            Pos2::new(stage_rect.left() + left, stage_rect.top() + top),
            Vec2::new(loupe_w, loupe_h),
        );

        let painter = ui.painter();
        painter.rect_filled(loupe_rect, 4.0, Color32::from_black_alpha(220));
        painter.rect_stroke(loupe_rect, 4.0, Stroke::new(1.0, Color32::from_white_alpha(70)));

        let canvas_rect = Rect::from_min_size(
            loupe_rect.min + Vec2::splat(4.0),
            Vec2::splat(loupe::CANVAS_PX as f32),
        );
        if let Some(texture) = &self.loupe_texture {
            painter.image(
                texture.id(),
                canvas_rect,
                Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        // Crosshair over the preview center, sized to the stage tier.
        let (half, width) = loupe::crosshair_for_stage(stage_rect.width());
        let center = canvas_rect.center();
        let stroke = Stroke::new(width, Color32::from_white_alpha(230));
        painter.line_segment(
            [Pos2::new(center.x - half, center.y), Pos2::new(center.x + half, center.y)],
            stroke,
        );
        painter.line_segment(
            [Pos2::new(center.x, center.y - half), Pos2::new(center.x, center.y + half)],
            stroke,
        );

        let hex = session.color(active).unwrap_or("#000000");
        painter.text(
            Pos2::new(canvas_rect.center().x, canvas_rect.bottom() + 4.0),
            Align2::CENTER_TOP,
            hex,
            FontId::monospace(12.0),
            Color32::WHITE,
        );
    }
}

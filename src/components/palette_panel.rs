//! The palette side panel: one row per color with a copyable swatch, a
//! color-picker button and an editable hex field.
//!
//! Hex edits go through a per-row draft buffer so half-typed values never
//! reach the session; a draft commits when it parses and reverts when focus
//! leaves it invalid.

use eframe::egui;
use egui::{Color32, Sense, Stroke, TextEdit, Vec2};

use crate::color::{hex_to_rgb, normalize_hex, rgb_to_hex};

/// Something a palette row did that the app must react to.
pub enum PaletteEvent {
    /// The color at `index` changed to canonical `hex` (picker or valid
    /// hex edit).
    ColorEdited { index: usize, hex: String },
    /// The swatch at `index` was clicked; copy its hex to the clipboard.
    CopyHex(usize),
    /// The marker for `index` should become the inspected one.
    RowSelected(usize),
    /// A hex draft lost focus while unparseable and was reverted.
    InvalidHex(usize),
}

#[derive(Default)]
pub struct PalettePanel {
    drafts: Vec<String>,
}

impl PalettePanel {
    /// Render the rows for `colors`. `active` highlights the row whose
    /// marker is currently inspected.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        colors: &[String],
        active: Option<usize>,
    ) -> Vec<PaletteEvent> {
        let mut events = Vec::new();
        self.sync_drafts(colors);

        for index in 0..colors.len() {
            ui.horizontal(|ui| {
                self.show_row(ui, index, &colors[index], active == Some(index), &mut events);
            });
            ui.add_space(2.0);
        }

        events
    }

    /// Rebuild drafts whenever the palette changed under us (new image,
    /// generation, drag resample) so the fields show the current colors.
    fn sync_drafts(&mut self, colors: &[String]) {
        if self.drafts.len() != colors.len() {
            self.drafts = colors.to_vec();
            return;
        }
        for (draft, color) in self.drafts.iter_mut().zip(colors) {
            // Leave a draft alone only while it is mid-edit toward the same
            // canonical value; external changes win otherwise.
            if normalize_hex(draft).as_deref() != Some(color.as_str()) {
                *draft = color.clone();
            }
        }
    }

    fn show_row(
        &mut self,
        ui: &mut egui::Ui,
        index: usize,
        color: &str,
        active: bool,
        events: &mut Vec<PaletteEvent>,
    ) {
        let mut rgb = hex_to_rgb(color).unwrap_or([0, 0, 0]);

        // Swatch: click to copy the hex value.
        let (swatch_rect, swatch) = ui.allocate_exact_size(Vec2::splat(26.0), Sense::click());
        ui.painter().rect_filled(
            swatch_rect,
            3.0,
            Color32::from_rgb(rgb[0], rgb[1], rgb[2]),
        );
        let ring = if active {
            Stroke::new(2.0, ui.visuals().strong_text_color())
        } else {
            Stroke::new(1.0, ui.visuals().weak_text_color())
        };
        ui.painter().rect_stroke(swatch_rect, 3.0, ring);
        if swatch.clicked() {
            events.push(PaletteEvent::CopyHex(index));
        }
        swatch.on_hover_text("Copy hex");

        // Native-style picker.
        if ui.color_edit_button_srgb(&mut rgb).changed() {
            let hex = rgb_to_hex(rgb[0], rgb[1], rgb[2]);
            self.drafts[index] = hex.clone();
            events.push(PaletteEvent::ColorEdited { index, hex });
        }

        // Hex field: commits on every keystroke that parses, reverts on
        // blur otherwise.
        let field = ui.add(
            TextEdit::singleline(&mut self.drafts[index])
                .desired_width(72.0)
                .font(egui::TextStyle::Monospace),
        );
        if field.changed() {
            let upper = self.drafts[index].to_uppercase();
            self.drafts[index] = upper;
            if let Some(hex) = normalize_hex(&self.drafts[index])
                && hex != color
            {
                events.push(PaletteEvent::ColorEdited { index, hex });
            }
        }
        if field.lost_focus() && normalize_hex(&self.drafts[index]).is_none() {
            self.drafts[index] = color.to_string();
            events.push(PaletteEvent::InvalidHex(index));
        }
        if field.gained_focus() {
            events.push(PaletteEvent::RowSelected(index));
        }
    }
}

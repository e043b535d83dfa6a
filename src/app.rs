// ============================================================================
// PalettaApp — top-level application state and the eframe update loop
// ============================================================================
//
// Owns the session (palette + persistence), the pixel sampler, the marker
// model and the generator settings. The components under `components/` render
// from this state and report back through event enums; all mutation happens
// here so the data flow stays one-directional per frame.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use eframe::egui;
use image::RgbImage;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::components::palette_panel::{PaletteEvent, PalettePanel};
use crate::components::stage::{StageEvent, StagePanel};
use crate::io;
use crate::markers::MarkerModel;
use crate::ops::{extract, harmony};
use crate::sampler::{PixelSampler, SamplerConfig};
use crate::session::{self, PaletteSession};
use crate::{log_err, log_info};

const TOAST_LIFETIME: Duration = Duration::from_millis(2000);
const MIN_COLORS: usize = 1;
const MAX_COLORS: usize = 20;

struct Toast {
    text: String,
    error: bool,
    created: Instant,
}

pub struct PalettaApp {
    session: PaletteSession,
    sampler: PixelSampler,
    markers: MarkerModel,

    image: Option<RgbImage>,
    /// Bumped on every successful load so the stage re-uploads its texture.
    image_generation: u64,

    stage: StagePanel,
    palette_panel: PalettePanel,

    extract_count: usize,
    generate_count: usize,
    scheme: harmony::Scheme,
    rng: StdRng,

    toasts: Vec<Toast>,
}

impl PalettaApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut app = Self {
            session: PaletteSession::default(),
            sampler: PixelSampler::new(SamplerConfig::default()),
            markers: MarkerModel::default(),
            image: None,
            image_generation: 0,
            stage: StagePanel::default(),
            palette_panel: PalettePanel::default(),
            extract_count: 5,
            generate_count: 5,
            scheme: harmony::Scheme::Free,
            rng: StdRng::from_entropy(),
            toasts: Vec::new(),
        };
        app.restore_previous_session();
        app
    }

    /// Bring back the last image and palette, if both still make sense. The
    /// stored palette wins over a fresh extraction; markers are re-placed by
    /// color match against the restored raster.
    fn restore_previous_session(&mut self) {
        let Some(saved) = session::load_saved_session() else {
            return;
        };
        if let Some(path) = &saved.image_path
            && let Ok(img) = io::load_image_sync(path)
        {
            self.sampler.rebuild(&img);
            self.image = Some(img);
            self.image_generation += 1;
            self.session.image_path = Some(path.clone());
            log_info!("Restored image from {}", path.display());
        }
        if !saved.colors.is_empty() {
            self.session.replace(&saved.colors);
            self.markers
                .reset_for_palette(&self.session.rgb_colors(), &self.sampler, true);
        }
    }

    fn toast(&mut self, text: impl Into<String>) {
        self.toasts.push(Toast {
            text: text.into(),
            error: false,
            created: Instant::now(),
        });
    }

    fn toast_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        log_err!("{}", text);
        self.toasts.push(Toast {
            text,
            error: true,
            created: Instant::now(),
        });
    }

    // ---- actions ------------------------------------------------------------

    fn open_image_dialog(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "webp", "bmp"])
            .pick_file();
        if let Some(path) = picked {
            self.load_image(path);
        }
    }

    /// Load an image, rebuild the sampler and extract a fresh palette.
    fn load_image(&mut self, path: PathBuf) {
        let img = match io::load_image_sync(&path) {
            Ok(img) => img,
            Err(e) => {
                self.toast_error(e);
                return;
            }
        };

        if !self.sampler.rebuild(&img) {
            self.toast_error("Image has no pixels");
            return;
        }
        self.image = Some(img);
        self.image_generation += 1;
        self.session.set_image_path(Some(path.clone()));
        log_info!("Loaded {}", path.display());

        self.extract_palette();
    }

    fn extract_palette(&mut self) {
        let Some(image) = &self.image else {
            self.toast_error("Load an image first");
            return;
        };
        match extract::extract_colors(image, self.extract_count) {
            Ok(colors) => self.display_palette(colors, true),
            Err(e) => self.toast_error(e),
        }
    }

    fn generate_palette(&mut self) {
        let count = harmony::effective_count(self.scheme, self.generate_count);
        let colors = harmony::generate(self.scheme, count, &mut self.rng);
        self.display_palette(colors, true);
    }

    /// Install a new palette and re-place every marker (match-or-grid).
    fn display_palette(&mut self, colors: Vec<String>, force_markers: bool) {
        self.session.replace(&colors);
        self.markers
            .reset_for_palette(&self.session.rgb_colors(), &self.sampler, force_markers);
    }

    fn export_dialog(&mut self) {
        if self.session.is_empty() {
            self.toast_error("Nothing to export");
            return;
        }
        let picked = rfd::FileDialog::new()
            .set_file_name("palette.json")
            .add_filter("JSON", &["json"])
            .add_filter("Text", &["txt"])
            .save_file();
        if let Some(path) = picked {
            match io::export_palette(&path, self.session.colors()) {
                Ok(()) => self.toast(format!("Saved {}", path.display())),
                Err(e) => self.toast_error(e),
            }
        }
    }

    fn reset_all(&mut self) {
        self.session.reset();
        self.markers.clear();
        self.sampler.invalidate();
        self.image = None;
    }

    // ---- event handling -----------------------------------------------------

    fn apply_stage_events(&mut self, events: Vec<StageEvent>) {
        for event in events {
            match event {
                StageEvent::ColorSampled { index, hex } => {
                    // Drag resample: update the color only, markers stay put.
                    self.session.set_color(index, &hex);
                }
            }
        }
    }

    fn apply_palette_events(&mut self, ctx: &egui::Context, events: Vec<PaletteEvent>) {
        for event in events {
            match event {
                PaletteEvent::ColorEdited { index, hex } => {
                    if self.session.set_color(index, &hex) {
                        // Same palette size: markers keep their positions.
                        self.markers.reset_for_palette(
                            &self.session.rgb_colors(),
                            &self.sampler,
                            false,
                        );
                    }
                }
                PaletteEvent::CopyHex(index) => {
                    if let Some(hex) = self.session.color(index) {
                        let hex = hex.to_string();
                        ctx.output_mut(|o| o.copied_text = hex.clone());
                        self.toast(format!("Copied {}", hex));
                    }
                }
                PaletteEvent::RowSelected(index) => self.markers.set_active(index),
                PaletteEvent::InvalidHex(_) => {
                    self.toast_error("Not a valid hex color");
                }
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if let Some(path) = dropped.into_iter().next() {
            self.load_image(path);
        }
    }

    // ---- chrome -------------------------------------------------------------

    fn show_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            if ui.button("Open…").clicked() {
                self.open_image_dialog();
            }
            if ui
                .add_enabled(self.image.is_some(), egui::Button::new("Extract"))
                .clicked()
            {
                self.extract_palette();
            }
            ui.add(
                egui::DragValue::new(&mut self.extract_count)
                    .clamp_range(MIN_COLORS..=MAX_COLORS)
                    .prefix("colors: "),
            );

            ui.separator();

            egui::ComboBox::from_id_source("scheme")
                .selected_text(self.scheme.label())
                .show_ui(ui, |ui| {
                    for &scheme in harmony::Scheme::all() {
                        ui.selectable_value(&mut self.scheme, scheme, scheme.label());
                    }
                });
            match self.scheme.required_count() {
                Some(n) => {
                    ui.label(format!("{} colors", n));
                }
                None => {
                    ui.add(
                        egui::DragValue::new(&mut self.generate_count)
                            .clamp_range(MIN_COLORS..=MAX_COLORS)
                            .prefix("colors: "),
                    );
                }
            }
            if ui.button("Generate").clicked() {
                self.generate_palette();
            }

            ui.separator();

            if ui.button("Export…").clicked() {
                self.export_dialog();
            }
            if ui
                .add_enabled(!self.session.is_empty(), egui::Button::new("Copy all"))
                .clicked()
            {
                let all = self.session.colors().join("\n");
                ui.output_mut(|o| o.copied_text = all);
                self.toast(format!("Copied {} colors", self.session.len()));
            }
            if ui.button("Reset").clicked() {
                self.reset_all();
            }
        });
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        self.toasts.retain(|t| t.created.elapsed() < TOAST_LIFETIME);
        if self.toasts.is_empty() {
            return;
        }
        ctx.request_repaint_after(Duration::from_millis(100));

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::Vec2::new(-12.0, -12.0))
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    let color = if toast.error {
                        egui::Color32::from_rgb(200, 80, 80)
                    } else {
                        egui::Color32::from_rgb(70, 70, 75)
                    };
                    egui::Frame::none()
                        .fill(color)
                        .rounding(4.0)
                        .inner_margin(egui::Margin::symmetric(10.0, 6.0))
                        .show(ui, |ui| {
                            ui.colored_label(egui::Color32::WHITE, &toast.text);
                        });
                    ui.add_space(4.0);
                }
            });
    }
}

impl eframe::App for PalettaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.show_toolbar(ui);
            ui.add_space(4.0);
        });

        egui::SidePanel::right("palette")
            .resizable(false)
            .default_width(190.0)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.heading("Palette");
                ui.add_space(6.0);
                if self.session.is_empty() {
                    ui.weak("Extract or generate a palette.");
                } else {
                    let events =
                        self.palette_panel
                            .show(ui, self.session.colors(), self.markers.active());
                    self.apply_palette_events(ctx, events);
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let events = self.stage.show(
                ui,
                self.image.as_ref(),
                self.image_generation,
                &self.sampler,
                &mut self.markers,
                &self.session,
            );
            self.apply_stage_events(events);
        });

        self.show_toasts(ctx);
    }
}

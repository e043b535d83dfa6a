//! Image loading and palette export.
//!
//! Errors are plain strings surfaced as toasts (GUI) or stderr lines (CLI);
//! nothing here panics on bad input.

use std::fs;
use std::path::Path;

use image::RgbImage;

/// Maximum accepted image file size (matches the original upload limit).
pub const MAX_IMAGE_BYTES: u64 = 16 * 1024 * 1024;

/// Load an image file into an RGB buffer, enforcing the size cap.
pub fn load_image_sync(path: &Path) -> Result<RgbImage, String> {
    let meta = fs::metadata(path).map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    if meta.len() > MAX_IMAGE_BYTES {
        return Err(format!(
            "File too large ({} MB); the limit is {} MB",
            meta.len() / (1024 * 1024),
            MAX_IMAGE_BYTES / (1024 * 1024)
        ));
    }

    let img = image::open(path).map_err(|e| format!("Cannot decode {}: {}", path.display(), e))?;
    Ok(img.into_rgb8())
}

/// Export format for a palette file, inferred from the output extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Text,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Text,
        }
    }
}

/// Render the palette in the given format: a JSON array of hex strings, or
/// one hex color per line.
pub fn render_palette(colors: &[String], format: ExportFormat) -> String {
    match format {
        ExportFormat::Json => {
            serde_json::to_string_pretty(colors).unwrap_or_else(|_| "[]".to_string())
        }
        ExportFormat::Text => {
            let mut out = colors.join("\n");
            out.push('\n');
            out
        }
    }
}

/// Write the palette to `path`, format chosen by extension.
pub fn export_palette(path: &Path, colors: &[String]) -> Result<(), String> {
    let body = render_palette(colors, ExportFormat::from_path(path));
    fs::write(path, body).map_err(|e| format!("Cannot write {}: {}", path.display(), e))
}

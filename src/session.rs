//! Palette session state and its on-disk persistence.
//!
//! The session owns the palette itself: an ordered list of canonical hex
//! strings, where order is meaningful (index N ties a color to marker N and
//! to its editable row). Every mutation goes through [`PaletteSession`], which
//! normalizes input and mirrors the result to a JSON file in the data
//! directory so the last image + palette can be restored on the next launch.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color;
use crate::logger;

const SESSION_FILE: &str = "session.json";

/// What survives a restart: the last image path and the palette colors.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SavedSession {
    pub image_path: Option<PathBuf>,
    pub colors: Vec<String>,
}

/// The live palette. Colors are always canonical `#RRGGBB` uppercase; any
/// raw value is normalized on the way in and rejected if invalid.
#[derive(Default)]
pub struct PaletteSession {
    colors: Vec<String>,
    pub image_path: Option<PathBuf>,
}

impl PaletteSession {
    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color(&self, index: usize) -> Option<&str> {
        self.colors.get(index).map(String::as_str)
    }

    /// Palette as RGB triples for the sampler's match search. Colors are
    /// canonical by construction, so parse failures cannot occur here.
    pub fn rgb_colors(&self) -> Vec<[u8; 3]> {
        self.colors
            .iter()
            .filter_map(|c| color::hex_to_rgb(c))
            .collect()
    }

    /// Replace the whole palette. Unparseable entries collapse to black,
    /// matching how a palette of unknown origin is displayed rather than
    /// refused.
    pub fn replace(&mut self, raw_colors: &[String]) {
        self.colors = raw_colors
            .iter()
            .map(|c| color::normalize_hex(c).unwrap_or_else(|| "#000000".to_string()))
            .collect();
        self.persist();
    }

    /// Set one color from raw user input. Returns `false` (without mutating
    /// anything) when the value does not normalize or the index is stale.
    pub fn set_color(&mut self, index: usize, raw: &str) -> bool {
        let Some(normalized) = color::normalize_hex(raw) else {
            return false;
        };
        let Some(slot) = self.colors.get_mut(index) else {
            return false;
        };
        *slot = normalized;
        self.persist();
        true
    }

    /// Reset for a new upload: forget the palette, the image and the stored
    /// session file.
    pub fn reset(&mut self) {
        self.colors.clear();
        self.image_path = None;
        remove_saved_session();
    }

    pub fn set_image_path(&mut self, path: Option<PathBuf>) {
        self.image_path = path;
        self.persist();
    }

    /// Mirror the current state to disk. Failures are logged and otherwise
    /// ignored — persistence is a convenience, not a contract.
    fn persist(&self) {
        let saved = SavedSession {
            image_path: self.image_path.clone(),
            colors: self.colors.clone(),
        };
        if let Err(e) = save_session_to(&logger::app_data_dir().join(SESSION_FILE), &saved) {
            crate::log_warn!("Failed to persist session: {}", e);
        }
    }
}

/// Load the previous session, if one was stored and still parses.
pub fn load_saved_session() -> Option<SavedSession> {
    load_session_from(&logger::app_data_dir().join(SESSION_FILE))
}

fn remove_saved_session() {
    let _ = fs::remove_file(logger::app_data_dir().join(SESSION_FILE));
}

fn save_session_to(path: &Path, session: &SavedSession) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let json = serde_json::to_string_pretty(session).map_err(|e| e.to_string())?;
    fs::write(path, json).map_err(|e| e.to_string())
}

fn load_session_from(path: &Path) -> Option<SavedSession> {
    let data = fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

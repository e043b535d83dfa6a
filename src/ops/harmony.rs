//! Random palette generation based on color-harmony schemes.
//!
//! Each scheme anchors a set of hues relative to a random base hue, then
//! fills the requested count by cycling anchors with saturation/lightness
//! variation layers. Generated colors are de-duplicated with a bounded retry.
//! The RNG is injected so tests stay deterministic.

use std::collections::HashSet;

use rand::Rng;

use crate::color::{hsl_to_hex, normalize_hue, rgb_to_hex};

/// A color-harmony scheme. Triad and tetrad only make sense at their exact
/// anchor counts; everything else works for any palette size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    Free,
    Monochromatic,
    Complementary,
    Analogous,
    AnalogComplementary,
    SplitComplementary,
    Triad,
    Tetrad,
}

impl Scheme {
    pub fn all() -> &'static [Scheme] {
        &[
            Scheme::Free,
            Scheme::Monochromatic,
            Scheme::Complementary,
            Scheme::Analogous,
            Scheme::AnalogComplementary,
            Scheme::SplitComplementary,
            Scheme::Triad,
            Scheme::Tetrad,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scheme::Free => "Free",
            Scheme::Monochromatic => "Monochromatic",
            Scheme::Complementary => "Complementary",
            Scheme::Analogous => "Analogous",
            Scheme::AnalogComplementary => "Analog-complementary",
            Scheme::SplitComplementary => "Split-complementary",
            Scheme::Triad => "Triad",
            Scheme::Tetrad => "Tetrad",
        }
    }

    /// Exact color count a scheme requires, if constrained.
    pub fn required_count(&self) -> Option<usize> {
        match self {
            Scheme::Triad => Some(3),
            Scheme::Tetrad => Some(4),
            _ => None,
        }
    }

    pub fn allows_count(&self, count: usize) -> bool {
        self.required_count().map_or(true, |n| n == count)
    }

    /// Anchor hues relative to `base_hue`, before normalization.
    fn anchors(&self, base_hue: f32) -> Vec<f32> {
        match self {
            Scheme::Complementary => vec![base_hue, base_hue + 180.0],
            Scheme::Analogous => vec![base_hue - 30.0, base_hue, base_hue + 30.0],
            Scheme::AnalogComplementary => {
                vec![base_hue - 30.0, base_hue, base_hue + 30.0, base_hue + 180.0]
            }
            Scheme::SplitComplementary => vec![base_hue, base_hue + 150.0, base_hue + 210.0],
            Scheme::Triad => vec![base_hue, base_hue + 120.0, base_hue + 240.0],
            Scheme::Tetrad => {
                vec![base_hue, base_hue + 90.0, base_hue + 180.0, base_hue + 270.0]
            }
            Scheme::Free | Scheme::Monochromatic => vec![base_hue],
        }
    }

    /// Hue jitter applied around each anchor. Tight for triad/tetrad so the
    /// scheme's structure stays legible.
    fn hue_jitter(&self) -> i32 {
        match self {
            Scheme::Analogous | Scheme::AnalogComplementary => 6,
            Scheme::Triad | Scheme::Tetrad => 2,
            _ => 4,
        }
    }
}

/// Snap a requested palette size to one `scheme` supports. Triad/tetrad only
/// work at their exact anchor counts; everything else passes through.
pub fn effective_count(scheme: Scheme, requested: usize) -> usize {
    if scheme.allows_count(requested) {
        requested
    } else {
        scheme.required_count().unwrap_or(requested)
    }
}

/// Generate `count` canonical hex colors for `scheme`.
pub fn generate(scheme: Scheme, count: usize, rng: &mut impl Rng) -> Vec<String> {
    if count == 0 {
        return Vec::new();
    }
    match scheme {
        Scheme::Free => generate_free(count, rng),
        Scheme::Monochromatic => {
            let base_hue = rng.gen_range(0..360) as f32;
            generate_monochromatic(count, base_hue, rng)
        }
        _ => {
            let base_hue = rng.gen_range(0..360) as f32;
            let anchors: Vec<f32> = scheme
                .anchors(base_hue)
                .into_iter()
                .map(normalize_hue)
                .collect();
            generate_anchored(count, &anchors, scheme, rng)
        }
    }
}

fn generate_free(count: usize, rng: &mut impl Rng) -> Vec<String> {
    let mut colors = Vec::with_capacity(count);
    let mut used = HashSet::new();
    for _ in 0..count {
        let candidate = rgb_to_hex(rng.r#gen(), rng.r#gen(), rng.r#gen());
        let color = ensure_unique(candidate, &used, |_| {
            rgb_to_hex(rng.r#gen::<u8>(), rng.r#gen::<u8>(), rng.r#gen::<u8>())
        });
        used.insert(color.clone());
        colors.push(color);
    }
    colors
}

fn generate_monochromatic(count: usize, base_hue: f32, rng: &mut impl Rng) -> Vec<String> {
    let mut colors = Vec::with_capacity(count);
    let mut used = HashSet::new();

    let saturation_base = rng.gen_range(45..=75) as f32;
    let lightness_from = rng.gen_range(24..=36) as f32;
    let lightness_to = rng.gen_range(68..=82) as f32;

    for i in 0..count {
        let position = if count > 1 {
            i as f32 / (count - 1) as f32
        } else {
            0.5
        };
        let saturation = (saturation_base
            + ((position * std::f32::consts::PI).sin() * 12.0).round()
            + rng.gen_range(-6..=6) as f32)
            .clamp(25.0, 90.0);
        let lightness = ((lightness_from + position * (lightness_to - lightness_from)).round()
            + rng.gen_range(-4..=4) as f32)
            .clamp(14.0, 90.0);
        let hue = normalize_hue(base_hue + rng.gen_range(-2..=2) as f32);

        let jitter_s = rng.gen_range(-8..=8) as f32;
        let color = ensure_unique(hsl_to_hex(hue, saturation, lightness), &used, |attempt| {
            hsl_to_hex(
                hue + (attempt as f32 + 1.0) * 4.0,
                (saturation + jitter_s).clamp(20.0, 92.0),
                (lightness + if attempt % 2 == 0 { 6.0 } else { -6.0 }).clamp(12.0, 92.0),
            )
        });

        used.insert(color.clone());
        colors.push(color);
    }

    colors
}

fn generate_anchored(
    count: usize,
    anchors: &[f32],
    scheme: Scheme,
    rng: &mut impl Rng,
) -> Vec<String> {
    let mut colors = Vec::with_capacity(count);
    let mut used = HashSet::new();
    let jitter = scheme.hue_jitter();

    for i in 0..count {
        let anchor_index = i % anchors.len();
        let variation_layer = (i / anchors.len()) as f32;

        let hue = normalize_hue(anchors[anchor_index] + rng.gen_range(-jitter..=jitter) as f32);
        let saturation = (rng.gen_range(58..=85) as f32 - variation_layer * 4.0
            + rng.gen_range(-3..=3) as f32)
            .clamp(30.0, 92.0);
        let direction = if (anchor_index + variation_layer as usize) % 2 == 0 {
            1.0
        } else {
            -1.0
        };
        let lightness = (rng.gen_range(42..=62) as f32 + direction * variation_layer * 8.0
            + rng.gen_range(-4..=4) as f32)
            .clamp(18.0, 86.0);

        let jitter_s = rng.gen_range(-6..=6) as f32;
        let color = ensure_unique(hsl_to_hex(hue, saturation, lightness), &used, |attempt| {
            hsl_to_hex(
                hue + (attempt as f32 + 1.0) * 3.0,
                (saturation + jitter_s).clamp(25.0, 95.0),
                (lightness + if attempt % 2 == 0 { 7.0 } else { -7.0 }).clamp(14.0, 90.0),
            )
        });

        used.insert(color.clone());
        colors.push(color);
    }

    colors
}

/// Keep a candidate unless it collides with an already-used color; retry a
/// bounded number of alternatives, keeping the last one either way.
fn ensure_unique(
    candidate: String,
    used: &HashSet<String>,
    mut fallback: impl FnMut(usize) -> String,
) -> String {
    if !used.contains(&candidate) {
        return candidate;
    }
    let mut alternative = candidate;
    for attempt in 0..10 {
        alternative = fallback(attempt);
        if !used.contains(&alternative) {
            return alternative;
        }
    }
    alternative
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::hex_to_rgb;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn every_scheme_returns_requested_count_of_valid_colors() {
        for &scheme in Scheme::all() {
            let count = scheme.required_count().unwrap_or(5);
            let colors = generate(scheme, count, &mut rng());
            assert_eq!(colors.len(), count, "{scheme:?}");
            for c in &colors {
                assert!(hex_to_rgb(c).is_some(), "{scheme:?} produced {c}");
                assert_eq!(c, &c.to_uppercase());
            }
        }
    }

    #[test]
    fn zero_count_yields_empty_palette() {
        assert!(generate(Scheme::Free, 0, &mut rng()).is_empty());
    }

    #[test]
    fn count_constraints() {
        assert!(Scheme::Triad.allows_count(3));
        assert!(!Scheme::Triad.allows_count(5));
        assert!(Scheme::Tetrad.allows_count(4));
        assert!(!Scheme::Tetrad.allows_count(3));
        assert!(Scheme::Free.allows_count(9));
    }

    #[test]
    fn incompatible_counts_snap_to_scheme_requirement() {
        assert_eq!(effective_count(Scheme::Triad, 7), 3);
        assert_eq!(effective_count(Scheme::Triad, 3), 3);
        assert_eq!(effective_count(Scheme::Tetrad, 2), 4);
        assert_eq!(effective_count(Scheme::Analogous, 7), 7);
    }

    #[test]
    fn free_palette_avoids_immediate_duplicates() {
        let colors = generate(Scheme::Free, 8, &mut rng());
        let unique: HashSet<_> = colors.iter().collect();
        assert_eq!(unique.len(), colors.len());
    }

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let a = generate(Scheme::Analogous, 6, &mut rng());
        let b = generate(Scheme::Analogous, 6, &mut rng());
        assert_eq!(a, b);
    }
}

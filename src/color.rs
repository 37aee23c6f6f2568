use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Region;

pub type Rgb = [u8; 3];

const DEFAULT_COLOR: Rgb = [128, 128, 128];

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            [
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            ]
        })
        .collect()
}

pub fn to_hex(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

// ---------------------------------------------------------------------------
// Region → colour
// ---------------------------------------------------------------------------

/// One colour per known region, independent of the current selection so a
/// region keeps its colour across charts and re-runs.
#[derive(Debug, Clone)]
pub struct RegionColors {
    mapping: BTreeMap<Region, Rgb>,
}

impl Default for RegionColors {
    fn default() -> Self {
        let mapping = Region::ALL
            .into_iter()
            .zip(generate_palette(Region::ALL.len()))
            .collect();
        RegionColors { mapping }
    }
}

impl RegionColors {
    pub fn color_for(&self, region: Region) -> Rgb {
        self.mapping.get(&region).copied().unwrap_or(DEFAULT_COLOR)
    }
}

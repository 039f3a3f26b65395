use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{Dataset, RatingChoice};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: rating value → Color32
// ---------------------------------------------------------------------------

/// Maps the rating values present in a dataset to distinct colours, used for
/// the filter swatches and the ratings table. Unrated rows stay grey.
#[derive(Debug, Clone)]
pub struct RatingColors {
    mapping: BTreeMap<RatingChoice, Color32>,
    default_color: Color32,
}

impl RatingColors {
    /// Build a colour map from the dataset's rating index.
    pub fn new(dataset: &Dataset) -> Self {
        let palette = generate_palette(dataset.ratings.len());
        let mapping: BTreeMap<RatingChoice, Color32> = dataset
            .ratings
            .iter()
            .zip(palette)
            .map(|(r, c)| (RatingChoice::Rated(r.clone()), c))
            .collect();

        RatingColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a rating value.
    pub fn color_for(&self, choice: &RatingChoice) -> Color32 {
        self.mapping
            .get(choice)
            .copied()
            .unwrap_or(self.default_color)
    }
}

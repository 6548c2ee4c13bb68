//! Template matching against library samples and rendered glyphs.

use super::DigitRecognizer;
use crate::capture::{glyph, CellCandidate, CellImage};
use crate::consensus::DigitLibrary;

/// Nearest-template classifier.
///
/// A cell with almost no ink is empty. Otherwise each digit is scored by
/// mean absolute pixel difference against the library sample for that
/// digit when one of matching size exists, or against the rendered glyph.
/// The lowest score wins and becomes the candidate's quality.
#[derive(Debug, Clone)]
pub struct TemplateRecognizer {
    /// Ink coverage below which a cell is read as empty.
    pub blank_ink_ratio: f64,
    /// Scores above this are rejected as unreadable and read as empty.
    pub max_distance: f64,
}

impl Default for TemplateRecognizer {
    fn default() -> Self {
        Self {
            blank_ink_ratio: 0.02,
            max_distance: 0.35,
        }
    }
}

impl TemplateRecognizer {
    fn score(&self, image: &CellImage, digit: u8, library: &DigitLibrary) -> Option<f64> {
        match library.get(digit) {
            Some(sample) if sample.image().same_format(image) => {
                image.mean_abs_diff(sample.image())
            }
            _ => image.mean_abs_diff(&glyph::render_digit(image.width(), image.height(), digit)),
        }
    }
}

impl DigitRecognizer for TemplateRecognizer {
    fn recognize(&self, image: &CellImage, library: &DigitLibrary) -> CellCandidate {
        if !image.is_valid() || image.ink_ratio() < self.blank_ink_ratio {
            return CellCandidate::empty(image.clone());
        }

        let best = (1..=9u8)
            .filter_map(|d| self.score(image, d, library).map(|s| (d, s)))
            .fold(None, |best: Option<(u8, f64)>, (d, s)| match best {
                Some((_, bs)) if bs <= s => best,
                _ => Some((d, s)),
            });

        match best {
            Some((digit, score)) if score <= self.max_distance => {
                CellCandidate::new(digit, score, image.clone())
            }
            _ => CellCandidate::empty(image.clone()),
        }
    }
}

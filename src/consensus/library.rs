//! Best observed image per digit value.
//!
//! One sample is kept per digit, not per cell. After perspective
//! correction every printed occurrence of a digit looks alike, so the
//! cleanest one seen anywhere stands in for all of them when the
//! solution is drawn.

use crate::capture::{glyph, CandidateFrame, CellImage};

/// Side length of placeholder images when nothing has been observed yet.
pub const DEFAULT_SAMPLE_SIZE: u32 = 28;

/// A digit image and its recognition quality (lower is better).
#[derive(Debug, Clone)]
pub struct DigitSample {
    value: u8,
    quality: f64,
    image: CellImage,
}

impl DigitSample {
    /// # Panics
    ///
    /// Panics if `value` is not in 1..=9.
    pub fn new(value: u8, quality: f64, image: CellImage) -> Self {
        assert!((1..=9).contains(&value), "sample digit {value} out of range");
        Self {
            value,
            quality,
            image,
        }
    }

    #[inline]
    pub fn value(&self) -> u8 {
        self.value
    }

    #[inline]
    pub fn quality(&self) -> f64 {
        self.quality
    }

    #[inline]
    pub fn image(&self) -> &CellImage {
        &self.image
    }

    /// True for placeholders that were never observed.
    pub fn is_synthetic(&self) -> bool {
        self.quality.is_infinite()
    }
}

/// Digit value to best sample.
#[derive(Debug, Clone, Default)]
pub struct DigitLibrary {
    samples: [Option<DigitSample>; 9],
}

impl DigitLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored sample for `value`, if one has been observed.
    pub fn get(&self, value: u8) -> Option<&DigitSample> {
        match value {
            1..=9 => self.samples[usize::from(value - 1)].as_ref(),
            _ => None,
        }
    }

    /// Quality of the stored sample, or infinity when unknown.
    pub fn quality(&self, value: u8) -> f64 {
        self.get(value)
            .map(DigitSample::quality)
            .unwrap_or(f64::INFINITY)
    }

    /// Number of digit values with an observed sample.
    pub fn digits_known(&self) -> usize {
        self.samples.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.digits_known() == 0
    }

    /// Keeps every nonzero candidate that beats the stored quality.
    ///
    /// Returns the number of slots replaced.
    pub fn update(&mut self, frame: &CandidateFrame) -> usize {
        let mut replaced = 0;
        for cell in frame.cells() {
            let value = cell.value();
            if value == 0 || !(cell.quality() < self.quality(value)) {
                continue;
            }
            self.samples[usize::from(value - 1)] =
                Some(DigitSample::new(value, cell.quality(), cell.image().clone()));
            replaced += 1;
        }
        if replaced > 0 {
            tracing::trace!(replaced, known = self.digits_known(), "Digit library improved");
        }
        replaced
    }

    /// Forgets every sample; all qualities return to unknown.
    pub fn clear(&mut self) {
        self.samples = Default::default();
    }

    /// Placeholder for a digit that was deduced but never seen.
    ///
    /// Matches the size of any stored sample so the renderer can treat it
    /// like a real one.
    pub fn fallback_sample(&self, value: u8) -> DigitSample {
        let (width, height) = self
            .samples
            .iter()
            .flatten()
            .next()
            .map(|s| (s.image.width(), s.image.height()))
            .unwrap_or((DEFAULT_SAMPLE_SIZE, DEFAULT_SAMPLE_SIZE));
        DigitSample::new(
            value,
            f64::INFINITY,
            glyph::render_digit(width, height, value),
        )
    }

    /// Stored sample for `value`, or a rendered placeholder.
    pub fn sample_or_fallback(&self, value: u8) -> DigitSample {
        match self.get(value) {
            Some(sample) => sample.clone(),
            None => self.fallback_sample(value),
        }
    }

    /// One image per digit, index 0 holding digit 1.
    pub fn render_set(&self) -> Vec<DigitSample> {
        (1..=9).map(|v| self.sample_or_fallback(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CellCandidate, Geometry};
    use crate::solver::CELL_COUNT;

    fn frame_with(entries: &[(usize, u8, f64)], size: u32) -> CandidateFrame {
        let mut cells: Vec<CellCandidate> = (0..CELL_COUNT)
            .map(|_| CellCandidate::empty(CellImage::blank(size, size)))
            .collect();
        for &(pos, value, quality) in entries {
            cells[pos] = CellCandidate::new(value, quality, glyph::render_digit(size, size, value));
        }
        CandidateFrame::new(Geometry::square(0.0, 0.0, 100.0), cells)
    }

    #[test]
    fn test_starts_unknown() {
        let library = DigitLibrary::new();
        assert!(library.is_empty());
        assert!(library.quality(3).is_infinite());
        assert!(library.get(0).is_none());
    }

    #[test]
    fn test_keeps_best_quality_per_digit() {
        let mut library = DigitLibrary::new();
        assert_eq!(library.update(&frame_with(&[(0, 4, 0.3), (10, 4, 0.2)], 12)), 2);
        assert_eq!(library.quality(4), 0.2);

        // Worse and equal qualities do not replace.
        assert_eq!(library.update(&frame_with(&[(5, 4, 0.25), (6, 4, 0.2)], 12)), 0);
        assert_eq!(library.quality(4), 0.2);

        assert_eq!(library.update(&frame_with(&[(7, 4, 0.1)], 12)), 1);
        assert_eq!(library.quality(4), 0.1);
        assert_eq!(library.digits_known(), 1);
    }

    #[test]
    fn test_clear_resets_quality() {
        let mut library = DigitLibrary::new();
        library.update(&frame_with(&[(0, 1, 0.1), (1, 2, 0.1)], 12));
        assert_eq!(library.digits_known(), 2);

        library.clear();
        assert!(library.is_empty());
        assert!(library.quality(1).is_infinite());
    }

    #[test]
    fn test_fallback_matches_observed_size() {
        let mut library = DigitLibrary::new();
        let default = library.fallback_sample(7);
        assert_eq!(default.image().width(), DEFAULT_SAMPLE_SIZE);
        assert!(default.is_synthetic());

        library.update(&frame_with(&[(0, 2, 0.1)], 16));
        let fallback = library.fallback_sample(7);
        assert_eq!(fallback.value(), 7);
        assert!(fallback.image().same_format(library.get(2).unwrap().image()));
        assert!(fallback.image().ink_ratio() > 0.0);
    }

    #[test]
    fn test_render_set_mixes_real_and_fallback() {
        let mut library = DigitLibrary::new();
        library.update(&frame_with(&[(0, 3, 0.05)], 16));
        let set = library.render_set();
        assert_eq!(set.len(), 9);
        assert!(!set[2].is_synthetic());
        assert!(set.iter().enumerate().all(|(i, s)| s.value() as usize == i + 1));
        assert_eq!(set.iter().filter(|s| s.is_synthetic()).count(), 8);
    }
}

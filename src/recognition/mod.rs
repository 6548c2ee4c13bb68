//! Per-cell digit recognition and the per-frame fan-out.
//!
//! The 81 cells of a frame are independent, so they are recognized in
//! parallel against a shared, read-only view of the digit library. Results
//! are gathered back in position order before anything touches the
//! consensus state.

mod template;

pub use template::TemplateRecognizer;

use crate::capture::{CandidateFrame, CellCandidate, CellImage, Geometry};
use crate::consensus::DigitLibrary;
use rayon::prelude::*;

/// Classifies one cell image.
///
/// Implementations must be safe to call from several threads at once.
pub trait DigitRecognizer: Send + Sync {
    /// Returns the digit seen in `image` (0 for an empty cell) with a
    /// match quality, lower being better.
    fn recognize(&self, image: &CellImage, library: &DigitLibrary) -> CellCandidate;
}

/// Recognizes every cell of a frame in parallel.
///
/// # Panics
///
/// Panics unless exactly 81 images are supplied.
pub fn recognize_cells<R>(
    recognizer: &R,
    geometry: Geometry,
    images: &[CellImage],
    library: &DigitLibrary,
) -> CandidateFrame
where
    R: DigitRecognizer + ?Sized,
{
    let cells: Vec<CellCandidate> = images
        .par_iter()
        .map(|image| recognizer.recognize(image, library))
        .collect();

    tracing::trace!(
        digits = cells.iter().filter(|c| !c.is_empty()).count(),
        "Cells recognized"
    );
    CandidateFrame::new(geometry, cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::glyph;
    use crate::solver::CELL_COUNT;

    /// Reads the digit from the first pixel, for checking ordering.
    struct PixelOracle;

    impl DigitRecognizer for PixelOracle {
        fn recognize(&self, image: &CellImage, _library: &DigitLibrary) -> CellCandidate {
            CellCandidate::new(image.pixels()[0], 0.0, image.clone())
        }
    }

    #[test]
    fn test_fan_in_preserves_position_order() {
        let images: Vec<CellImage> = (0..CELL_COUNT)
            .map(|pos| CellImage::new(vec![(pos % 10) as u8], 1, 1))
            .collect();

        let frame = recognize_cells(
            &PixelOracle,
            Geometry::square(0.0, 0.0, 9.0),
            &images,
            &DigitLibrary::new(),
        );

        for (pos, value) in frame.values().iter().enumerate() {
            assert_eq!(*value as usize, pos % 10);
        }
    }

    #[test]
    fn test_dyn_recognizer() {
        let recognizer: Box<dyn DigitRecognizer> = Box::new(TemplateRecognizer::default());
        let images: Vec<CellImage> = (0..CELL_COUNT)
            .map(|pos| match pos % 3 {
                0 => CellImage::blank(20, 20),
                _ => glyph::render_digit(20, 20, (pos % 9) as u8 + 1),
            })
            .collect();

        let frame = recognize_cells(
            recognizer.as_ref(),
            Geometry::square(0.0, 0.0, 180.0),
            &images,
            &DigitLibrary::new(),
        );

        for (pos, value) in frame.values().iter().enumerate() {
            let expected = if pos % 3 == 0 { 0 } else { (pos % 9) as u8 + 1 };
            assert_eq!(*value, expected, "cell {pos}");
        }
    }

    #[test]
    #[should_panic(expected = "one candidate per cell")]
    fn test_wrong_cell_count() {
        recognize_cells(
            &PixelOracle,
            Geometry::square(0.0, 0.0, 9.0),
            &[CellImage::new(vec![1], 1, 1)],
            &DigitLibrary::new(),
        );
    }
}

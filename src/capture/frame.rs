//! Frame-level types exchanged with the image pipeline.

use crate::solver::CELL_COUNT;
use serde::{Deserialize, Serialize};

/// Grayscale pixel value used for paper.
pub const BACKGROUND: u8 = 255;

/// Grayscale pixel value used for ink.
pub const INK: u8 = 0;

/// A perspective-normalized cell bitmap.
///
/// The core treats the pixels as an opaque payload. It only compares
/// formats, measures ink coverage and hands images back to the renderer.
#[derive(Clone, PartialEq)]
pub struct CellImage {
    /// Row-major grayscale pixels.
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl CellImage {
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Creates an image filled with background.
    pub fn blank(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize);
        Self::new(vec![BACKGROUND; len], width, height)
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Validates that the pixel buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == self.pixel_count()
    }

    /// True if both images have the same dimensions.
    pub fn same_format(&self, other: &CellImage) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Fraction of pixels darker than mid-gray.
    pub fn ink_ratio(&self) -> f64 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        let dark = self.pixels.iter().filter(|&&p| p < 128).count();
        dark as f64 / self.pixels.len() as f64
    }

    /// Mean absolute pixel difference, normalized to 0.0..=1.0.
    ///
    /// Returns `None` when the formats differ.
    pub fn mean_abs_diff(&self, other: &CellImage) -> Option<f64> {
        if !self.same_format(other) || self.pixels.is_empty() {
            return None;
        }
        let total: u64 = self
            .pixels
            .iter()
            .zip(other.pixels.iter())
            .map(|(&a, &b)| u64::from(a.abs_diff(b)))
            .sum();
        Some(total as f64 / (self.pixels.len() as f64 * 255.0))
    }
}

impl std::fmt::Debug for CellImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

/// One recognized cell: digit value (0 = empty), match quality and the
/// source image. Lower quality is a better match.
#[derive(Debug, Clone)]
pub struct CellCandidate {
    value: u8,
    quality: f64,
    image: CellImage,
}

impl CellCandidate {
    /// Creates a candidate.
    ///
    /// # Panics
    ///
    /// Panics if `value` is greater than 9.
    pub fn new(value: u8, quality: f64, image: CellImage) -> Self {
        assert!(value <= 9, "candidate digit {value} out of range");
        Self {
            value,
            quality,
            image,
        }
    }

    /// Candidate for a cell recognized as empty.
    pub fn empty(image: CellImage) -> Self {
        Self::new(0, f64::INFINITY, image)
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

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value == 0
    }
}

/// Puzzle outline in frame pixel coordinates, clockwise from top-left.
///
/// Passed through untouched so the renderer can reproject the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub corners: [[f32; 2]; 4],
}

impl Geometry {
    /// Axis-aligned square outline.
    pub fn square(origin_x: f32, origin_y: f32, side: f32) -> Self {
        Self {
            corners: [
                [origin_x, origin_y],
                [origin_x + side, origin_y],
                [origin_x + side, origin_y + side],
                [origin_x, origin_y + side],
            ],
        }
    }
}

/// The 81 candidates recognized in one frame, row-major.
#[derive(Debug, Clone)]
pub struct CandidateFrame {
    geometry: Geometry,
    cells: Vec<CellCandidate>,
}

impl CandidateFrame {
    /// Creates a candidate set.
    ///
    /// # Panics
    ///
    /// Panics unless exactly 81 candidates are supplied.
    pub fn new(geometry: Geometry, cells: Vec<CellCandidate>) -> Self {
        assert_eq!(
            cells.len(),
            CELL_COUNT,
            "candidate frame must hold one candidate per cell"
        );
        Self { geometry, cells }
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[inline]
    pub fn cells(&self) -> &[CellCandidate] {
        &self.cells
    }

    /// Digit values only.
    pub fn values(&self) -> [u8; CELL_COUNT] {
        let mut values = [0u8; CELL_COUNT];
        for (slot, cell) in values.iter_mut().zip(self.cells.iter()) {
            *slot = cell.value();
        }
        values
    }
}

/// What the image pipeline found in a frame.
#[derive(Debug, Clone)]
pub enum FrameContent {
    /// No puzzle outline was detected.
    NoBoundary,
    /// Outline found and cells already recognized upstream.
    Candidates(CandidateFrame),
    /// Outline found; cell images still need recognition.
    Cells {
        geometry: Geometry,
        images: Vec<CellImage>,
    },
}

/// A single frame delivered by the image pipeline.
#[derive(Debug, Clone)]
pub struct PipelineFrame {
    content: FrameContent,
    /// Monotonic sequence number.
    sequence: u64,
}

impl PipelineFrame {
    pub fn new(content: FrameContent, sequence: u64) -> Self {
        Self {
            content,
            sequence,
        }
    }

    #[inline]
    pub fn content(&self) -> &FrameContent {
        &self.content
    }

    pub fn into_content(self) -> FrameContent {
        self.content
    }

    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// True when the pipeline located a puzzle.
    pub fn has_boundary(&self) -> bool {
        !matches!(self.content, FrameContent::NoBoundary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_cells() -> Vec<CellCandidate> {
        (0..CELL_COUNT)
            .map(|_| CellCandidate::empty(CellImage::blank(4, 4)))
            .collect()
    }

    #[test]
    fn test_cell_image_metrics() {
        let blank = CellImage::blank(4, 4);
        assert!(blank.is_valid());
        assert_eq!(blank.ink_ratio(), 0.0);

        let mut half = blank.clone();
        half.pixels_mut()[..8].fill(INK);
        assert!((half.ink_ratio() - 0.5).abs() < 1e-9);
        assert!((blank.mean_abs_diff(&half).unwrap() - 0.5).abs() < 1e-9);

        assert!(blank.mean_abs_diff(&CellImage::blank(5, 4)).is_none());
    }

    #[test]
    fn test_cell_image_invalid_size() {
        let image = CellImage::new(vec![0u8; 10], 4, 4);
        assert!(!image.is_valid());
    }

    #[test]
    fn test_candidate_frame_values() {
        let mut cells = empty_cells();
        cells[3] = CellCandidate::new(7, 0.1, CellImage::blank(4, 4));
        let frame = CandidateFrame::new(Geometry::square(0.0, 0.0, 90.0), cells);

        let values = frame.values();
        assert_eq!(values[3], 7);
        assert_eq!(values.iter().filter(|&&v| v != 0).count(), 1);
    }

    #[test]
    #[should_panic(expected = "one candidate per cell")]
    fn test_candidate_frame_wrong_length() {
        let mut cells = empty_cells();
        cells.pop();
        CandidateFrame::new(Geometry::square(0.0, 0.0, 90.0), cells);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_candidate_digit_out_of_range() {
        CellCandidate::new(10, 0.0, CellImage::blank(4, 4));
    }

    #[test]
    fn test_pipeline_frame_boundary() {
        let missing = PipelineFrame::new(FrameContent::NoBoundary, 1);
        assert!(!missing.has_boundary());
        assert_eq!(missing.sequence(), 1);

        let found = PipelineFrame::new(
            FrameContent::Candidates(CandidateFrame::new(
                Geometry::square(0.0, 0.0, 90.0),
                empty_cells(),
            )),
            2,
        );
        assert!(found.has_boundary());
    }
}

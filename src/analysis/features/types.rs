// Types module - Data structures for log-mel features
//
// This module defines the fixed-shape feature matrix handed to the
// confidence classifier, plus the shape constants it was trained with.

use serde::Serialize;

/// Number of mel bands in every feature matrix
pub const N_MELS: usize = 128;

/// Number of time frames the classifier expects by default
pub const DEFAULT_MAX_FRAMES: usize = 216;

/// Value written into padded time frames.
///
/// Padding happens after the max-referenced dB conversion, so 0.0 is the
/// level of the loudest bin in the clip, not silence. The trained classifier
/// saw exactly this padding; changing it requires retraining.
pub const PAD_VALUE: f32 = 0.0;

/// Log-mel feature matrix (mel bands × time frames, dB)
///
/// Stored row-major: all frames of mel band 0, then band 1, and so on.
/// The shape never depends on the length of the source waveform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMatrix {
    n_mels: usize,
    n_frames: usize,
    /// Analysis frames computed from the waveform before pad/truncate
    frames_computed: usize,
    data: Vec<f32>,
}

impl FeatureMatrix {
    pub(crate) fn new(n_mels: usize, n_frames: usize, frames_computed: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), n_mels * n_frames);
        Self {
            n_mels,
            n_frames,
            frames_computed,
            data,
        }
    }

    /// Shape as (mel bands, time frames)
    pub fn shape(&self) -> (usize, usize) {
        (self.n_mels, self.n_frames)
    }

    pub fn n_mels(&self) -> usize {
        self.n_mels
    }

    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// Number of real analysis frames the waveform produced.
    ///
    /// Greater than `n_frames()` when the clip was truncated, smaller when
    /// the remaining columns are padding.
    pub fn frames_computed(&self) -> usize {
        self.frames_computed
    }

    /// Value at (mel band, frame), `None` when out of range
    pub fn get(&self, mel: usize, frame: usize) -> Option<f32> {
        if mel >= self.n_mels || frame >= self.n_frames {
            return None;
        }
        Some(self.data[mel * self.n_frames + frame])
    }

    /// All frames of one mel band
    pub fn row(&self, mel: usize) -> Option<&[f32]> {
        if mel >= self.n_mels {
            return None;
        }
        let start = mel * self.n_frames;
        Some(&self.data[start..start + self.n_frames])
    }

    /// All mel bands of one frame
    pub fn column(&self, frame: usize) -> Option<Vec<f32>> {
        if frame >= self.n_frames {
            return None;
        }
        Some(
            (0..self.n_mels)
                .map(|mel| self.data[mel * self.n_frames + frame])
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Largest value in the matrix (`NEG_INFINITY` if empty)
    pub fn max_value(&self) -> f32 {
        self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Smallest value in the matrix (`INFINITY` if empty)
    pub fn min_value(&self) -> f32 {
        self.data.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// True when no value is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// True when every value equals the pad constant.
    ///
    /// Happens for empty or fully silent input. Still a valid classifier
    /// input, but predictions on it carry no information.
    pub fn is_degenerate(&self) -> bool {
        self.data.iter().all(|&v| v == PAD_VALUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_matrix() -> FeatureMatrix {
        // 2 mels x 3 frames: [0, 1, 2] / [3, 4, 5]
        FeatureMatrix::new(2, 3, 3, (0..6).map(|v| -(v as f32)).collect())
    }

    #[test]
    fn test_row_major_access() {
        let m = ramp_matrix();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.get(0, 2), Some(-2.0));
        assert_eq!(m.get(1, 0), Some(-3.0));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.get(0, 3), None);
        assert_eq!(m.row(1), Some(&[-3.0, -4.0, -5.0][..]));
        assert_eq!(m.column(1), Some(vec![-1.0, -4.0]));
    }

    #[test]
    fn test_extrema() {
        let m = ramp_matrix();
        assert_eq!(m.max_value(), 0.0);
        assert_eq!(m.min_value(), -5.0);
        assert!(m.is_finite());
        assert!(!m.is_degenerate());
    }

    #[test]
    fn test_degenerate_detection() {
        let m = FeatureMatrix::new(2, 2, 1, vec![PAD_VALUE; 4]);
        assert!(m.is_degenerate());
        assert_eq!(m.frames_computed(), 1);
    }
}

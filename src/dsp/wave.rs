//! StereoWave — the two-channel f64 buffer passed between synthesis stages.

use crate::error::{ResonanceError, Result};

/// Two equal-length channels of unnormalized samples.
///
/// Fields are private so the equal-length invariant can only be established
/// through [`StereoWave::new`] or [`StereoWave::silent`].
#[derive(Debug, Clone, PartialEq)]
pub struct StereoWave {
    left: Vec<f64>,
    right: Vec<f64>,
}

impl StereoWave {
    pub fn new(left: Vec<f64>, right: Vec<f64>) -> Result<Self> {
        if left.len() != right.len() {
            return Err(ResonanceError::LengthMismatch {
                expected: left.len(),
                left: left.len(),
                right: right.len(),
            });
        }
        Ok(StereoWave { left, right })
    }

    /// A wave of `len` zero samples per channel.
    pub fn silent(len: usize) -> Self {
        StereoWave {
            left: vec![0.0; len],
            right: vec![0.0; len],
        }
    }

    /// Number of frames (samples per channel).
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn left(&self) -> &[f64] {
        &self.left
    }

    pub fn right(&self) -> &[f64] {
        &self.right
    }

    pub fn into_channels(self) -> (Vec<f64>, Vec<f64>) {
        (self.left, self.right)
    }

    /// Per-frame sum of both channels, used for mono analysis.
    pub fn mono_sum(&self) -> Vec<f64> {
        self.left
            .iter()
            .zip(&self.right)
            .map(|(l, r)| l + r)
            .collect()
    }

    /// Largest absolute sample across both channels.
    pub fn peak(&self) -> f64 {
        self.left
            .iter()
            .chain(&self.right)
            .fold(0.0_f64, |m, &s| m.max(s.abs()))
    }

    /// Index of the first frame holding a NaN or infinite sample, if any.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.left
            .iter()
            .zip(&self.right)
            .position(|(l, r)| !l.is_finite() || !r.is_finite())
    }

    /// Frame-wise sum with another wave of the same length.
    pub fn add(&self, other: &StereoWave) -> Result<StereoWave> {
        self.require_len(other.len())?;
        Ok(StereoWave {
            left: self.left.iter().zip(&other.left).map(|(a, b)| a + b).collect(),
            right: self.right.iter().zip(&other.right).map(|(a, b)| a + b).collect(),
        })
    }

    /// Multiply both channels by a per-frame gain curve.
    pub fn modulate(&self, gains: &[f64]) -> Result<StereoWave> {
        self.require_len(gains.len())?;
        Ok(StereoWave {
            left: self.left.iter().zip(gains).map(|(s, g)| s * g).collect(),
            right: self.right.iter().zip(gains).map(|(s, g)| s * g).collect(),
        })
    }

    /// Multiply every sample by a constant.
    pub fn scale(&self, gain: f64) -> StereoWave {
        StereoWave {
            left: self.left.iter().map(|s| s * gain).collect(),
            right: self.right.iter().map(|s| s * gain).collect(),
        }
    }

    /// Error unless this wave holds exactly `expected` frames.
    pub fn require_len(&self, expected: usize) -> Result<()> {
        if self.left.len() != expected || self.right.len() != expected {
            return Err(ResonanceError::LengthMismatch {
                expected,
                left: self.left.len(),
                right: self.right.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unequal_channels() {
        let err = StereoWave::new(vec![0.0; 4], vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, ResonanceError::LengthMismatch { left: 4, right: 3, .. }));
    }

    #[test]
    fn peak_spans_both_channels() {
        let w = StereoWave::new(vec![0.1, -0.4], vec![0.7, -0.9]).unwrap();
        assert!((w.peak() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn add_and_modulate() {
        let a = StereoWave::new(vec![1.0, 2.0], vec![3.0, 4.0]).unwrap();
        let b = StereoWave::new(vec![0.5, 0.5], vec![-1.0, -1.0]).unwrap();
        let sum = a.add(&b).unwrap();
        assert_eq!(sum.left(), &[1.5, 2.5]);
        assert_eq!(sum.right(), &[2.0, 3.0]);

        let m = sum.modulate(&[2.0, 0.0]).unwrap();
        assert_eq!(m.left(), &[3.0, 0.0]);
        assert_eq!(m.right(), &[4.0, 0.0]);

        assert!(a.modulate(&[1.0]).is_err());
        assert!(a.add(&StereoWave::silent(3)).is_err());
    }

    #[test]
    fn finds_non_finite_frame() {
        let w = StereoWave::new(vec![0.0, 0.0, 0.0], vec![0.0, f64::NAN, 0.0]).unwrap();
        assert_eq!(w.first_non_finite(), Some(1));
        assert_eq!(StereoWave::silent(8).first_non_finite(), None);
    }
}

use std::fmt;

#[derive(Debug)]
pub enum ResonanceError {
    /// A parameter was outside its valid domain. Raised before any buffer is produced.
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    LengthMismatch {
        expected: usize,
        left: usize,
        right: usize,
    },
    NonFinite {
        index: usize,
    },
    UnknownPreset(String),
    Preset(serde_json::Error),
    Wav(hound::Error),
    Io(std::io::Error),
}

impl ResonanceError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        ResonanceError::InvalidParameter { name, value, reason }
    }
}

impl fmt::Display for ResonanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResonanceError::InvalidParameter { name, value, reason } => {
                write!(f, "Invalid {name} = {value}: {reason}")
            }
            ResonanceError::LengthMismatch { expected, left, right } => write!(
                f,
                "Channel length mismatch: expected {expected}, got left={left} right={right}"
            ),
            ResonanceError::NonFinite { index } => {
                write!(f, "Non-finite sample at frame {index}")
            }
            ResonanceError::UnknownPreset(name) => write!(f, "Unknown preset '{name}'"),
            ResonanceError::Preset(e) => write!(f, "Preset error: {e}"),
            ResonanceError::Wav(e) => write!(f, "WAV error: {e}"),
            ResonanceError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for ResonanceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResonanceError::Preset(e) => Some(e),
            ResonanceError::Wav(e) => Some(e),
            ResonanceError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ResonanceError {
    fn from(e: serde_json::Error) -> Self {
        ResonanceError::Preset(e)
    }
}

impl From<hound::Error> for ResonanceError {
    fn from(e: hound::Error) -> Self {
        ResonanceError::Wav(e)
    }
}

impl From<std::io::Error> for ResonanceError {
    fn from(e: std::io::Error) -> Self {
        ResonanceError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, ResonanceError>;

/// Reject non-finite values and values not strictly greater than zero.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(ResonanceError::invalid(name, value, "must be finite"));
    }
    if value <= 0.0 {
        return Err(ResonanceError::invalid(name, value, "must be > 0"));
    }
    Ok(value)
}

pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(ResonanceError::invalid(name, value, "must be finite"));
    }
    if value < 0.0 {
        return Err(ResonanceError::invalid(name, value, "must be >= 0"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero_and_nan() {
        assert!(require_positive("freq", 0.0).is_err());
        assert!(require_positive("freq", -1.0).is_err());
        assert!(require_positive("freq", f64::NAN).is_err());
        assert_eq!(require_positive("freq", 432.0).unwrap(), 432.0);
    }

    #[test]
    fn non_negative_accepts_zero() {
        assert_eq!(require_non_negative("level", 0.0).unwrap(), 0.0);
        assert!(require_non_negative("level", -0.001).is_err());
        assert!(require_non_negative("level", f64::INFINITY).is_err());
    }

    #[test]
    fn display_names_parameter() {
        let e = ResonanceError::invalid("soft_knee_floor", 1.5, "must be in (0, 1)");
        assert_eq!(format!("{e}"), "Invalid soft_knee_floor = 1.5: must be in (0, 1)");
    }
}

//! Validated configuration values
//!
//! Newtypes that can only hold values a compression pass can act on.

use std::cmp::Ordering;

/// Maximum acceptable compressed/original size ratio
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f64", into = "f64"))]
pub struct MinRatio(f64);

impl MinRatio {
    /// Default ratio
    pub const DEFAULT: f64 = 0.8;

    /// Create a new ratio with validation
    pub fn new(ratio: f64) -> Result<Self, String> {
        if !ratio.is_finite() {
            Err(format!("Minimum ratio {} must be a finite number", ratio))
        } else if ratio < 0.0 {
            Err(format!("Minimum ratio {} must not be negative", ratio))
        } else {
            Ok(Self(ratio))
        }
    }

    /// Get the ratio value
    pub fn get(self) -> f64 {
        self.0
    }

    /// Compute `compressed / original`
    pub fn ratio_of(compressed: usize, original: usize) -> f64 {
        compressed as f64 / original as f64
    }

    /// Check whether a compressed result is small enough to keep.
    ///
    /// Only a ratio strictly above the threshold is rejected. An empty
    /// original compressed to nothing yields NaN, which is accepted.
    pub fn accepts(self, compressed: usize, original: usize) -> bool {
        let ratio = Self::ratio_of(compressed, original);
        !matches!(ratio.partial_cmp(&self.0), Some(Ordering::Greater))
    }
}

impl Default for MinRatio {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<f64> for MinRatio {
    type Error = String;

    fn try_from(ratio: f64) -> Result<Self, Self::Error> {
        Self::new(ratio)
    }
}

impl From<MinRatio> for f64 {
    fn from(ratio: MinRatio) -> Self {
        ratio.0
    }
}

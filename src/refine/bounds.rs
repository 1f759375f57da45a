//! Value bounds of a refinement variable
//!
//! A variable enables each end of its range separately. The enabled ends are
//! collected into a [`Bounds`] that either clamps (hard boundary) or wraps
//! (periodic boundary) values handed back by an optimizer.

use serde::{Deserialize, Serialize};
use std::f64::{INFINITY, NEG_INFINITY};
use thiserror::Error;

/// Errors that can occur when working with bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: min ({min}) must be less than max ({max})")]
    InvalidBounds { min: f64, max: f64 },

    #[error("Infinite value is not allowed")]
    InfiniteValue,
}

/// How a variable treats values outside its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BoundaryMode {
    /// Values are clamped to the nearest end.
    #[default]
    Hard,
    /// Values wrap around the range.
    Periodic,
}

impl BoundaryMode {
    /// The mode encoded by a variable's `IBound` field.
    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            Self::Periodic
        } else {
            Self::Hard
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Hard => 0,
            Self::Periodic => 1,
        }
    }
}

/// Lower and upper limit of a value. Disabled ends are infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Serialize for Bounds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Bounds", 2)?;

        // infinite ends are written as null
        if self.min.is_infinite() && self.min.is_sign_negative() {
            state.serialize_field("min", &serde_json::Value::Null)?;
        } else {
            state.serialize_field("min", &self.min)?;
        }

        if self.max.is_infinite() && self.max.is_sign_positive() {
            state.serialize_field("max", &serde_json::Value::Null)?;
        } else {
            state.serialize_field("max", &self.max)?;
        }

        state.end()
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct BoundsHelper {
            #[serde(default)]
            min: Option<f64>,

            #[serde(default)]
            max: Option<f64>,
        }

        let helper = BoundsHelper::deserialize(deserializer)?;

        Ok(Bounds {
            min: helper.min.unwrap_or(NEG_INFINITY),
            max: helper.max.unwrap_or(INFINITY),
        })
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: NEG_INFINITY,
            max: INFINITY,
        }
    }
}

impl Bounds {
    /// Create bounds with both ends set
    ///
    /// # Arguments
    ///
    /// * `min` - Lowest allowed value
    /// * `max` - Highest allowed value
    ///
    /// # Returns
    ///
    /// The bounds if min <= max, or an error otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use rietveld_model::refine::Bounds;
    ///
    /// let bounds = Bounds::new(0.0, 10.0).unwrap();
    /// assert_eq!(bounds.clamp(12.0), 10.0);
    /// assert!(Bounds::new(1.0, 0.0).is_err());
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self, BoundsError> {
        if min > max {
            return Err(BoundsError::InvalidBounds { min, max });
        }

        Ok(Self { min, max })
    }

    /// Bounds from -∞ to ∞
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn min_only(min: f64) -> Self {
        Self { min, max: INFINITY }
    }

    pub fn max_only(max: f64) -> Self {
        Self {
            min: NEG_INFINITY,
            max,
        }
    }

    /// Bounds with only the enabled ends set.
    pub fn from_limits(min: Option<f64>, max: Option<f64>) -> Result<Self, BoundsError> {
        Self::new(min.unwrap_or(NEG_INFINITY), max.unwrap_or(INFINITY))
    }

    pub fn is_within_bounds(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Clamp a value into the bounds
    ///
    /// # Arguments
    ///
    /// * `value` - Value to clamp
    ///
    /// # Returns
    ///
    /// The nearest value within the bounds
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Wrap a value periodically into `[min, max)`
    ///
    /// Falls back to [`Bounds::clamp`] unless both ends are finite and the
    /// range is not empty.
    ///
    /// # Errors
    ///
    /// Returns [`BoundsError::InfiniteValue`] for an infinite or NaN value.
    ///
    /// # Examples
    ///
    /// ```
    /// use rietveld_model::refine::Bounds;
    ///
    /// let bounds = Bounds::new(0.0, 1.0).unwrap();
    /// assert!((bounds.wrap(1.25).unwrap() - 0.25).abs() < 1e-12);
    /// assert!((bounds.wrap(-0.25).unwrap() - 0.75).abs() < 1e-12);
    /// ```
    pub fn wrap(&self, value: f64) -> Result<f64, BoundsError> {
        if !value.is_finite() {
            return Err(BoundsError::InfiniteValue);
        }
        let width = self.max - self.min;
        if !self.is_finite() || width <= 0.0 {
            return Ok(self.clamp(value));
        }
        Ok(self.min + (value - self.min).rem_euclid(width))
    }

    /// Bring a value into the bounds using `mode`.
    pub fn apply(&self, mode: BoundaryMode, value: f64) -> Result<f64, BoundsError> {
        match mode {
            BoundaryMode::Hard => Ok(self.clamp(value)),
            BoundaryMode::Periodic => self.wrap(value),
        }
    }
}

//! # Filter Primitives
//!
//! ## Deadzone
//!
//! Values closer to the middle reference than the threshold are forced to the
//! middle reference. This suppresses jitter around a centered stick or servo.
//!
//! ## Exponential Moving Average
//!
//! `smoothed = requested * (1 - alpha) + previous * alpha`
//!
//! - `alpha = 0.0`: No smoothing (output follows input)
//! - `alpha = 0.85`: Responsive steering
//! - `alpha = 0.98`: Very soft throttle, noticeably more latency
//!
//! ## Linear Remap
//!
//! Maps a value from one domain onto another and clamps the result to the
//! target range. Swapping the target bounds inverts the direction, which is
//! how a servo mounted backwards is handled.
//!
//! ```
//! use rc_link::conditioning::filter::LinearMap;
//!
//! let map = LinearMap::new(0.0, 1023.0, 0.0, 180.0);
//! assert_eq!(map.apply(1023.0), 180.0);
//! assert_eq!(map.apply(5000.0), 180.0); // clamped, never extrapolated
//! ```

/// Returns true if `requested` lies strictly inside the deadzone around `middle`.
#[inline]
#[must_use]
pub fn in_deadzone(requested: f32, middle: f32, threshold: f32) -> bool {
    (requested - middle).abs() < threshold
}

/// Forces `requested` to `middle` when it lies inside the deadzone.
///
/// # Examples
///
/// ```
/// use rc_link::conditioning::filter::apply_deadzone;
///
/// assert_eq!(apply_deadzone(97.0, 90.0, 15.0), 90.0);
/// assert_eq!(apply_deadzone(120.0, 90.0, 15.0), 120.0);
/// ```
#[inline]
#[must_use]
pub fn apply_deadzone(requested: f32, middle: f32, threshold: f32) -> f32 {
    if in_deadzone(requested, middle, threshold) {
        middle
    } else {
        requested
    }
}

/// One exponential moving-average step.
#[inline]
#[must_use]
pub fn ema(requested: f32, previous: f32, alpha: f32) -> f32 {
    requested * (1.0 - alpha) + previous * alpha
}

/// Clamped linear mapping from a domain onto a range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMap {
    domain_min: f32,
    domain_max: f32,
    range_min: f32,
    range_max: f32,
}

impl LinearMap {
    #[must_use]
    pub fn new(domain_min: f32, domain_max: f32, range_min: f32, range_max: f32) -> Self {
        Self {
            domain_min,
            domain_max,
            range_min,
            range_max,
        }
    }

    /// Same domain, range bounds swapped.
    #[must_use]
    pub fn inverted(self) -> Self {
        Self {
            range_min: self.range_max,
            range_max: self.range_min,
            ..self
        }
    }

    /// Maps `value` onto the range, clamped to the range bounds.
    ///
    /// A degenerate domain (`domain_min == domain_max`) maps everything to
    /// `range_min`.
    #[must_use]
    pub fn apply(&self, value: f32) -> f32 {
        let span = self.domain_max - self.domain_min;
        if span == 0.0 {
            return self.range_min;
        }

        let mapped =
            self.range_min + (value - self.domain_min) * (self.range_max - self.range_min) / span;

        let (lo, hi) = if self.range_min <= self.range_max {
            (self.range_min, self.range_max)
        } else {
            (self.range_max, self.range_min)
        };
        mapped.clamp(lo, hi)
    }
}

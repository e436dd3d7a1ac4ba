//! Frame-rate parsing and interval arithmetic.
//!
//! A [`FrameRate`] is always a positive whole number. Requested rates arrive as
//! text from a prompt or command line, so [`FrameRate::from_str`] accepts only
//! a run of ASCII digits; anything else (signs, spaces, decimals, zero) is
//! rejected before any file is touched.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    num::NonZeroU32,
    str::FromStr,
};

use crate::error::ReframeError;

/// A validated, positive, integral frame rate in frames per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameRate(NonZeroU32);

impl FrameRate {
    /// Create a frame rate from an integer.
    ///
    /// # Errors
    ///
    /// Returns [`ReframeError::InvalidFrameRate`] when `frames_per_second` is zero.
    pub fn new(frames_per_second: u32) -> Result<Self, ReframeError> {
        NonZeroU32::new(frames_per_second)
            .map(Self)
            .ok_or_else(|| ReframeError::InvalidFrameRate(frames_per_second.to_string()))
    }

    /// The rate as a plain integer.
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Truncate a source's fractional rate (e.g. 29.97) to a requestable
    /// whole rate. Returns `None` when the truncated rate is zero or the input
    /// is not finite.
    pub fn from_source_rate(frames_per_second: f64) -> Option<Self> {
        if !frames_per_second.is_finite() || frames_per_second < 1.0 {
            return None;
        }
        let truncated = frames_per_second.trunc().min(u32::MAX as f64) as u32;
        NonZeroU32::new(truncated).map(Self)
    }
}

impl FromStr for FrameRate {
    type Err = ReframeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(ReframeError::InvalidFrameRate(text.to_string()));
        }
        let value: u32 = text
            .parse()
            .map_err(|_| ReframeError::InvalidFrameRate(text.to_string()))?;
        NonZeroU32::new(value)
            .map(Self)
            .ok_or_else(|| ReframeError::InvalidFrameRate(text.to_string()))
    }
}

impl Display for FrameRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl From<FrameRate> for u32 {
    fn from(rate: FrameRate) -> Self {
        rate.get()
    }
}

/// Compute the stride between kept source frames:
/// `floor(original_frame_rate / requested)`.
///
/// # Errors
///
/// Returns [`ReframeError::DegenerateFrameInterval`] when the stride would be
/// zero, i.e. the requested rate is above the source rate or the source rate
/// is unknown (zero, negative, or not finite).
pub fn frame_interval(original_frame_rate: f64, requested: FrameRate) -> Result<u64, ReframeError> {
    let degenerate = || ReframeError::DegenerateFrameInterval {
        original_frame_rate,
        requested_frame_rate: requested.get(),
    };

    if !original_frame_rate.is_finite() || original_frame_rate <= 0.0 {
        return Err(degenerate());
    }

    let interval = (original_frame_rate / f64::from(requested.get())).floor();
    if interval < 1.0 {
        return Err(degenerate());
    }
    Ok(interval as u64)
}

/// Number of frames an extraction is expected to write:
/// `floor(total_frame_count / frame_interval)`.
///
/// Used as the progress upper bound. A zero interval yields zero.
pub fn expected_output_count(total_frame_count: u64, frame_interval: u64) -> u64 {
    total_frame_count.checked_div(frame_interval).unwrap_or(0)
}

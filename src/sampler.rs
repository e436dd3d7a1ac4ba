//! Frame sampling for extraction.
//!
//! [`FrameSampler`] decides, one decoded frame at a time, whether the frame is
//! kept and which output ordinal it receives. Source frames are grouped into
//! runs of `frame_interval`; the first frame of each complete run is kept.
//! When the source reports its frame count, a trailing run shorter than the
//! interval is never a keep point, so the number of kept frames is exactly
//! `floor(total_frame_count / frame_interval)`.

use crate::rate::expected_output_count;

/// Keep/skip bookkeeping for one extraction run.
///
/// # Example
///
/// ```
/// use reframe::FrameSampler;
///
/// let mut sampler = FrameSampler::new(3, Some(7));
/// let kept: Vec<Option<u64>> = (0..7).map(|_| sampler.offer()).collect();
/// assert_eq!(kept, [Some(0), None, None, Some(1), None, None, None]);
/// assert_eq!(sampler.saved_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct FrameSampler {
    frame_interval: u64,
    limit: Option<u64>,
    source_index: u64,
    saved_index: u64,
}

impl FrameSampler {
    /// Create a sampler with the given stride.
    ///
    /// `total_frame_count` is the source's reported length; `None` or `Some(0)`
    /// means unknown, in which case every stride point is kept until the
    /// source runs dry. An interval of zero is clamped to one.
    pub fn new(frame_interval: u64, total_frame_count: Option<u64>) -> Self {
        let frame_interval = frame_interval.max(1);
        let limit = total_frame_count
            .filter(|&total| total > 0)
            .map(|total| expected_output_count(total, frame_interval));
        Self {
            frame_interval,
            limit,
            source_index: 0,
            saved_index: 0,
        }
    }

    /// Account for the next decoded source frame.
    ///
    /// Returns the output ordinal if the frame should be written.
    pub fn offer(&mut self) -> Option<u64> {
        let index = self.source_index;
        self.source_index += 1;

        if index % self.frame_interval != 0 {
            return None;
        }
        if self.limit.is_some_and(|limit| self.saved_index >= limit) {
            return None;
        }

        let ordinal = self.saved_index;
        self.saved_index += 1;
        Some(ordinal)
    }

    /// The stride in source frames.
    pub fn frame_interval(&self) -> u64 {
        self.frame_interval
    }

    /// Number of source frames offered so far.
    pub fn source_count(&self) -> u64 {
        self.source_index
    }

    /// Number of frames kept so far (also the next ordinal).
    pub fn saved_count(&self) -> u64 {
        self.saved_index
    }

    /// The expected number of kept frames, when the source length is known.
    pub fn expected_count(&self) -> Option<u64> {
        self.limit
    }

    /// `true` once every expected frame has been kept.
    ///
    /// Always `false` when the source length is unknown.
    pub fn is_complete(&self) -> bool {
        self.limit.is_some_and(|limit| self.saved_index >= limit)
    }
}

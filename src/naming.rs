//! Frame file naming and directory ordering.
//!
//! Extraction writes `frame_000000.jpg`, `frame_000001.jpg`, … together with a
//! `FRAME_RATE.txt` rate record. Assembly lists a directory, keeps the entries
//! whose names end in `.jpg`, and orders them. Because ordinals are zero-padded
//! to a fixed width, plain lexicographic order already matches numeric order
//! for anything extraction produced; [`FrameOrder::Numeric`] is available for
//! folders that came from elsewhere.

use std::{
    cmp::Ordering,
    fs,
    path::{Path, PathBuf},
};

use crate::{error::ReframeError, rate::FrameRate};

/// Prefix of every extracted frame file name.
pub const FRAME_FILE_PREFIX: &str = "frame_";

/// Extension (including the dot) of qualifying frame images.
pub const IMAGE_EXTENSION: &str = ".jpg";

/// Zero-padded width of the ordinal in a frame file name.
pub const ORDINAL_WIDTH: usize = 6;

/// Name of the rate record written beside extracted frames.
pub const RATE_RECORD_FILE_NAME: &str = "FRAME_RATE.txt";

/// How qualifying images are ordered for assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameOrder {
    /// Ordinary code-point comparison of file names.
    #[default]
    Lexicographic,
    /// Compare the trailing run of digits in each file stem numerically,
    /// falling back to lexicographic order for ties and unnumbered names.
    Numeric,
}

impl FrameOrder {
    fn compare(self, left: &str, right: &str) -> Ordering {
        match self {
            FrameOrder::Lexicographic => left.cmp(right),
            FrameOrder::Numeric => match (trailing_number(left), trailing_number(right)) {
                (Some(a), Some(b)) => a.cmp(&b).then_with(|| left.cmp(right)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => left.cmp(right),
            },
        }
    }
}

/// File name for the frame with the given output ordinal.
///
/// ```
/// assert_eq!(reframe::frame_file_name(42), "frame_000042.jpg");
/// ```
pub fn frame_file_name(ordinal: u64) -> String {
    format!("{FRAME_FILE_PREFIX}{ordinal:0width$}{IMAGE_EXTENSION}", width = ORDINAL_WIDTH)
}

/// Full path of the frame with the given ordinal inside `directory`.
pub fn frame_path(directory: &Path, ordinal: u64) -> PathBuf {
    directory.join(frame_file_name(ordinal))
}

/// Parse the ordinal back out of a name produced by [`frame_file_name`].
///
/// Returns `None` for names that do not follow the convention.
pub fn parse_ordinal(file_name: &str) -> Option<u64> {
    let digits = file_name
        .strip_prefix(FRAME_FILE_PREFIX)?
        .strip_suffix(IMAGE_EXTENSION)?;
    if digits.len() < ORDINAL_WIDTH || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Whether a directory entry name counts as a frame image.
pub fn is_qualifying_image(file_name: &str) -> bool {
    file_name.ends_with(IMAGE_EXTENSION)
}

fn trailing_number(file_name: &str) -> Option<u64> {
    let stem = file_name.strip_suffix(IMAGE_EXTENSION).unwrap_or(file_name);
    let digit_count = stem
        .bytes()
        .rev()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    if digit_count == 0 {
        return None;
    }
    stem[stem.len() - digit_count..].parse().ok()
}

/// Sort file names in place according to `order`.
pub fn sort_frame_names(names: &mut [String], order: FrameOrder) {
    names.sort_by(|left, right| order.compare(left, right));
}

/// List the qualifying images in `directory`, ordered for assembly.
///
/// Subdirectories and entries whose names are not valid UTF-8 are skipped.
///
/// # Errors
///
/// Returns [`ReframeError::IoError`] if the directory cannot be read.
pub fn list_frames(directory: &Path, order: FrameOrder) -> Result<Vec<PathBuf>, ReframeError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !is_qualifying_image(&name) {
            continue;
        }
        if entry.path().is_dir() {
            continue;
        }
        names.push(name);
    }

    sort_frame_names(&mut names, order);
    log::debug!(
        "Found {} frame image(s) in {}",
        names.len(),
        directory.display()
    );

    Ok(names.into_iter().map(|name| directory.join(name)).collect())
}

/// Write the rate record into `directory`, replacing any existing one.
///
/// The file holds the decimal rate and nothing else.
pub fn write_rate_record(directory: &Path, frame_rate: FrameRate) -> Result<PathBuf, ReframeError> {
    let path = directory.join(RATE_RECORD_FILE_NAME);
    fs::write(&path, frame_rate.to_string())?;
    Ok(path)
}

/// Read the rate record from `directory`.
///
/// Returns `Ok(None)` when no record exists. Surrounding whitespace is
/// tolerated so hand-edited records still parse.
///
/// # Errors
///
/// [`ReframeError::InvalidFrameRate`] if the record holds anything other than
/// a positive integer, or [`ReframeError::IoError`] if it cannot be read.
pub fn read_rate_record(directory: &Path) -> Result<Option<FrameRate>, ReframeError> {
    let path = directory.join(RATE_RECORD_FILE_NAME);
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path)?;
    text.trim().parse().map(Some)
}

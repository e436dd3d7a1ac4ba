//! Still-image encode and decode.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use image::{DynamicImage, codecs::jpeg::JpegEncoder};

use crate::error::ReframeError;

/// Encode `frame` as a baseline JPEG at `quality` (1–100) and write it to
/// `path`, replacing any existing file.
///
/// Alpha is dropped; JPEG has no alpha channel.
pub fn write_jpeg(frame: &DynamicImage, path: &Path, quality: u8) -> Result<(), ReframeError> {
    let rgb = frame.to_rgb8();
    let mut writer = BufWriter::new(File::create(path)?);
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
        encoder.encode_image(&rgb)?;
    }
    writer.flush()?;
    Ok(())
}

/// Decode the image at `path`. The format is inferred from the file contents.
pub fn read_image(path: &Path) -> Result<DynamicImage, ReframeError> {
    let image = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;
    Ok(image)
}

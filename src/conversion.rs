//! Pixel copies between FFmpeg frames and `image` buffers.
//!
//! FFmpeg rows may be padded past `width * bytes_per_pixel`; `image` buffers
//! are tightly packed. These helpers copy row by row when the strides differ.

use ffmpeg_next::{format::Pixel, frame::Video as VideoFrame};
use image::{DynamicImage, RgbImage};

use crate::error::ReframeError;

/// Copy pixel data from an FFmpeg video frame into a tightly-packed buffer.
///
/// `bytes_per_pixel` is 3 for RGB24.
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let expected_stride = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == expected_stride {
        data[..expected_stride * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(expected_stride * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + expected_stride]);
        }
        buffer
    }
}

/// Wrap an RGB24 FFmpeg frame as a [`DynamicImage`].
pub(crate) fn rgb_frame_to_image(
    rgb_frame: &VideoFrame,
    width: u32,
    height: u32,
) -> Result<DynamicImage, ReframeError> {
    let buffer = frame_to_buffer(rgb_frame, width, height, 3);
    let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        ReframeError::VideoDecodeError(
            "Failed to construct RGB image from decoded frame data".to_string(),
        )
    })?;
    Ok(DynamicImage::ImageRgb8(image))
}

/// Copy a packed RGB8 image into a freshly allocated RGB24 FFmpeg frame.
pub(crate) fn rgb_image_to_frame(rgb: &RgbImage) -> VideoFrame {
    let width = rgb.width();
    let height = rgb.height();
    let mut frame = VideoFrame::new(Pixel::RGB24, width, height);
    let stride = frame.stride(0);
    let row_len = (width as usize) * 3;
    let source = rgb.as_raw();
    let destination = frame.data_mut(0);

    for y in 0..height as usize {
        let src_start = y * row_len;
        let dst_start = y * stride;
        destination[dst_start..dst_start + row_len]
            .copy_from_slice(&source[src_start..src_start + row_len]);
    }
    frame
}

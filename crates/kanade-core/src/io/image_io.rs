use std::path::Path;

use image::{ImageBuffer, ImageFormat, Luma, Rgb};
use ndarray::{Array3, ArrayView3};

use crate::consts::COLOR_CHANNEL_COUNT;
use crate::error::{KanadeError, Result};

/// Load an image as a single-plane `(height, width, 1)` array in [0, 1].
pub fn load_image(path: &Path) -> Result<Array3<f32>> {
    let gray = image::open(path)?.to_luma16();
    let (w, h) = gray.dimensions();
    Ok(Array3::from_shape_fn((h as usize, w as usize, 1), |(y, x, _)| {
        gray.get_pixel(x as u32, y as u32).0[0] as f32 / 65535.0
    }))
}

/// Load an image as a `(height, width, 3)` RGB array in [0, 1].
pub fn load_color_image(path: &Path) -> Result<Array3<f32>> {
    let rgb = image::open(path)?.to_rgb16();
    let (w, h) = rgb.dimensions();
    Ok(Array3::from_shape_fn(
        (h as usize, w as usize, COLOR_CHANNEL_COUNT),
        |(y, x, c)| rgb.get_pixel(x as u32, y as u32).0[c] as f32 / 65535.0,
    ))
}

/// Save a mono or RGB frame as 16-bit TIFF.
pub fn save_tiff(frame: ArrayView3<f32>, path: &Path) -> Result<()> {
    let (h, w, channels) = frame.dim();
    let pixels: Vec<u16> = frame
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 65535.0).round() as u16)
        .collect();
    match channels {
        1 => ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
            .ok_or_else(|| size_error(frame.len()))?
            .save_with_format(path, ImageFormat::Tiff)?,
        COLOR_CHANNEL_COUNT => {
            ImageBuffer::<Rgb<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
                .ok_or_else(|| size_error(frame.len()))?
                .save_with_format(path, ImageFormat::Tiff)?
        }
        n => return Err(unsupported(n)),
    }
    Ok(())
}

/// Save a mono or RGB frame as 8-bit PNG.
pub fn save_png(frame: ArrayView3<f32>, path: &Path) -> Result<()> {
    let (h, w, channels) = frame.dim();
    let pixels: Vec<u8> = frame
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();
    match channels {
        1 => ImageBuffer::<Luma<u8>, Vec<u8>>::from_raw(w as u32, h as u32, pixels)
            .ok_or_else(|| size_error(frame.len()))?
            .save_with_format(path, ImageFormat::Png)?,
        COLOR_CHANNEL_COUNT => ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(w as u32, h as u32, pixels)
            .ok_or_else(|| size_error(frame.len()))?
            .save_with_format(path, ImageFormat::Png)?,
        n => return Err(unsupported(n)),
    }
    Ok(())
}

/// Save a frame, choosing the format from the file extension.
pub fn save_image(frame: ArrayView3<f32>, path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("png") => save_png(frame, path),
        _ => save_tiff(frame, path),
    }
}

fn size_error(samples: usize) -> KanadeError {
    KanadeError::BufferSize {
        expected: samples,
        actual: 0,
    }
}

fn unsupported(channels: usize) -> KanadeError {
    KanadeError::UnsupportedPixelFormat(format!("{channels}-channel image"))
}

#![allow(dead_code)]

use std::f32::consts::TAU;

use kanade_core::io::ser::SER_HEADER_SIZE;
use ndarray::Array3;

/// Build a SER file header for mono 8-bit frames.
///
/// Returns a `Vec<u8>` containing just the 178-byte header.
/// Append frame pixel data after calling this function.
pub fn build_ser_header(width: u32, height: u32, num_frames: usize) -> Vec<u8> {
    build_ser_header_full(width, height, 8, num_frames, 0)
}

/// Build a SER file header with configurable bit depth and color mode.
///
/// `color_id`: 0=MONO, 8..=19=BAYER, 100=RGB, 101=BGR
pub fn build_ser_header_full(
    width: u32,
    height: u32,
    bit_depth: u32,
    num_frames: usize,
    color_id: i32,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SER_HEADER_SIZE);

    // Magic (14 bytes)
    buf.extend_from_slice(b"LUCAM-RECORDER");
    // LuID (4 bytes)
    buf.extend_from_slice(&0i32.to_le_bytes());
    // ColorID (4 bytes)
    buf.extend_from_slice(&color_id.to_le_bytes());
    // LittleEndian = 0
    buf.extend_from_slice(&0i32.to_le_bytes());
    // Width
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    // Height
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    // PixelDepth
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    // FrameCount
    buf.extend_from_slice(&(num_frames as i32).to_le_bytes());
    // Observer, Instrument, Telescope (40 bytes each)
    buf.extend_from_slice(&[0u8; 120]);
    // DateTime, DateTimeUTC (8 bytes each)
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes());

    assert_eq!(buf.len(), SER_HEADER_SIZE);
    buf
}

/// Build a complete synthetic mono 8-bit SER file with the given frame data.
pub fn build_ser_with_frames(width: u32, height: u32, frames: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = build_ser_header(width, height, frames.len());
    for frame in frames {
        buf.extend_from_slice(frame);
    }
    buf
}

/// Write a SER buffer to a temporary file and return the temp file handle.
///
/// The file stays alive as long as the returned `NamedTempFile` is not dropped.
pub fn write_test_ser(data: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::NamedTempFile::new().expect("create temp file");
    f.write_all(data).expect("write SER data");
    f.flush().expect("flush");
    f
}

// ---------------------------------------------------------------------------
// Synthetic scenes
// ---------------------------------------------------------------------------

/// Smooth, non-periodic-looking texture in [0.1, 0.9] sampled at `(y, x)`.
pub fn texture(y: f32, x: f32) -> f32 {
    0.5 + 0.18 * (TAU * x / 23.0).sin()
        + 0.14 * (TAU * y / 29.0 + 0.7).sin()
        + 0.08 * (TAU * (x + y) / 17.0).sin() * (TAU * (x - y) / 41.0).cos()
}

/// Texture with energy in several directions, for per-pixel flow.
pub fn rich_texture(y: f32, x: f32) -> f32 {
    0.5 + 0.12 * (TAU * x / 12.0).sin()
        + 0.12 * (TAU * y / 14.0 + 0.3).sin()
        + 0.08 * (TAU * (x + y) / 19.0).sin()
        + 0.08 * (TAU * (x - 0.5 * y) / 30.0 + 1.1).cos()
}

/// Mono f32 frame of `scene` translated by `(sx, sy)`: `frame(p) = scene(p - s)`.
pub fn shifted_frame(
    scene: fn(f32, f32) -> f32,
    width: usize,
    height: usize,
    sx: f32,
    sy: f32,
) -> Array3<f32> {
    Array3::from_shape_fn((height, width, 1), |(y, x, _)| {
        scene(y as f32 - sy, x as f32 - sx)
    })
}

/// RGB f32 frame where each channel is a scaled copy of `scene`.
pub fn shifted_rgb_frame(
    scene: fn(f32, f32) -> f32,
    width: usize,
    height: usize,
    sx: f32,
    sy: f32,
) -> Array3<f32> {
    let gains = [0.6f32, 1.0, 0.8];
    Array3::from_shape_fn((height, width, 3), |(y, x, c)| {
        gains[c] * scene(y as f32 - sy, x as f32 - sx)
    })
}

/// Mono u8 frame of `scene` translated by `(sx, sy)`.
pub fn shifted_frame_u8(
    scene: fn(f32, f32) -> f32,
    width: usize,
    height: usize,
    sx: f32,
    sy: f32,
) -> Array3<u8> {
    shifted_frame(scene, width, height, sx, sy).mapv(|v| (v * 255.0).round() as u8)
}

/// Root-mean-square difference over the `inset`-trimmed interior of plane `c`.
pub fn interior_rms(a: &Array3<f32>, b: &Array3<f32>, inset: usize, c: usize) -> f32 {
    let (h, w, _) = a.dim();
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for y in inset..h - inset {
        for x in inset..w - inset {
            let d = (a[[y, x, c]] - b[[y, x, c]]) as f64;
            sum += d * d;
            count += 1;
        }
    }
    (sum / count as f64).sqrt() as f32
}

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::COLOR_CHANNEL_COUNT;

/// Storage type of a single sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleKind {
    U8,
    F32,
}

/// Pixel layout of an interleaved frame buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    MonoU8,
    RgbU8,
    MonoF32,
    RgbF32,
}

impl PixelFormat {
    pub fn from_parts(kind: SampleKind, components: usize) -> Option<Self> {
        match (kind, components) {
            (SampleKind::U8, 1) => Some(Self::MonoU8),
            (SampleKind::U8, COLOR_CHANNEL_COUNT) => Some(Self::RgbU8),
            (SampleKind::F32, 1) => Some(Self::MonoF32),
            (SampleKind::F32, COLOR_CHANNEL_COUNT) => Some(Self::RgbF32),
            _ => None,
        }
    }

    pub fn components(&self) -> usize {
        match self {
            Self::MonoU8 | Self::MonoF32 => 1,
            Self::RgbU8 | Self::RgbF32 => COLOR_CHANNEL_COUNT,
        }
    }

    pub fn sample_kind(&self) -> SampleKind {
        match self {
            Self::MonoU8 | Self::RgbU8 => SampleKind::U8,
            Self::MonoF32 | Self::RgbF32 => SampleKind::F32,
        }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        let per_sample = match self.sample_kind() {
            SampleKind::U8 => 1,
            SampleKind::F32 => 4,
        };
        per_sample * self.components()
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MonoU8 => write!(f, "Mono 8-bit"),
            Self::RgbU8 => write!(f, "RGB 8-bit"),
            Self::MonoF32 => write!(f, "Mono float"),
            Self::RgbF32 => write!(f, "RGB float"),
        }
    }
}

/// Dimensions and layout agreed at engine initialisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFormat {
    pub width: usize,
    pub height: usize,
    pub pixel_format: PixelFormat,
}

impl ImageFormat {
    pub fn new(width: usize, height: usize, pixel_format: PixelFormat) -> Self {
        Self {
            width,
            height,
            pixel_format,
        }
    }

    pub fn components(&self) -> usize {
        self.pixel_format.components()
    }

    /// Samples in one interleaved frame buffer.
    pub fn sample_count(&self) -> usize {
        self.width * self.height * self.components()
    }

    /// Shape of the `(height, width, components)` view over a frame buffer.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.components())
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.pixel_format)
    }
}

/// Estimated displacement of the current frame relative to the reference.
///
/// `current(p) ≈ reference(p - h)`.
#[derive(Clone, Debug, PartialEq)]
pub enum MotionEstimate {
    Global { hx: f32, hy: f32 },
    /// Per-pixel field at the cropped level-0 resolution.
    Dense { hx: Array2<f32>, hy: Array2<f32> },
}

impl MotionEstimate {
    pub fn zero_global() -> Self {
        Self::Global { hx: 0.0, hy: 0.0 }
    }

    /// Global vector, or the mean of a dense field.
    pub fn mean(&self) -> (f32, f32) {
        match self {
            Self::Global { hx, hy } => (*hx, *hy),
            Self::Dense { hx, hy } => (
                hx.mean().unwrap_or(0.0),
                hy.mean().unwrap_or(0.0),
            ),
        }
    }
}

impl Default for MotionEstimate {
    fn default() -> Self {
        Self::zero_global()
    }
}

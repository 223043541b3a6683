use num_traits::{Bounded, Zero};

use crate::consts::FIXED_POINT_BITS;
use crate::filters::GaussianKernel;
use crate::frame::SampleKind;

/// Sample types the filters and the engine operate on.
///
/// Byte samples accumulate exactly and round to nearest on the way back to
/// storage; float samples are stored as computed.
pub trait Sample: Copy + Zero + Bounded + PartialOrd + std::fmt::Debug + Send + Sync + 'static {
    const KIND: SampleKind;

    fn to_acc(self) -> f64;

    fn from_acc(value: f64) -> Self;

    fn to_f32(self) -> f32;

    fn from_f32(value: f32) -> Self;

    /// Intensity on the unit scale used by the pyramid.
    fn to_unit(self) -> f32;

    fn from_unit(value: f32) -> Self;

    /// Weighted sum of `kernel.width()` taps.
    fn convolve<I: Iterator<Item = Self>>(taps: I, kernel: &GaussianKernel) -> Self;
}

impl Sample for u8 {
    const KIND: SampleKind = SampleKind::U8;

    #[inline]
    fn to_acc(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_acc(value: f64) -> Self {
        value.round().clamp(0.0, 255.0) as u8
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        value.round().clamp(0.0, 255.0) as u8
    }

    #[inline]
    fn to_unit(self) -> f32 {
        self as f32 / 255.0
    }

    #[inline]
    fn from_unit(value: f32) -> Self {
        Self::from_f32(value * 255.0)
    }

    fn convolve<I: Iterator<Item = Self>>(taps: I, kernel: &GaussianKernel) -> Self {
        let acc: u32 = taps
            .zip(kernel.fixed_weights())
            .map(|(t, &w)| t as u32 * w)
            .sum();
        let rounded = (acc + (1 << (FIXED_POINT_BITS - 1))) >> FIXED_POINT_BITS;
        rounded.min(255) as u8
    }
}

impl Sample for f32 {
    const KIND: SampleKind = SampleKind::F32;

    #[inline]
    fn to_acc(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_acc(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        value
    }

    #[inline]
    fn to_unit(self) -> f32 {
        self
    }

    #[inline]
    fn from_unit(value: f32) -> Self {
        value
    }

    fn convolve<I: Iterator<Item = Self>>(taps: I, kernel: &GaussianKernel) -> Self {
        taps.zip(kernel.weights()).map(|(t, &w)| t * w).sum()
    }
}

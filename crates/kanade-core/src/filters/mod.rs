//! Separable two-pass filters on single planes and interleaved frames.
//!
//! Every filter runs a horizontal pass into an owned scratch plane and a
//! vertical pass from scratch into the destination. Each pass leaves the
//! first and last `kernel_width / 2` columns (rows) alone, so destination
//! samples outside `[half, dim - half)` on either axis keep whatever they
//! held before the call. A kernel wider than the plane leaves the
//! destination untouched.

pub mod box_filter;
pub mod gaussian;
pub mod integral;
pub mod morphology;

pub use box_filter::{BoxFilter, BoxFilterIntegral, BoxFilterRunningSum};
pub use gaussian::{GaussianDownsample, GaussianFilter, GaussianKernel};
pub use integral::IntegralImage;
pub use morphology::{Morphology, MorphologyOp};

use ndarray::{Array2, ArrayView3, ArrayViewMut3};

use crate::error::{KanadeError, Result};
use crate::sample::Sample;

/// Force a kernel width to be odd.
#[inline]
pub fn odd_width(width: usize) -> usize {
    width | 1
}

/// Force a kernel width to be even (and at least 2).
#[inline]
pub fn even_width(width: usize) -> usize {
    ((width >> 1) << 1).max(2)
}

pub(crate) fn check_shape(expected: (usize, usize), actual: (usize, usize)) -> Result<()> {
    if expected != actual {
        return Err(KanadeError::ShapeMismatch { expected, actual });
    }
    Ok(())
}

/// Resize a scratch plane when the incoming plane differs from the last one.
pub(crate) fn ensure_scratch<T: Sample>(scratch: &mut Array2<T>, dim: (usize, usize)) {
    if scratch.dim() != dim {
        *scratch = Array2::zeros(dim);
    }
}

/// Check that two interleaved frames share one shape and return it.
pub(crate) fn check_frames<T: Sample>(
    src: &ArrayView3<T>,
    dst: &ArrayViewMut3<T>,
) -> Result<(usize, usize, usize)> {
    let (h, w, c) = src.dim();
    let (dh, dw, dc) = dst.dim();
    check_shape((h, w), (dh, dw))?;
    if c != dc {
        return Err(KanadeError::BufferSize {
            expected: h * w * c,
            actual: dh * dw * dc,
        });
    }
    Ok((h, w, c))
}

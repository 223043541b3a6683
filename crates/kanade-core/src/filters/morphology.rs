use ndarray::{Array2, ArrayView2, ArrayView3, ArrayViewMut2, ArrayViewMut3, Axis};
use serde::{Deserialize, Serialize};

use super::{check_frames, check_shape, ensure_scratch, odd_width};
use crate::error::Result;
use crate::sample::Sample;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MorphologyOp {
    /// Minimum over the structuring element.
    Erode,
    /// Maximum over the structuring element.
    Dilate,
}

impl std::fmt::Display for MorphologyOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Erode => write!(f, "Erode"),
            Self::Dilate => write!(f, "Dilate"),
        }
    }
}

/// Grey-level erosion or dilation with a square structuring element,
/// applied as a row min/max followed by a column min/max.
#[derive(Clone, Debug)]
pub struct Morphology<T: Sample = f32> {
    op: MorphologyOp,
    kernel_width: usize,
    scratch: Array2<T>,
}

impl<T: Sample> Morphology<T> {
    pub fn new(op: MorphologyOp, kernel_width: usize) -> Self {
        Self {
            op,
            kernel_width: odd_width(kernel_width),
            scratch: Array2::zeros((0, 0)),
        }
    }

    pub fn op(&self) -> MorphologyOp {
        self.op
    }

    pub fn kernel_width(&self) -> usize {
        self.kernel_width
    }

    pub fn filter(&mut self, src: ArrayView2<T>, mut dst: ArrayViewMut2<T>) -> Result<()> {
        check_shape(src.dim(), dst.dim())?;
        let (h, w) = src.dim();
        let k = self.kernel_width;
        if k > w || k > h {
            return Ok(());
        }
        let half = k / 2;
        let op = self.op;
        ensure_scratch(&mut self.scratch, (h, w));

        for y in 0..h {
            for x in 0..=(w - k) {
                self.scratch[[y, x + half]] = extremum(op, (0..k).map(|i| src[[y, x + i]]));
            }
        }
        let scratch = &self.scratch;
        for y in 0..=(h - k) {
            for x in half..(w - half) {
                dst[[y + half, x]] = extremum(op, (0..k).map(|i| scratch[[y + i, x]]));
            }
        }
        Ok(())
    }

    pub fn filter_channels(&mut self, src: ArrayView3<T>, mut dst: ArrayViewMut3<T>) -> Result<()> {
        let (_, _, channels) = check_frames(&src, &dst)?;
        for c in 0..channels {
            self.filter(src.index_axis(Axis(2), c), dst.index_axis_mut(Axis(2), c))?;
        }
        Ok(())
    }
}

fn extremum<T: Sample>(op: MorphologyOp, values: impl Iterator<Item = T>) -> T {
    match op {
        MorphologyOp::Erode => values.fold(T::max_value(), |a, v| if v < a { v } else { a }),
        MorphologyOp::Dilate => values.fold(T::min_value(), |a, v| if v > a { v } else { a }),
    }
}

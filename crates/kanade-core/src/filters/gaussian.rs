use ndarray::{Array2, ArrayView2, ArrayView3, ArrayViewMut2, ArrayViewMut3, Axis};

use super::{check_frames, check_shape, ensure_scratch, even_width, odd_width};
use crate::consts::{FIXED_POINT_BITS, MIN_GAUSSIAN_SIGMA};
use crate::error::Result;
use crate::sample::Sample;

/// Normalised 1D Gaussian taps.
///
/// Tap `i` is sampled at `i + 0.5 - width / 2` with `sigma = radius / 2`,
/// so odd widths centre a tap on zero and even widths straddle it.
#[derive(Clone, Debug)]
pub struct GaussianKernel {
    radius: f32,
    weights: Vec<f32>,
    fixed: Vec<u32>,
}

impl GaussianKernel {
    pub fn new(width: usize, radius: f32) -> Self {
        let width = width.max(1);
        let centre = width as f32 * 0.5;
        let sigma = (radius * 0.5).max(MIN_GAUSSIAN_SIGMA);
        let s2 = 2.0 * sigma * sigma;

        let mut weights: Vec<f32> = (0..width)
            .map(|i| {
                let r = (i as f32 + 0.5) - centre;
                (-r * r / s2).exp()
            })
            .collect();
        let sum: f32 = weights.iter().sum();
        for w in &mut weights {
            *w /= sum;
        }

        let fixed = fixed_point_weights(&weights);
        Self {
            radius,
            weights,
            fixed,
        }
    }

    pub fn width(&self) -> usize {
        self.weights.len()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn standard_deviation(&self) -> f32 {
        (self.radius * 0.5).max(MIN_GAUSSIAN_SIGMA)
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Weights scaled to `1 << FIXED_POINT_BITS`, summing to exactly that.
    pub fn fixed_weights(&self) -> &[u32] {
        &self.fixed
    }
}

fn fixed_point_weights(weights: &[f32]) -> Vec<u32> {
    let one = 1i64 << FIXED_POINT_BITS;
    let mut fixed: Vec<i64> = weights
        .iter()
        .map(|&w| (w as f64 * one as f64).round() as i64)
        .collect();
    let residual = one - fixed.iter().sum::<i64>();
    let peak = (0..fixed.len()).max_by_key(|&i| fixed[i]).unwrap_or(0);
    fixed[peak] += residual;
    fixed.into_iter().map(|w| w.max(0) as u32).collect()
}

/// Separable Gaussian blur with an odd kernel width.
#[derive(Clone, Debug)]
pub struct GaussianFilter<T: Sample = f32> {
    kernel: GaussianKernel,
    scratch: Array2<T>,
}

impl<T: Sample> GaussianFilter<T> {
    pub fn new(kernel_width: usize, filter_radius: f32) -> Self {
        Self {
            kernel: GaussianKernel::new(odd_width(kernel_width), filter_radius),
            scratch: Array2::zeros((0, 0)),
        }
    }

    /// Filter with its scratch plane already sized for `height x width`.
    pub fn with_dims(width: usize, height: usize, kernel_width: usize, filter_radius: f32) -> Self {
        let mut filter = Self::new(kernel_width, filter_radius);
        filter.scratch = Array2::zeros((height, width));
        filter
    }

    pub fn kernel(&self) -> &GaussianKernel {
        &self.kernel
    }

    pub fn kernel_width(&self) -> usize {
        self.kernel.width()
    }

    pub fn standard_deviation(&self) -> f32 {
        self.kernel.standard_deviation()
    }

    pub fn filter(&mut self, src: ArrayView2<T>, mut dst: ArrayViewMut2<T>) -> Result<()> {
        check_shape(src.dim(), dst.dim())?;
        let (h, w) = src.dim();
        let k = self.kernel.width();
        if k > w || k > h {
            return Ok(());
        }
        let half = k / 2;
        ensure_scratch(&mut self.scratch, (h, w));

        for y in 0..h {
            for x in 0..=(w - k) {
                let v = T::convolve((0..k).map(|i| src[[y, x + i]]), &self.kernel);
                self.scratch[[y, x + half]] = v;
            }
        }

        let scratch = &self.scratch;
        for y in 0..=(h - k) {
            for x in half..(w - half) {
                dst[[y + half, x]] = T::convolve((0..k).map(|i| scratch[[y + i, x]]), &self.kernel);
            }
        }
        Ok(())
    }

    /// Filter every channel of an interleaved frame independently.
    pub fn filter_channels(&mut self, src: ArrayView3<T>, mut dst: ArrayViewMut3<T>) -> Result<()> {
        let (_, _, channels) = check_frames(&src, &dst)?;
        for c in 0..channels {
            self.filter(src.index_axis(Axis(2), c), dst.index_axis_mut(Axis(2), c))?;
        }
        Ok(())
    }
}

/// Gaussian filter fused with 2x decimation on both axes.
///
/// Output sample `i` is centred on source coordinate `2i + 0.5`. With an
/// even kernel of half width `half`, the written output region on each axis
/// is `[half / 2, dim_out - half / 2)` for even source dimensions.
#[derive(Clone, Debug)]
pub struct GaussianDownsample<T: Sample = f32> {
    kernel: GaussianKernel,
    scratch: Array2<T>,
}

impl<T: Sample> GaussianDownsample<T> {
    pub fn new(kernel_width: usize, filter_radius: f32) -> Self {
        Self {
            kernel: GaussianKernel::new(even_width(kernel_width), filter_radius),
            scratch: Array2::zeros((0, 0)),
        }
    }

    /// Downsampler with scratch sized for a `height x width` source.
    pub fn with_dims(width: usize, height: usize, kernel_width: usize, filter_radius: f32) -> Self {
        let mut filter = Self::new(kernel_width, filter_radius);
        filter.scratch = Array2::zeros((height, width / 2));
        filter
    }

    pub fn kernel(&self) -> &GaussianKernel {
        &self.kernel
    }

    pub fn kernel_width(&self) -> usize {
        self.kernel.width()
    }

    /// Output region `[lo, hi)` written along an axis of `src_len` samples.
    pub fn written_range(&self, src_len: usize) -> (usize, usize) {
        written_range(self.kernel.width(), src_len)
    }

    pub fn downsample(&mut self, src: ArrayView2<T>, mut dst: ArrayViewMut2<T>) -> Result<()> {
        let (h, w) = src.dim();
        let (hd, wd) = (h / 2, w / 2);
        check_shape((hd, wd), dst.dim())?;
        let k = self.kernel.width();
        if k > w || k > h {
            return Ok(());
        }
        let half = k / 2;
        let (x_lo, x_hi) = written_range(k, w);
        let (y_lo, y_hi) = written_range(k, h);
        ensure_scratch(&mut self.scratch, (h, wd));

        for y in 0..h {
            for xd in x_lo..x_hi {
                let start = 2 * xd + 1 - half;
                let v = T::convolve((0..k).map(|i| src[[y, start + i]]), &self.kernel);
                self.scratch[[y, xd]] = v;
            }
        }

        let scratch = &self.scratch;
        for yd in y_lo..y_hi {
            let start = 2 * yd + 1 - half;
            for xd in x_lo..x_hi {
                dst[[yd, xd]] =
                    T::convolve((0..k).map(|i| scratch[[start + i, xd]]), &self.kernel);
            }
        }
        Ok(())
    }

    pub fn downsample_channels(
        &mut self,
        src: ArrayView3<T>,
        mut dst: ArrayViewMut3<T>,
    ) -> Result<()> {
        let (_, _, channels) = src.dim();
        let (_, _, dst_channels) = dst.dim();
        if channels != dst_channels {
            return Err(crate::error::KanadeError::BufferSize {
                expected: channels,
                actual: dst_channels,
            });
        }
        for c in 0..channels {
            self.downsample(src.index_axis(Axis(2), c), dst.index_axis_mut(Axis(2), c))?;
        }
        Ok(())
    }
}

fn written_range(kernel_width: usize, src_len: usize) -> (usize, usize) {
    let half = kernel_width / 2;
    let out_len = src_len / 2;
    if kernel_width > src_len {
        return (0, 0);
    }
    let lo = half / 2;
    // Last output index whose taps end inside the source.
    let last = (src_len as isize - half as isize - 1).div_euclid(2);
    let hi = ((last + 1).max(0) as usize).min(out_len);
    (lo, hi.max(lo))
}

use ndarray::{Array2, ArrayView2, ArrayView3, ArrayViewMut2, ArrayViewMut3, Axis};

use super::{check_frames, check_shape, ensure_scratch, odd_width, IntegralImage};
use crate::error::Result;
use crate::sample::Sample;

/// Unweighted mean over `kernel_width` samples per axis, summed directly.
#[derive(Clone, Debug)]
pub struct BoxFilter<T: Sample = f32> {
    kernel_width: usize,
    scratch: Array2<T>,
}

impl<T: Sample> BoxFilter<T> {
    pub fn new(kernel_width: usize) -> Self {
        Self {
            kernel_width: odd_width(kernel_width),
            scratch: Array2::zeros((0, 0)),
        }
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
        let norm = k as f64;
        ensure_scratch(&mut self.scratch, (h, w));

        for y in 0..h {
            for x in 0..=(w - k) {
                let sum: f64 = (0..k).map(|i| src[[y, x + i]].to_acc()).sum();
                self.scratch[[y, x + half]] = T::from_acc(sum / norm);
            }
        }
        for y in 0..=(h - k) {
            for x in half..(w - half) {
                let sum: f64 = (0..k).map(|i| self.scratch[[y + i, x]].to_acc()).sum();
                dst[[y + half, x]] = T::from_acc(sum / norm);
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

/// Box filter reading window sums from an integral image in O(1) per sample.
///
/// Writes the same region as [`BoxFilter`]; integral-image lookups left of or
/// above the source read as zero.
#[derive(Clone, Debug)]
pub struct BoxFilterIntegral<T: Sample = f32> {
    kernel_width: usize,
    integral: IntegralImage,
    _sample: std::marker::PhantomData<T>,
}

impl<T: Sample> BoxFilterIntegral<T> {
    pub fn new(kernel_width: usize) -> Self {
        Self {
            kernel_width: odd_width(kernel_width),
            integral: IntegralImage::new(),
            _sample: std::marker::PhantomData,
        }
    }

    pub fn kernel_width(&self) -> usize {
        self.kernel_width
    }

    pub fn integral(&self) -> &IntegralImage {
        &self.integral
    }

    /// Filter `src` into `dst` and return the mean of the whole source.
    ///
    /// With `recalc == false` the integral image from the previous call is
    /// reused, which is only meaningful when `src` has not changed.
    pub fn filter(
        &mut self,
        src: ArrayView2<T>,
        mut dst: ArrayViewMut2<T>,
        recalc: bool,
    ) -> Result<f64> {
        check_shape(src.dim(), dst.dim())?;
        let (h, w) = src.dim();
        if recalc || self.integral.dim() != (h, w) {
            self.integral.compute(src);
        }
        let mean = self.integral.mean();

        let k = self.kernel_width;
        if k > w || k > h {
            return Ok(mean);
        }
        let half = k / 2;
        let norm = (k * k) as f64;

        for y in half..(h - half) {
            for x in half..(w - half) {
                let sum = self.integral.rect_sum(y - half, x - half, y + half, x + half);
                dst[[y, x]] = T::from_acc(sum / norm);
            }
        }
        Ok(mean)
    }

    /// Filter each channel; returns the per-channel source means.
    pub fn filter_channels(
        &mut self,
        src: ArrayView3<T>,
        mut dst: ArrayViewMut3<T>,
    ) -> Result<Vec<f64>> {
        let (_, _, channels) = check_frames(&src, &dst)?;
        (0..channels)
            .map(|c| {
                self.filter(
                    src.index_axis(Axis(2), c),
                    dst.index_axis_mut(Axis(2), c),
                    true,
                )
            })
            .collect()
    }
}

/// Box filter keeping a sliding sum and a ring of the last `kernel_width`
/// samples, so each output costs one add and one subtract.
#[derive(Clone, Debug)]
pub struct BoxFilterRunningSum<T: Sample = f32> {
    kernel_width: usize,
    ring: Vec<f64>,
    scratch: Array2<T>,
}

impl<T: Sample> BoxFilterRunningSum<T> {
    pub fn new(kernel_width: usize) -> Self {
        let kernel_width = odd_width(kernel_width);
        Self {
            kernel_width,
            ring: vec![0.0; kernel_width],
            scratch: Array2::zeros((0, 0)),
        }
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
        let norm = k as f64;
        ensure_scratch(&mut self.scratch, (h, w));

        for y in 0..h {
            let row = src.row(y);
            let mut acc = 0.0f64;
            for i in 0..k {
                let v = row[i].to_acc();
                self.ring[i] = v;
                acc += v;
            }
            self.scratch[[y, half]] = T::from_acc(acc / norm);
            for x in k..w {
                let v = row[x].to_acc();
                let slot = x % k;
                acc += v - self.ring[slot];
                self.ring[slot] = v;
                self.scratch[[y, x - half]] = T::from_acc(acc / norm);
            }
        }

        for x in half..(w - half) {
            let mut acc = 0.0f64;
            for i in 0..k {
                let v = self.scratch[[i, x]].to_acc();
                self.ring[i] = v;
                acc += v;
            }
            dst[[half, x]] = T::from_acc(acc / norm);
            for y in k..h {
                let v = self.scratch[[y, x]].to_acc();
                let slot = y % k;
                acc += v - self.ring[slot];
                self.ring[slot] = v;
                dst[[y - half, x]] = T::from_acc(acc / norm);
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

use ndarray::{Array2, ArrayView2};

use crate::sample::Sample;

/// Summed-area table: `sums[[y, x]]` is the sum of all source samples in
/// rows `0..=y` and columns `0..=x`.
#[derive(Clone, Debug)]
pub struct IntegralImage {
    sums: Array2<f64>,
}

impl Default for IntegralImage {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegralImage {
    pub fn new() -> Self {
        Self {
            sums: Array2::zeros((0, 0)),
        }
    }

    pub fn with_dims(width: usize, height: usize) -> Self {
        Self {
            sums: Array2::zeros((height, width)),
        }
    }

    /// Recompute from `src`: prefix sums along each row, then down each column.
    pub fn compute<T: Sample>(&mut self, src: ArrayView2<T>) {
        let (h, w) = src.dim();
        if self.sums.dim() != (h, w) {
            self.sums = Array2::zeros((h, w));
        }

        for y in 0..h {
            let mut running = 0.0f64;
            for x in 0..w {
                running += src[[y, x]].to_acc();
                self.sums[[y, x]] = running;
            }
        }
        for y in 1..h {
            for x in 0..w {
                let above = self.sums[[y - 1, x]];
                self.sums[[y, x]] += above;
            }
        }
    }

    pub fn sums(&self) -> &Array2<f64> {
        &self.sums
    }

    pub fn dim(&self) -> (usize, usize) {
        self.sums.dim()
    }

    /// Table value with negative coordinates reading as zero.
    #[inline]
    pub fn at(&self, y: isize, x: isize) -> f64 {
        if y < 0 || x < 0 {
            0.0
        } else {
            self.sums[[y as usize, x as usize]]
        }
    }

    /// Sum over the inclusive rectangle `[top, bottom] x [left, right]`.
    pub fn rect_sum(&self, top: usize, left: usize, bottom: usize, right: usize) -> f64 {
        let (t, l) = (top as isize - 1, left as isize - 1);
        let (b, r) = (bottom as isize, right as isize);
        self.at(b, r) - self.at(t, r) - self.at(b, l) + self.at(t, l)
    }

    pub fn total(&self) -> f64 {
        let (h, w) = self.sums.dim();
        if h == 0 || w == 0 {
            return 0.0;
        }
        self.sums[[h - 1, w - 1]]
    }

    /// Mean of the whole source.
    pub fn mean(&self) -> f64 {
        let (h, w) = self.sums.dim();
        if h == 0 || w == 0 {
            return 0.0;
        }
        self.total() / (h * w) as f64
    }
}

use tracing::trace;

use super::sampling::{bilinear, sample_site};
use crate::consts::MIN_SOLVER_SUPPORT;
use crate::engine::config::EngineConfig;
use crate::pyramid::{GradientTerm, Pyramid, PyramidLevel};

/// Result of one global solve.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlobalSolution {
    pub hx: f32,
    pub hy: f32,
    /// Pixels that contributed on the last sub-iteration of the finest level solved.
    pub support: usize,
}

/// Coarse-to-fine Gauss-Newton estimate of one translation for the frame.
///
/// The reference is resampled at `p - h` while gradients stay on the pixel
/// grid of the current image, so the update only needs one bilinear read per
/// pixel.
#[derive(Clone, Debug)]
pub struct GlobalSolver {
    iterations: usize,
    threshold: f32,
    term: GradientTerm,
    skip_coarsest: usize,
    skip_finest: usize,
}

impl GlobalSolver {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            iterations: config.iterations,
            threshold: config.gradient_threshold,
            term: config.gradient_term,
            skip_coarsest: config.skip_coarsest_levels,
            skip_finest: config.skip_finest_levels,
        }
    }

    pub fn solve(&self, pyramid: &Pyramid) -> GlobalSolution {
        let top = pyramid.num_levels() - 1 - self.skip_coarsest;
        let bottom = self.skip_finest;
        let (mut hx, mut hy) = (0.0f32, 0.0f32);
        let mut support = 0;

        for k in (bottom..=top).rev() {
            if k != top {
                hx *= 2.0;
                hy *= 2.0;
            }
            let level = pyramid.level(k);
            for _ in 0..self.iterations {
                let (dx, dy, used) = self.step(level, hx, hy);
                hx += dx;
                hy += dy;
                support = used;
            }
            trace!(level = k, hx, hy, support, "Global level solved");
        }

        let scale = (1u32 << bottom) as f32;
        GlobalSolution {
            hx: hx * scale,
            hy: hy * scale,
            support,
        }
    }

    /// One Newton-Raphson update at `level` from estimate `(hx, hy)`.
    ///
    /// Fewer than `MIN_SOLVER_SUPPORT` contributing pixels leave the estimate
    /// where it is.
    fn step(&self, level: &PyramidLevel, hx: f32, hy: f32) -> (f32, f32, usize) {
        let (rows, cols) = level.interior();
        let (h, w) = (level.height(), level.width());

        // Squared form: per-axis numerators and denominators.
        // Reciprocal form: sums of per-pixel normalised steps.
        let (mut num_x, mut num_y) = (0.0f64, 0.0f64);
        let (mut den_x, mut den_y) = (0.0f64, 0.0f64);
        let mut count = 0usize;

        for y in rows {
            for x in cols.clone() {
                let dx = level.grad_x[[y, x]];
                let dy = level.grad_y[[y, x]];
                if dx * dx + dy * dy <= self.threshold {
                    continue;
                }
                let Some(site) = sample_site(y as f32 - hy, x as f32 - hx, level.margin, h, w)
                else {
                    continue;
                };
                let error = level.current[[y, x]] - bilinear(&level.reference, site);

                match self.term {
                    GradientTerm::Squared => {
                        num_x += (error * dx) as f64;
                        num_y += (error * dy) as f64;
                        den_x += (dx * dx) as f64;
                        den_y += (dy * dy) as f64;
                    }
                    GradientTerm::Reciprocal => {
                        let t = level.grad_term[[y, x]];
                        num_x += (error * dx * t) as f64;
                        num_y += (error * dy * t) as f64;
                    }
                }
                count += 1;
            }
        }

        if count < MIN_SOLVER_SUPPORT {
            return (0.0, 0.0, count);
        }
        let (step_x, step_y) = match self.term {
            GradientTerm::Squared => (ratio(num_x, den_x), ratio(num_y, den_y)),
            GradientTerm::Reciprocal => (ratio(num_x, count as f64), ratio(num_y, count as f64)),
        };
        (-step_x as f32, -step_y as f32, count)
    }
}

#[inline]
fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

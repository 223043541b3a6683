use ndarray::Array2;
use tracing::trace;

use super::sampling::{bilinear, sample_site};
use crate::engine::config::EngineConfig;
use crate::error::Result;
use crate::filters::GaussianFilter;
use crate::pyramid::{GradientTerm, Pyramid, PyramidLevel};

/// Displacement field of one pyramid level.
#[derive(Clone, Debug)]
struct LevelField {
    hx: Array2<f32>,
    hy: Array2<f32>,
    scratch: Array2<f32>,
    smoother: GaussianFilter<f32>,
}

impl LevelField {
    fn new(width: usize, height: usize, config: &EngineConfig) -> Self {
        let smoothing = config.field_smoothing;
        Self {
            hx: Array2::zeros((height, width)),
            hy: Array2::zeros((height, width)),
            scratch: Array2::zeros((height, width)),
            smoother: GaussianFilter::with_dims(width, height, smoothing.width, smoothing.radius),
        }
    }

    fn clear(&mut self) {
        self.hx.fill(0.0);
        self.hy.fill(0.0);
    }

    /// Blur both components; samples the blur cannot reach keep their value.
    fn smooth(&mut self) -> Result<()> {
        for component in [&mut self.hx, &mut self.hy] {
            self.scratch.assign(&*component);
            self.smoother.filter(component.view(), self.scratch.view_mut())?;
            std::mem::swap(component, &mut self.scratch);
        }
        Ok(())
    }
}

/// Coarse-to-fine per-pixel displacement estimate.
///
/// Each sweep resamples the current image and its gradients at `p + h(p)`,
/// takes a clamped Newton-Raphson step per pixel, then smooths the field.
#[derive(Clone, Debug)]
pub struct DenseSolver {
    iterations: usize,
    threshold: f32,
    term: GradientTerm,
    max_step: f32,
    skip_coarsest: usize,
    skip_finest: usize,
    fields: Vec<LevelField>,
}

impl DenseSolver {
    pub fn new(pyramid: &Pyramid, config: &EngineConfig) -> Self {
        let fields = pyramid
            .levels()
            .iter()
            .map(|level| LevelField::new(level.width(), level.height(), config))
            .collect();
        Self {
            iterations: config.iterations,
            threshold: config.gradient_threshold,
            term: config.gradient_term,
            max_step: config.max_step,
            skip_coarsest: config.skip_coarsest_levels,
            skip_finest: config.skip_finest_levels,
            fields,
        }
    }

    /// Level-0 field from the last solve.
    pub fn field(&self) -> (&Array2<f32>, &Array2<f32>) {
        (&self.fields[0].hx, &self.fields[0].hy)
    }

    /// Zero the level-0 field, as reported while the reference is seeding.
    pub fn clear(&mut self) {
        self.fields[0].clear();
    }

    pub fn solve(&mut self, pyramid: &Pyramid) -> Result<()> {
        let top = pyramid.num_levels() - 1 - self.skip_coarsest;
        let bottom = self.skip_finest;

        self.fields[top].clear();
        for k in (0..=top).rev() {
            if k != top {
                let (finer, coarser) = self.fields.split_at_mut(k + 1);
                let (fine, coarse) = (&mut finer[k], &coarser[0]);
                upsample_field(&coarse.hx, &mut fine.hx);
                upsample_field(&coarse.hy, &mut fine.hy);
            }
            if k < bottom {
                continue;
            }
            let level = pyramid.level(k);
            for _ in 0..self.iterations {
                self.sweep(level, k);
                self.fields[k].smooth()?;
            }
            trace!(level = k, "Dense level solved");
        }
        Ok(())
    }

    fn sweep(&mut self, level: &PyramidLevel, k: usize) {
        let (rows, cols) = level.interior();
        let (h, w) = (level.height(), level.width());
        let field = &mut self.fields[k];

        for y in rows {
            for x in cols.clone() {
                let (hx, hy) = (field.hx[[y, x]], field.hy[[y, x]]);
                let Some(site) = sample_site(y as f32 + hy, x as f32 + hx, level.margin, h, w)
                else {
                    continue;
                };
                let dx = bilinear(&level.grad_x, site);
                let dy = bilinear(&level.grad_y, site);
                if dx * dx + dy * dy <= self.threshold {
                    continue;
                }
                let error = bilinear(&level.current, site) - level.reference[[y, x]];
                let t = bilinear(&level.grad_term, site);
                let (Some(mut sx), Some(mut sy)) =
                    (self.term.apply(-error * dx, t), self.term.apply(-error * dy, t))
                else {
                    continue;
                };

                let length = (sx * sx + sy * sy).sqrt();
                if length > self.max_step {
                    let scale = self.max_step / length;
                    sx *= scale;
                    sy *= scale;
                }
                field.hx[[y, x]] = hx + sx;
                field.hy[[y, x]] = hy + sy;
            }
        }
    }
}

/// 2x bilinear upsample of a displacement component, doubling its values.
///
/// Even output samples weight their two nearest coarse samples 0.25/0.75,
/// odd ones 0.75/0.25; indices past the edge clamp to it.
pub fn upsample_field(coarse: &Array2<f32>, fine: &mut Array2<f32>) {
    let (ch, cw) = coarse.dim();
    if ch == 0 || cw == 0 {
        return;
    }
    let (fh, fw) = fine.dim();
    let taps = |i: usize, len: usize| -> [(usize, f32); 2] {
        let c = (i / 2).min(len - 1);
        if i % 2 == 0 {
            [(c.saturating_sub(1), 0.25), (c, 0.75)]
        } else {
            [(c, 0.75), ((c + 1).min(len - 1), 0.25)]
        }
    };

    for y in 0..fh {
        let ty = taps(y, ch);
        for x in 0..fw {
            let tx = taps(x, cw);
            let mut v = 0.0f32;
            for &(cy, wy) in &ty {
                for &(cx, wx) in &tx {
                    v += coarse[[cy, cx]] * wy * wx;
                }
            }
            fine[[y, x]] = 2.0 * v;
        }
    }
}

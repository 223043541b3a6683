//! Gaussian scale-space pyramid with per-level reference images.
//!
//! The input is centre-cropped so every level halves exactly. Level 0 holds
//! the (optionally pre-filtered) luma of the crop; level `k` is the Gaussian
//! downsample of level `k - 1`. Each level records the margin its filters
//! left unwritten so gradients and solvers stay clear of it.

pub mod gradient;
pub mod reference;

pub use gradient::{compute_gradients, GradientTerm};
pub use reference::ReferencePolicy;

use std::ops::Range;

use ndarray::{Array2, ArrayView3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{
    AUTO_MIN_USABLE_DIM, LUMINANCE_B, LUMINANCE_G, LUMINANCE_R, MAX_AUTO_LEVELS, MAX_LEVELS,
    MIN_USABLE_DIM, SAMPLE_BORDER,
};
use crate::engine::config::EngineConfig;
use crate::error::{KanadeError, Result};
use crate::filters::{even_width, odd_width, GaussianDownsample, GaussianFilter};
use crate::sample::Sample;

/// Channel combination used to turn RGB input into pyramid intensity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LumaSource {
    #[default]
    Green,
    /// ITU-R BT.601 weighted sum.
    Bt601,
}

impl std::fmt::Display for LumaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Green => write!(f, "Green channel"),
            Self::Bt601 => write!(f, "BT.601 luminance"),
        }
    }
}

/// Centred crop of the input that the pyramid covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropWindow {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl CropWindow {
    /// Largest centred window whose sides are multiples of `2^(levels - 1)`.
    pub fn centred(width: usize, height: usize, num_levels: usize) -> Self {
        let shift = num_levels.saturating_sub(1);
        let cropped_w = (width >> shift) << shift;
        let cropped_h = (height >> shift) << shift;
        Self {
            x: (width - cropped_w) / 2,
            y: (height - cropped_h) / 2,
            width: cropped_w,
            height: cropped_h,
        }
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Pick the pyramid depth for a frame, or check the one `config` requests.
///
/// Every level must keep a usable square of at least `MIN_USABLE_DIM`
/// pixels once its filter margin and the sampling border are trimmed, and
/// every downsample must have a source at least as wide as its kernel.
/// Automatic depth stops before the coarsest usable side would drop below
/// `AUTO_MIN_USABLE_DIM`.
pub fn level_count(width: usize, height: usize, config: &EngineConfig) -> Result<usize> {
    let invalid = || KanadeError::InvalidDimensions {
        width: width as u32,
        height: height as u32,
    };

    match config.num_levels {
        Some(0) => Err(KanadeError::InvalidConfig(
            "num_levels must be at least 1".into(),
        )),
        Some(levels) => {
            if depth_fits(width, height, levels, config, MIN_USABLE_DIM) {
                Ok(levels)
            } else {
                Err(invalid())
            }
        }
        None => {
            if !depth_fits(width, height, 1, config, MIN_USABLE_DIM) {
                return Err(invalid());
            }
            let mut levels = 1;
            while levels < MAX_AUTO_LEVELS
                && depth_fits(width, height, levels + 1, config, AUTO_MIN_USABLE_DIM)
            {
                levels += 1;
            }
            Ok(levels)
        }
    }
}

/// Border (each side) the filters leave unwritten at every level.
pub fn level_margins(num_levels: usize, config: &EngineConfig) -> Vec<usize> {
    let step = even_width(config.downsample.width) / 2;
    let mut margin = config.prefilter.map_or(0, |p| odd_width(p.width) / 2);
    let mut margins = Vec::with_capacity(num_levels);
    margins.push(margin);
    for _ in 1..num_levels {
        margin = (margin + step) / 2;
        margins.push(margin);
    }
    margins
}

/// Side of the region a solver can both read gradients from and sample in.
#[inline]
pub fn usable_side(side: usize, margin: usize) -> usize {
    side.saturating_sub(2 * (margin + SAMPLE_BORDER + 1))
}

fn depth_fits(
    width: usize,
    height: usize,
    num_levels: usize,
    config: &EngineConfig,
    min_usable: usize,
) -> bool {
    if num_levels == 0 || num_levels > MAX_LEVELS {
        return false;
    }
    let crop = CropWindow::centred(width, height, num_levels);
    let side = crop.width.min(crop.height);
    if config
        .prefilter
        .is_some_and(|p| odd_width(p.width) > side)
    {
        return false;
    }
    let downsample_width = even_width(config.downsample.width);

    level_margins(num_levels, config)
        .iter()
        .enumerate()
        .all(|(k, &margin)| {
            let fed = k == 0 || (side >> (k - 1)) >= downsample_width;
            fed && usable_side(side >> k, margin) >= min_usable
        })
}

/// One scale of the pyramid.
#[derive(Clone, Debug)]
pub struct PyramidLevel {
    pub current: Array2<f32>,
    pub reference: Array2<f32>,
    pub grad_x: Array2<f32>,
    pub grad_y: Array2<f32>,
    pub grad_term: Array2<f32>,
    /// Border width (each side) the filters never write at this level.
    pub margin: usize,
}

impl PyramidLevel {
    pub fn new(width: usize, height: usize, margin: usize) -> Self {
        let zeros = || Array2::<f32>::zeros((height, width));
        Self {
            current: zeros(),
            reference: zeros(),
            grad_x: zeros(),
            grad_y: zeros(),
            grad_term: zeros(),
            margin,
        }
    }

    pub fn width(&self) -> usize {
        self.current.ncols()
    }

    pub fn height(&self) -> usize {
        self.current.nrows()
    }

    /// Rows and columns whose gradients are defined.
    pub fn interior(&self) -> (Range<usize>, Range<usize>) {
        let inset = self.margin + 1;
        let rows = inset..self.height().saturating_sub(inset).max(inset);
        let cols = inset..self.width().saturating_sub(inset).max(inset);
        (rows, cols)
    }
}

pub struct Pyramid {
    levels: Vec<PyramidLevel>,
    crop: CropWindow,
    staging: Array2<f32>,
    prefilter: Option<GaussianFilter<f32>>,
    downsamplers: Vec<GaussianDownsample<f32>>,
    luma: LumaSource,
    gradient_term: GradientTerm,
}

impl Pyramid {
    /// Allocate every level for `width x height` input.
    pub fn new(width: usize, height: usize, num_levels: usize, config: &EngineConfig) -> Self {
        let crop = CropWindow::centred(width, height, num_levels);
        let prefilter = config.prefilter.map(|p| {
            GaussianFilter::with_dims(crop.width, crop.height, p.width, p.radius)
        });
        let margins = level_margins(num_levels, config);

        let mut levels = Vec::with_capacity(num_levels);
        let mut downsamplers = Vec::with_capacity(num_levels.saturating_sub(1));
        levels.push(PyramidLevel::new(crop.width, crop.height, margins[0]));
        for k in 1..num_levels {
            let (src_w, src_h) = (crop.width >> (k - 1), crop.height >> (k - 1));
            downsamplers.push(GaussianDownsample::with_dims(
                src_w,
                src_h,
                config.downsample.width,
                config.downsample.radius,
            ));
            levels.push(PyramidLevel::new(src_w / 2, src_h / 2, margins[k]));
        }

        debug!(
            levels = num_levels,
            crop_width = crop.width,
            crop_height = crop.height,
            coarsest_margin = margins.last().copied().unwrap_or_default(),
            "Pyramid allocated"
        );

        Self {
            levels,
            crop,
            staging: Array2::zeros((crop.height, crop.width)),
            prefilter,
            downsamplers,
            luma: config.luma,
            gradient_term: config.gradient_term,
        }
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, index: usize) -> &PyramidLevel {
        &self.levels[index]
    }

    pub fn levels(&self) -> &[PyramidLevel] {
        &self.levels
    }

    pub fn crop(&self) -> CropWindow {
        self.crop
    }

    /// Push a new frame through every level.
    ///
    /// For each level the reference is updated from the outgoing current
    /// first, then the new current is written and its gradients computed.
    pub fn build<T: Sample>(
        &mut self,
        input: ArrayView3<T>,
        policy: ReferencePolicy,
        seeding: bool,
    ) -> Result<()> {
        self.extract_luma(input);

        {
            let level = &mut self.levels[0];
            policy.update(&mut level.reference, &level.current, seeding);
            match self.prefilter.as_mut() {
                Some(filter) => filter.filter(self.staging.view(), level.current.view_mut())?,
                None => level.current.assign(&self.staging),
            }
        }

        for k in 1..self.levels.len() {
            let (finer, coarser) = self.levels.split_at_mut(k);
            let level = &mut coarser[0];
            policy.update(&mut level.reference, &level.current, seeding);
            self.downsamplers[k - 1]
                .downsample(finer[k - 1].current.view(), level.current.view_mut())?;
        }

        for level in &mut self.levels {
            compute_gradients(level, self.gradient_term);
        }
        Ok(())
    }

    fn extract_luma<T: Sample>(&mut self, input: ArrayView3<T>) {
        let crop = self.crop;
        let channels = input.dim().2;
        for y in 0..crop.height {
            for x in 0..crop.width {
                let (sy, sx) = (crop.y + y, crop.x + x);
                self.staging[[y, x]] = if channels == 1 {
                    input[[sy, sx, 0]].to_unit()
                } else {
                    match self.luma {
                        LumaSource::Green => input[[sy, sx, 1]].to_unit(),
                        LumaSource::Bt601 => {
                            input[[sy, sx, 0]].to_unit() * LUMINANCE_R
                                + input[[sy, sx, 1]].to_unit() * LUMINANCE_G
                                + input[[sy, sx, 2]].to_unit() * LUMINANCE_B
                        }
                    }
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_is_centred() {
        let crop = CropWindow::centred(101, 66, 3);
        assert_eq!((crop.width, crop.height), (100, 64));
        assert_eq!((crop.x, crop.y), (0, 1));
    }

    #[test]
    fn automatic_depth_keeps_coarsest_level_usable() {
        let config = EngineConfig::default();
        assert_eq!(level_count(128, 128, &config).unwrap(), 3);
        assert_eq!(level_count(640, 480, &config).unwrap(), 4);
        assert!(level_count(8, 8, &config).is_err());
        assert!(level_count(3, 100, &config).is_err());
    }

    #[test]
    fn requested_depth_is_checked_against_margins() {
        let request = |n| EngineConfig {
            num_levels: Some(n),
            ..EngineConfig::default()
        };
        assert_eq!(level_count(64, 64, &request(2)).unwrap(), 2);
        assert!(level_count(64, 64, &request(3)).is_err());
        assert!(level_count(64, 64, &request(0)).is_err());
    }

    #[test]
    fn margins_match_allocated_levels() {
        let config = EngineConfig::default();
        let pyramid = Pyramid::new(256, 256, 4, &config);
        let allocated: Vec<_> = pyramid.levels().iter().map(|l| l.margin).collect();
        assert_eq!(allocated, level_margins(4, &config));
        assert_eq!(usable_side(32, 5), 16);
        assert_eq!(usable_side(16, 5), 0);
    }
}

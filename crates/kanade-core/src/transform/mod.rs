//! Output transforms driven by the motion estimate.
//!
//! All transforms gather: output pixel `p` pulls from the source at
//! `p - correction` (global modes, `correction = -accumulated h`) or at
//! `p + h(p)` (dense modes). Sources that fail the bilinear border check
//! produce zero.

pub mod accumulate;

pub use accumulate::Accumulator;

use ndarray::{Array2, ArrayView3, ArrayViewMut3};

use crate::engine::config::TransformMode;
use crate::error::{KanadeError, Result};
use crate::pyramid::{CropWindow, Pyramid, PyramidLevel};
use crate::sample::Sample;
use crate::solver::sampling::{bilinear, bilinear_channel, sample_site};

/// What a transform is driven by.
#[derive(Clone, Copy, Debug)]
pub enum Correction<'a> {
    /// Global shift to apply, `-(accumulated h)`.
    Shift { dx: f32, dy: f32 },
    /// Level-0 displacement field over the crop window.
    Field {
        hx: &'a Array2<f32>,
        hy: &'a Array2<f32>,
    },
}

/// Write `output` from `input` according to `mode`.
pub fn apply<T: Sample>(
    mode: TransformMode,
    input: ArrayView3<T>,
    output: ArrayViewMut3<T>,
    pyramid: &Pyramid,
    correction: Correction<'_>,
    flow_scale: f32,
) -> Result<()> {
    match (mode, correction) {
        (TransformMode::NoTransform, _) => {
            copy_frame(input, output);
            Ok(())
        }
        (TransformMode::IntegerShift, Correction::Shift { dx, dy }) => {
            integer_shift(input, output, dx, dy);
            Ok(())
        }
        (TransformMode::SubpixelShift, Correction::Shift { dx, dy }) => {
            subpixel_shift(input, output, dx, dy);
            Ok(())
        }
        (TransformMode::CroppedFilteredSubpixelShift, Correction::Shift { dx, dy }) => {
            cropped_subpixel_shift(pyramid.level(0), pyramid.crop(), output, dx, dy);
            Ok(())
        }
        (TransformMode::DenseDewarp, Correction::Field { hx, hy }) => {
            dense_dewarp(input, output, pyramid.crop(), hx, hy);
            Ok(())
        }
        (TransformMode::FlowMagnitude, Correction::Field { hx, hy }) => {
            flow_magnitude(output, pyramid.crop(), hx, hy, flow_scale);
            Ok(())
        }
        (mode, _) => Err(KanadeError::InvalidConfig(format!(
            "{mode} cannot be driven by this estimate"
        ))),
    }
}

pub fn copy_frame<T: Sample>(input: ArrayView3<T>, mut output: ArrayViewMut3<T>) {
    output.assign(&input);
}

/// Shift by the correction rounded to whole pixels.
pub fn integer_shift<T: Sample>(input: ArrayView3<T>, mut output: ArrayViewMut3<T>, dx: f32, dy: f32) {
    let (h, w, channels) = input.dim();
    let (sx, sy) = (dx.round() as isize, dy.round() as isize);
    for y in 0..h {
        let src_y = y as isize - sy;
        for x in 0..w {
            let src_x = x as isize - sx;
            let inside = src_y >= 0 && src_y < h as isize && src_x >= 0 && src_x < w as isize;
            for c in 0..channels {
                output[[y, x, c]] = if inside {
                    input[[src_y as usize, src_x as usize, c]]
                } else {
                    T::zero()
                };
            }
        }
    }
}

/// Bilinear shift of the full, uncropped input.
pub fn subpixel_shift<T: Sample>(input: ArrayView3<T>, mut output: ArrayViewMut3<T>, dx: f32, dy: f32) {
    let (h, w, channels) = input.dim();
    for y in 0..h {
        for x in 0..w {
            let site = sample_site(y as f32 - dy, x as f32 - dx, 0, h, w);
            for c in 0..channels {
                output[[y, x, c]] = match site {
                    Some(site) => T::from_f32(bilinear_channel(&input, site, c)),
                    None => T::zero(),
                };
            }
        }
    }
}

/// Bilinear shift of the filtered level-0 intensity, written back at the
/// crop offset. Everything outside the crop window is zeroed.
pub fn cropped_subpixel_shift<T: Sample>(
    level: &PyramidLevel,
    crop: CropWindow,
    mut output: ArrayViewMut3<T>,
    dx: f32,
    dy: f32,
) {
    let (h, w, channels) = output.dim();
    let (lh, lw) = (level.height(), level.width());
    for y in 0..h {
        for x in 0..w {
            let value = if crop.contains(x, y) {
                let (qy, qx) = ((y - crop.y) as f32, (x - crop.x) as f32);
                sample_site(qy - dy, qx - dx, level.margin, lh, lw)
                    .map_or(T::zero(), |site| T::from_unit(bilinear(&level.current, site)))
            } else {
                T::zero()
            };
            for c in 0..channels {
                output[[y, x, c]] = value;
            }
        }
    }
}

/// Per-pixel gather `output(p) = input(p + h(p))` inside the crop window;
/// outside it the input passes through.
pub fn dense_dewarp<T: Sample>(
    input: ArrayView3<T>,
    mut output: ArrayViewMut3<T>,
    crop: CropWindow,
    hx: &Array2<f32>,
    hy: &Array2<f32>,
) {
    let (h, w, channels) = input.dim();
    for y in 0..h {
        for x in 0..w {
            if !crop.contains(x, y) {
                for c in 0..channels {
                    output[[y, x, c]] = input[[y, x, c]];
                }
                continue;
            }
            let (qy, qx) = (y - crop.y, x - crop.x);
            let site = sample_site(y as f32 + hy[[qy, qx]], x as f32 + hx[[qy, qx]], 0, h, w);
            for c in 0..channels {
                output[[y, x, c]] = match site {
                    Some(site) => T::from_f32(bilinear_channel(&input, site, c)),
                    None => T::zero(),
                };
            }
        }
    }
}

/// `|h(p)| * scale` inside the crop window, zero elsewhere.
pub fn flow_magnitude<T: Sample>(
    mut output: ArrayViewMut3<T>,
    crop: CropWindow,
    hx: &Array2<f32>,
    hy: &Array2<f32>,
    scale: f32,
) {
    let (h, w, channels) = output.dim();
    for y in 0..h {
        for x in 0..w {
            let value = if crop.contains(x, y) {
                let (qy, qx) = (y - crop.y, x - crop.x);
                T::from_unit(hx[[qy, qx]].hypot(hy[[qy, qx]]) * scale)
            } else {
                T::zero()
            };
            for c in 0..channels {
                output[[y, x, c]] = value;
            }
        }
    }
}

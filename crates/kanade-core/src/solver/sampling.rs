use ndarray::{Array2, ArrayView3};

use crate::consts::SAMPLE_BORDER;
use crate::sample::Sample;

/// Integer base and fractional offset of a bilinear sample position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleSite {
    pub iy: usize,
    pub ix: usize,
    pub fy: f32,
    pub fx: f32,
}

/// Locate `(y, x)` for bilinear sampling.
///
/// The floor of each coordinate must sit at least `SAMPLE_BORDER` pixels
/// inside the region left after trimming `margin` from every edge; anything
/// else returns `None`.
#[inline]
pub fn sample_site(y: f32, x: f32, margin: usize, height: usize, width: usize) -> Option<SampleSite> {
    let (iy, fy) = axis_base(y, margin, height)?;
    let (ix, fx) = axis_base(x, margin, width)?;
    Some(SampleSite { iy, ix, fy, fx })
}

#[inline]
fn axis_base(coord: f32, margin: usize, len: usize) -> Option<(usize, f32)> {
    let floor = coord.floor();
    if !floor.is_finite() {
        return None;
    }
    let base = floor as isize;
    let lo = (margin + SAMPLE_BORDER) as isize;
    let hi = len as isize - margin as isize;
    if base >= lo && base + (SAMPLE_BORDER as isize) < hi {
        Some((base as usize, coord - floor))
    } else {
        None
    }
}

#[inline]
pub fn bilinear(data: &Array2<f32>, site: SampleSite) -> f32 {
    let SampleSite { iy, ix, fy, fx } = site;
    let top = data[[iy, ix]] * (1.0 - fx) + data[[iy, ix + 1]] * fx;
    let bottom = data[[iy + 1, ix]] * (1.0 - fx) + data[[iy + 1, ix + 1]] * fx;
    top * (1.0 - fy) + bottom * fy
}

/// Bilinear sample of one channel of an interleaved frame, in raw units.
#[inline]
pub fn bilinear_channel<T: Sample>(frame: &ArrayView3<T>, site: SampleSite, channel: usize) -> f32 {
    let SampleSite { iy, ix, fy, fx } = site;
    let at = |y: usize, x: usize| frame[[y, x, channel]].to_f32();
    let top = at(iy, ix) * (1.0 - fx) + at(iy, ix + 1) * fx;
    let bottom = at(iy + 1, ix) * (1.0 - fx) + at(iy + 1, ix + 1) * fx;
    top * (1.0 - fy) + bottom * fy
}

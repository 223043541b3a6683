//! Coarse-to-fine Lucas-Kanade motion solvers.
//!
//! Both variants share the displacement convention `current(p) ≈
//! reference(p - h)` and skip pixels that are flat or whose sample base
//! falls within [`SAMPLE_BORDER`](crate::consts::SAMPLE_BORDER) of the
//! level's valid region.

pub mod dense;
pub mod global;
pub mod sampling;

pub use dense::{upsample_field, DenseSolver};
pub use global::{GlobalSolution, GlobalSolver};
pub use sampling::{bilinear, bilinear_channel, sample_site, SampleSite};

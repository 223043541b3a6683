use std::time::Instant;

use ndarray::{Array2, ArrayView3, ArrayViewMut3};
use tracing::{debug, info, warn};

use super::config::{EngineConfig, SolverVariant, TransformMode};
use super::types::{FrameOutcome, FrameStatus};
use crate::error::{KanadeError, Result};
use crate::frame::{ImageFormat, MotionEstimate, PixelFormat};
use crate::pyramid::{level_count, Pyramid};
use crate::sample::Sample;
use crate::solver::{DenseSolver, GlobalSolver};
use crate::transform::{self, Accumulator, Correction};

enum Solver {
    Global(GlobalSolver),
    Dense(DenseSolver),
}

/// Frame-by-frame registration of one video stream.
///
/// Every buffer is allocated in [`RegistrationEngine::initialize`]; frames
/// that do not match the agreed format are rejected before anything is
/// touched.
pub struct RegistrationEngine {
    format: ImageFormat,
    config: EngineConfig,
    pyramid: Pyramid,
    solver: Solver,
    accumulator: Accumulator,
    latest: MotionEstimate,
    frame_index: u64,
}

impl RegistrationEngine {
    pub fn initialize(format: ImageFormat, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let num_levels = level_count(format.width, format.height, &config)?;
        config.validate_levels(num_levels)?;

        let pyramid = Pyramid::new(format.width, format.height, num_levels, &config);
        let (solver, latest) = match config.solver {
            SolverVariant::Global => (
                Solver::Global(GlobalSolver::new(&config)),
                MotionEstimate::zero_global(),
            ),
            SolverVariant::Dense => {
                let crop = pyramid.crop();
                let zeros = || Array2::<f32>::zeros((crop.height, crop.width));
                (
                    Solver::Dense(DenseSolver::new(&pyramid, &config)),
                    MotionEstimate::Dense {
                        hx: zeros(),
                        hy: zeros(),
                    },
                )
            }
        };

        info!(
            format = %format,
            levels = num_levels,
            solver = %config.solver,
            transform = %config.transform,
            "Registration engine initialised"
        );

        Ok(Self {
            format,
            accumulator: Accumulator::new(config.burn_x, config.burn_y),
            config,
            pyramid,
            solver,
            latest,
            frame_index: 0,
        })
    }

    pub fn new(
        width: usize,
        height: usize,
        pixel_format: PixelFormat,
        config: EngineConfig,
    ) -> Result<Self> {
        Self::initialize(ImageFormat::new(width, height, pixel_format), config)
    }

    /// Rebuild every buffer for a new frame format, keeping the configuration.
    pub fn reinitialize(&mut self, format: ImageFormat) -> Result<()> {
        *self = Self::initialize(format, self.config.clone())?;
        Ok(())
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pyramid(&self) -> &Pyramid {
        &self.pyramid
    }

    pub fn latest_estimate(&self) -> &MotionEstimate {
        &self.latest
    }

    pub fn accumulated(&self) -> (f32, f32) {
        self.accumulator.sum()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frame_index
    }

    pub fn set_transform_mode(&mut self, mode: TransformMode) -> Result<()> {
        if !mode.is_compatible_with(self.config.solver) {
            return Err(KanadeError::InvalidConfig(format!(
                "{mode} output needs a different solver than {}",
                self.config.solver
            )));
        }
        self.config.transform = mode;
        Ok(())
    }

    pub fn set_burn(&mut self, burn_x: f32, burn_y: f32) -> Result<()> {
        let candidate = EngineConfig {
            burn_x,
            burn_y,
            ..self.config.clone()
        };
        candidate.validate()?;
        self.config = candidate;
        self.accumulator.set_burn(burn_x, burn_y);
        Ok(())
    }

    /// Forget temporal state; the next frames seed the reference again.
    pub fn reset(&mut self) {
        self.accumulator.reset();
        self.frame_index = 0;
        self.reset_estimate();
    }

    /// Register one frame and write the corrected frame into `output`.
    ///
    /// `input` and `output` are `(height, width, components)` views matching
    /// the initialised format.
    pub fn process_frame<T: Sample>(
        &mut self,
        input: ArrayView3<T>,
        mut output: ArrayViewMut3<T>,
    ) -> Result<FrameOutcome> {
        self.check_frame::<T>(input.dim())?;
        self.check_frame::<T>(output.dim())?;

        let started = Instant::now();
        let index = self.frame_index;
        let seed_frames = self.config.seed_frames;
        self.pyramid
            .build(input, self.config.reference, index <= seed_frames)?;
        self.frame_index += 1;

        if index < seed_frames {
            output.assign(&input);
            self.reset_estimate();
            debug!(frame = index, "Seeding reference");
            return Ok(FrameOutcome {
                frame_index: index,
                status: FrameStatus::Skipped,
                estimate: self.latest.clone(),
                correction: (0.0, 0.0),
            });
        }

        let correction = match &mut self.solver {
            Solver::Global(global) => {
                let solution = global.solve(&self.pyramid);
                if solution.support == 0 {
                    warn!(frame = index, "No textured pixels; estimate left at zero");
                }
                self.latest = MotionEstimate::Global {
                    hx: solution.hx,
                    hy: solution.hy,
                };
                self.accumulator.update(solution.hx, solution.hy);
                self.accumulator.correction()
            }
            Solver::Dense(dense) => {
                dense.solve(&self.pyramid)?;
                (0.0, 0.0)
            }
        };
        self.publish_field();

        let source = match &self.solver {
            Solver::Dense(dense) => {
                let (hx, hy) = dense.field();
                Correction::Field { hx, hy }
            }
            Solver::Global(_) => Correction::Shift {
                dx: correction.0,
                dy: correction.1,
            },
        };
        transform::apply(
            self.config.transform,
            input,
            output,
            &self.pyramid,
            source,
            self.config.flow_magnitude_scale,
        )?;

        let (mean_x, mean_y) = self.latest.mean();
        debug!(
            frame = index,
            hx = mean_x,
            hy = mean_y,
            correction_x = correction.0,
            correction_y = correction.1,
            elapsed_us = started.elapsed().as_micros() as u64,
            "Frame registered"
        );

        Ok(FrameOutcome {
            frame_index: index,
            status: FrameStatus::Processed,
            estimate: self.latest.clone(),
            correction,
        })
    }

    /// [`process_frame`](Self::process_frame) over flat interleaved buffers.
    pub fn process_slices<T: Sample>(&mut self, input: &[T], output: &mut [T]) -> Result<FrameOutcome> {
        let expected = self.format.sample_count();
        for actual in [input.len(), output.len()] {
            if actual != expected {
                return Err(KanadeError::BufferSize { expected, actual });
            }
        }
        let shape = self.format.shape();
        let mismatch = |_| KanadeError::BufferSize {
            expected,
            actual: expected,
        };
        let input = ArrayView3::from_shape(shape, input).map_err(mismatch)?;
        let output = ArrayViewMut3::from_shape(shape, output).map_err(mismatch)?;
        self.process_frame(input, output)
    }

    fn check_frame<T: Sample>(&self, (height, width, components): (usize, usize, usize)) -> Result<()> {
        let pixel_format = PixelFormat::from_parts(T::KIND, components).ok_or_else(|| {
            KanadeError::UnsupportedPixelFormat(format!(
                "{components} components of {:?} samples",
                T::KIND
            ))
        })?;
        let actual = ImageFormat::new(width, height, pixel_format);
        if actual != self.format {
            return Err(KanadeError::FormatMismatch {
                expected: self.format,
                actual,
            });
        }
        Ok(())
    }

    fn reset_estimate(&mut self) {
        match &mut self.solver {
            Solver::Global(_) => self.latest = MotionEstimate::zero_global(),
            Solver::Dense(dense) => dense.clear(),
        }
        self.publish_field();
    }

    /// Copy the dense solver's level-0 field into `latest` without reallocating.
    fn publish_field(&mut self) {
        if let (Solver::Dense(dense), MotionEstimate::Dense { hx, hy }) =
            (&self.solver, &mut self.latest)
        {
            let (fx, fy) = dense.field();
            hx.assign(fx);
            hy.assign(fy);
        }
    }
}

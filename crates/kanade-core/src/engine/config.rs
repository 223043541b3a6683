use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_DENSE_GRADIENT_THRESHOLD, DEFAULT_DOWNSAMPLE_RADIUS, DEFAULT_DOWNSAMPLE_WIDTH,
    DEFAULT_FIELD_SMOOTHING_RADIUS, DEFAULT_FIELD_SMOOTHING_WIDTH,
    DEFAULT_GLOBAL_GRADIENT_THRESHOLD, DEFAULT_ITERATIONS, DEFAULT_MAX_STEP, DEFAULT_SEED_FRAMES,
};
use crate::error::{KanadeError, Result};
use crate::pyramid::{GradientTerm, LumaSource, ReferencePolicy};

/// Which motion model the solver estimates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverVariant {
    /// One 2D vector for the whole frame.
    #[default]
    Global,
    /// One 2D vector per level-0 pixel.
    Dense,
}

impl std::fmt::Display for SolverVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "Global"),
            Self::Dense => write!(f, "Dense"),
        }
    }
}

/// How the estimate is applied to produce the output frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformMode {
    NoTransform,
    IntegerShift,
    #[default]
    SubpixelShift,
    CroppedFilteredSubpixelShift,
    DenseDewarp,
    /// Per-pixel displacement magnitude, for inspecting a dense field.
    FlowMagnitude,
}

impl TransformMode {
    /// Whether the mode consumes a per-pixel field rather than a global vector.
    pub fn is_dense(&self) -> bool {
        matches!(self, Self::DenseDewarp | Self::FlowMagnitude)
    }

    pub fn is_compatible_with(&self, solver: SolverVariant) -> bool {
        match self {
            Self::NoTransform => true,
            _ => self.is_dense() == (solver == SolverVariant::Dense),
        }
    }
}

impl std::fmt::Display for TransformMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoTransform => write!(f, "No Transform"),
            Self::IntegerShift => write!(f, "Integer Shift"),
            Self::SubpixelShift => write!(f, "Sub-pixel Shift"),
            Self::CroppedFilteredSubpixelShift => write!(f, "Cropped Filtered Sub-pixel Shift"),
            Self::DenseDewarp => write!(f, "Dense Dewarp"),
            Self::FlowMagnitude => write!(f, "Flow Magnitude"),
        }
    }
}

/// Gaussian kernel width and filter radius (`sigma = radius / 2`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KernelParams {
    pub width: usize,
    pub radius: f32,
}

impl KernelParams {
    pub fn new(width: usize, radius: f32) -> Self {
        Self { width, radius }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.width == 0 || !(self.radius > 0.0) {
            return Err(KanadeError::InvalidConfig(format!(
                "{name} kernel needs a positive width and radius (got {} / {})",
                self.width, self.radius
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub solver: SolverVariant,
    pub transform: TransformMode,
    pub reference: ReferencePolicy,
    /// Pyramid depth; `None` picks the deepest sensible pyramid.
    pub num_levels: Option<usize>,
    /// Coarsest levels never iterated on.
    pub skip_coarsest_levels: usize,
    /// Finest levels never iterated on; the estimate is scaled up to level 0.
    pub skip_finest_levels: usize,
    /// Newton-Raphson sub-iterations per level.
    pub iterations: usize,
    pub gradient_term: GradientTerm,
    /// Squared gradient magnitude at or below which a pixel is ignored.
    pub gradient_threshold: f32,
    /// Dense solver step length limit (pixels).
    pub max_step: f32,
    /// Decay applied to the accumulated horizontal estimate each frame.
    pub burn_x: f32,
    /// Decay applied to the accumulated vertical estimate each frame.
    pub burn_y: f32,
    /// Frames used only to seed the reference.
    pub seed_frames: u64,
    /// Optional blur of level 0 before the pyramid is built.
    pub prefilter: Option<KernelParams>,
    pub downsample: KernelParams,
    /// Dense field smoothing after every sweep.
    pub field_smoothing: KernelParams,
    pub luma: LumaSource,
    /// Output gain of the flow magnitude view.
    pub flow_magnitude_scale: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            solver: SolverVariant::Global,
            transform: TransformMode::SubpixelShift,
            reference: ReferencePolicy::Snapshot,
            num_levels: None,
            skip_coarsest_levels: 0,
            skip_finest_levels: 0,
            iterations: DEFAULT_ITERATIONS,
            gradient_term: GradientTerm::Squared,
            gradient_threshold: DEFAULT_GLOBAL_GRADIENT_THRESHOLD,
            max_step: DEFAULT_MAX_STEP,
            burn_x: 1.0,
            burn_y: 1.0,
            seed_frames: DEFAULT_SEED_FRAMES,
            prefilter: None,
            downsample: KernelParams::new(DEFAULT_DOWNSAMPLE_WIDTH, DEFAULT_DOWNSAMPLE_RADIUS),
            field_smoothing: KernelParams::new(
                DEFAULT_FIELD_SMOOTHING_WIDTH,
                DEFAULT_FIELD_SMOOTHING_RADIUS,
            ),
            luma: LumaSource::Green,
            flow_magnitude_scale: 1.0,
        }
    }
}

impl EngineConfig {
    /// Global stabilisation: frame-to-frame tracking, accumulated correction.
    pub fn stabilise() -> Self {
        Self::default()
    }

    /// Dense dewarping against a temporally averaged reference.
    pub fn dewarp() -> Self {
        Self {
            solver: SolverVariant::Dense,
            transform: TransformMode::DenseDewarp,
            reference: ReferencePolicy::ExponentialAverage { longevity: 0.9 },
            gradient_term: GradientTerm::Reciprocal,
            gradient_threshold: DEFAULT_DENSE_GRADIENT_THRESHOLD,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.transform.is_compatible_with(self.solver) {
            return Err(KanadeError::InvalidConfig(format!(
                "{} output needs a different solver than {}",
                self.transform, self.solver
            )));
        }
        if self.iterations == 0 {
            return Err(KanadeError::InvalidConfig(
                "iterations must be at least 1".into(),
            ));
        }
        if self.seed_frames == 0 {
            return Err(KanadeError::InvalidConfig(
                "at least one seed frame is needed to form a reference".into(),
            ));
        }
        if let ReferencePolicy::ExponentialAverage { longevity } = self.reference {
            if !(0.0..1.0).contains(&longevity) {
                return Err(KanadeError::InvalidConfig(format!(
                    "longevity must be in [0, 1), got {longevity}"
                )));
            }
        }
        for (name, burn) in [("burn_x", self.burn_x), ("burn_y", self.burn_y)] {
            if !(burn > 0.0 && burn <= 1.0) {
                return Err(KanadeError::InvalidConfig(format!(
                    "{name} must be in (0, 1], got {burn}"
                )));
            }
        }
        if !(self.gradient_threshold >= 0.0) {
            return Err(KanadeError::InvalidConfig(
                "gradient_threshold must be non-negative".into(),
            ));
        }
        if !(self.max_step > 0.0) {
            return Err(KanadeError::InvalidConfig("max_step must be positive".into()));
        }
        if let Some(n) = self.num_levels {
            if n == 0 {
                return Err(KanadeError::InvalidConfig(
                    "num_levels must be at least 1".into(),
                ));
            }
        }
        if let Some(prefilter) = &self.prefilter {
            prefilter.validate("prefilter")?;
        }
        self.downsample.validate("downsample")?;
        self.field_smoothing.validate("field smoothing")?;
        Ok(())
    }

    /// Check the level skips against a resolved pyramid depth.
    pub(crate) fn validate_levels(&self, num_levels: usize) -> Result<()> {
        if self.skip_coarsest_levels + self.skip_finest_levels >= num_levels {
            return Err(KanadeError::InvalidConfig(format!(
                "skipping {} coarsest and {} finest levels leaves nothing of a {}-level pyramid",
                self.skip_coarsest_levels, self.skip_finest_levels, num_levels
            )));
        }
        Ok(())
    }
}

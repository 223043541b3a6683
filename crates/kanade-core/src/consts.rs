/// Smallest side (pixels) of the region every pyramid level must leave
/// usable once its filter margin and the sampling border are trimmed.
pub const MIN_USABLE_DIM: usize = 8;

/// Usable side the coarsest level keeps when the level count is chosen automatically.
pub const AUTO_MIN_USABLE_DIM: usize = 16;

/// Upper bound on the automatically chosen level count.
pub const MAX_AUTO_LEVELS: usize = 7;

/// Upper bound on any requested level count.
pub const MAX_LEVELS: usize = 16;

/// Pixels a global Newton-Raphson step needs before it moves the estimate.
pub const MIN_SOLVER_SUPPORT: usize = 32;

/// Newton-Raphson sub-iterations per pyramid level.
pub const DEFAULT_ITERATIONS: usize = 7;

/// Squared gradient magnitude below which the global solver skips a pixel.
pub const DEFAULT_GLOBAL_GRADIENT_THRESHOLD: f32 = 1e-4;

/// Squared gradient magnitude below which the dense solver skips a pixel.
pub const DEFAULT_DENSE_GRADIENT_THRESHOLD: f32 = 5e-4;

/// Largest per-pixel step (pixels) the dense solver takes in one sub-iteration.
pub const DEFAULT_MAX_STEP: f32 = 0.75;

/// Added to `dx² + dy²` before taking the reciprocal gradient term.
pub const GRADIENT_EPSILON: f32 = 1e-9;

/// Frames that only seed the reference before the solver runs.
pub const DEFAULT_SEED_FRAMES: u64 = 2;

/// Pixels kept between a bilinear sample base and the edge of the valid region.
pub const SAMPLE_BORDER: usize = 2;

/// Pyramid downsample kernel: 12 taps, close to the 12-tap binomial.
pub const DEFAULT_DOWNSAMPLE_WIDTH: usize = 12;
pub const DEFAULT_DOWNSAMPLE_RADIUS: f32 = 3.3;

/// Dense field smoothing kernel applied after every sweep.
pub const DEFAULT_FIELD_SMOOTHING_WIDTH: usize = 11;
pub const DEFAULT_FIELD_SMOOTHING_RADIUS: f32 = 3.0;

/// Smallest Gaussian standard deviation used when synthesising a kernel.
pub const MIN_GAUSSIAN_SIGMA: f32 = 0.05;

/// Fixed-point precision (bits) of byte-path Gaussian weights.
pub const FIXED_POINT_BITS: u32 = 14;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Number of channels in a color frame (R, G, B).
pub const COLOR_CHANNEL_COUNT: usize = 3;

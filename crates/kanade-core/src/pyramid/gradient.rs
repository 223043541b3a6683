use serde::{Deserialize, Serialize};

use super::PyramidLevel;
use crate::consts::GRADIENT_EPSILON;

/// Per-pixel gradient term both solvers weight their updates with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradientTerm {
    /// `1 / (dx² + dy² + ε)`, multiplied into the step.
    Reciprocal,
    /// `dx² + dy²`, divided out of the step.
    #[default]
    Squared,
}

impl GradientTerm {
    #[inline]
    pub fn evaluate(&self, dx: f32, dy: f32) -> f32 {
        let mag2 = dx * dx + dy * dy;
        match self {
            Self::Reciprocal => 1.0 / (mag2 + GRADIENT_EPSILON),
            Self::Squared => mag2,
        }
    }

    /// Normalise a raw `error * gradient` product by a gradient term value.
    #[inline]
    pub fn apply(&self, value: f32, term: f32) -> Option<f32> {
        match self {
            Self::Reciprocal => Some(value * term),
            Self::Squared if term > 0.0 => Some(value / term),
            Self::Squared => None,
        }
    }
}

impl std::fmt::Display for GradientTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reciprocal => write!(f, "Reciprocal"),
            Self::Squared => write!(f, "Squared"),
        }
    }
}

const SCHARR_OUTER: f32 = 3.0 / 32.0;
const SCHARR_INNER: f32 = 10.0 / 32.0;

/// Scharr gradients of `level.current` over the level interior.
///
/// Only pixels at least `margin + 1` from every edge are written, so the
/// 3x3 stencil never reads filter border samples.
pub fn compute_gradients(level: &mut PyramidLevel, term: GradientTerm) {
    let (rows, cols) = level.interior();
    let img = &level.current;

    for y in rows {
        for x in cols.clone() {
            let v1 = img[[y - 1, x - 1]];
            let v2 = img[[y - 1, x]];
            let v3 = img[[y - 1, x + 1]];
            let v4 = img[[y, x - 1]];
            let v6 = img[[y, x + 1]];
            let v7 = img[[y + 1, x - 1]];
            let v8 = img[[y + 1, x]];
            let v9 = img[[y + 1, x + 1]];

            let dx = (v3 - v1) * SCHARR_OUTER + (v6 - v4) * SCHARR_INNER + (v9 - v7) * SCHARR_OUTER;
            let dy = (v7 - v1) * SCHARR_OUTER + (v8 - v2) * SCHARR_INNER + (v9 - v3) * SCHARR_OUTER;

            level.grad_x[[y, x]] = dx;
            level.grad_y[[y, x]] = dy;
            level.grad_term[[y, x]] = term.evaluate(dx, dy);
        }
    }
}

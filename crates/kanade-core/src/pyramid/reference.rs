use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

/// How each level's reference image follows the incoming frames.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ReferencePolicy {
    /// `reference = reference * longevity + current * (1 - longevity)`.
    ExponentialAverage { longevity: f32 },
    /// `reference = current`: pure frame-to-frame tracking.
    Snapshot,
}

impl Default for ReferencePolicy {
    fn default() -> Self {
        Self::Snapshot
    }
}

impl ReferencePolicy {
    /// Blend weight of the old reference for this frame.
    pub fn longevity(&self, seeding: bool) -> f32 {
        match self {
            Self::ExponentialAverage { longevity } if !seeding => *longevity,
            _ => 0.0,
        }
    }

    /// Fold the outgoing `current` into `reference`. Runs before the new
    /// frame overwrites `current`; while `seeding` the reference is a copy.
    pub fn update(&self, reference: &mut Array2<f32>, current: &Array2<f32>, seeding: bool) {
        let longevity = self.longevity(seeding);
        if longevity == 0.0 {
            reference.assign(current);
            return;
        }
        let fresh = 1.0 - longevity;
        Zip::from(reference)
            .and(current)
            .for_each(|r, &c| *r = *r * longevity + c * fresh);
    }
}

impl std::fmt::Display for ReferencePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExponentialAverage { longevity } => {
                write!(f, "Exponential average (longevity {longevity})")
            }
            Self::Snapshot => write!(f, "Snapshot"),
        }
    }
}

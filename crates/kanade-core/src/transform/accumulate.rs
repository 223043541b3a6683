/// Leaky integrator over per-frame global estimates.
///
/// Each solved frame applies `sum = (sum + latest) * burn` per axis, so with
/// `burn < 1` old motion decays and drift stays bounded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Accumulator {
    sum_hx: f32,
    sum_hy: f32,
    burn_x: f32,
    burn_y: f32,
}

impl Accumulator {
    pub fn new(burn_x: f32, burn_y: f32) -> Self {
        Self {
            sum_hx: 0.0,
            sum_hy: 0.0,
            burn_x,
            burn_y,
        }
    }

    pub fn update(&mut self, hx: f32, hy: f32) {
        self.sum_hx = (self.sum_hx + hx) * self.burn_x;
        self.sum_hy = (self.sum_hy + hy) * self.burn_y;
    }

    pub fn sum(&self) -> (f32, f32) {
        (self.sum_hx, self.sum_hy)
    }

    /// Shift that undoes the accumulated motion.
    pub fn correction(&self) -> (f32, f32) {
        (-self.sum_hx, -self.sum_hy)
    }

    pub fn burn(&self) -> (f32, f32) {
        (self.burn_x, self.burn_y)
    }

    pub fn set_burn(&mut self, burn_x: f32, burn_y: f32) {
        self.burn_x = burn_x;
        self.burn_y = burn_y;
    }

    pub fn reset(&mut self) {
        self.sum_hx = 0.0;
        self.sum_hy = 0.0;
    }
}

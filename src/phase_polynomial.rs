use crate::motion_state::MotionState;

/// Quintic smoothstep `10u³ - 15u⁴ + 6u⁵`: 0 → 1 on `[0, 1]` with zero
/// first and second derivative at both ends.
pub fn smoothstep(u: f64) -> f64 {
    u * u * u * (10.0 + u * (-15.0 + 6.0 * u))
}

/// `∫₀ᵘ smoothstep`, equal to 1/2 at `u = 1`.
pub fn smoothstep_integral(u: f64) -> f64 {
    let u2 = u * u;
    u2 * u2 * (2.5 + u * (-3.0 + u))
}

/// `∫₀ᵘ ∫₀ˢ smoothstep`, equal to 1/7 at `u = 1`.
pub fn smoothstep_double_integral(u: f64) -> f64 {
    let u2 = u * u;
    u2 * u2 * u * (0.5 + u * (-0.5 + u / 7.0))
}

/// Shape of the acceleration inside one phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PhaseShape {
    /// Zero acceleration.
    #[default]
    Cruise,
    /// Quintic ramp from 0 to the peak acceleration.
    RampUp,
    /// Constant peak acceleration.
    Hold,
    /// Quintic ramp from the peak acceleration back to 0.
    RampDown,
}

/// Which end of the phase the stored position/velocity belong to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Anchor {
    #[default]
    Start,
    End,
}

/// Describes a single phase of a segment profile in closed form.
///
/// `pos`/`vel` are the state at the anchor end, `acc` is the peak
/// acceleration of the phase (signed).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhasePolynomial {
    pub start: f64,
    pub duration: f64,
    pub pos: f64,
    pub vel: f64,
    pub acc: f64,
    pub shape: PhaseShape,
    pub anchor: Anchor,
}

impl PhasePolynomial {
    pub fn new(
        start: f64,
        duration: f64,
        anchor_state: (f64, f64),
        acc: f64,
        shape: PhaseShape,
        anchor: Anchor,
    ) -> Self {
        Self {
            start,
            duration,
            pos: anchor_state.0,
            vel: anchor_state.1,
            acc,
            shape,
            anchor,
        }
    }

    /// Evaluates the phase at absolute time `t`, clamped into the phase.
    pub fn eval(&self, t: f64) -> MotionState {
        let duration = self.duration.max(0.0);
        match self.anchor {
            Anchor::Start => {
                let tau = (t - self.start).clamp(0.0, duration);
                self.eval_forward(tau, duration)
            }
            Anchor::End => {
                let sigma = (self.start + duration - t).clamp(0.0, duration);
                self.eval_backward(sigma, duration)
            }
        }
    }

    /// State at the end opposite to the anchor.
    pub fn far_state(&self) -> (f64, f64) {
        let state = match self.anchor {
            Anchor::Start => self.eval_forward(self.duration, self.duration),
            Anchor::End => self.eval_backward(self.duration, self.duration),
        };
        (state.pos, state.vel)
    }

    fn eval_forward(&self, tau: f64, duration: f64) -> MotionState {
        let (s0, v0, peak) = (self.pos, self.vel, self.acc);
        let u = if duration > 0.0 { tau / duration } else { 0.0 };
        let d2 = duration * duration;

        match self.shape {
            PhaseShape::Cruise => MotionState::new(s0 + v0 * tau, v0, 0.0),
            PhaseShape::Hold => {
                // s = s0 + v0*t + a*t^2/2
                MotionState::new(
                    s0 + v0 * tau + 0.5 * peak * tau * tau,
                    v0 + peak * tau,
                    peak,
                )
            }
            PhaseShape::RampUp => MotionState::new(
                s0 + v0 * tau + peak * d2 * smoothstep_double_integral(u),
                v0 + peak * duration * smoothstep_integral(u),
                peak * smoothstep(u),
            ),
            PhaseShape::RampDown => MotionState::new(
                s0 + v0 * tau + peak * d2 * (0.5 * u * u - smoothstep_double_integral(u)),
                v0 + peak * duration * (u - smoothstep_integral(u)),
                peak * (1.0 - smoothstep(u)),
            ),
        }
    }

    // Integrates from the end of the phase backwards; `sigma` is the time
    // remaining until the phase ends. Reversing time turns a ramp-down into
    // a ramp-up shape and vice versa.
    fn eval_backward(&self, sigma: f64, duration: f64) -> MotionState {
        let (s1, v1, peak) = (self.pos, self.vel, self.acc);
        let w = if duration > 0.0 { sigma / duration } else { 0.0 };
        let d2 = duration * duration;

        match self.shape {
            PhaseShape::Cruise => MotionState::new(s1 - v1 * sigma, v1, 0.0),
            PhaseShape::Hold => MotionState::new(
                s1 - v1 * sigma + 0.5 * peak * sigma * sigma,
                v1 - peak * sigma,
                peak,
            ),
            PhaseShape::RampDown => MotionState::new(
                s1 - v1 * sigma + peak * d2 * smoothstep_double_integral(w),
                v1 - peak * duration * smoothstep_integral(w),
                peak * smoothstep(w),
            ),
            PhaseShape::RampUp => MotionState::new(
                s1 - v1 * sigma + peak * d2 * (0.5 * w * w - smoothstep_double_integral(w)),
                v1 - peak * duration * (w - smoothstep_integral(w)),
                peak * (1.0 - smoothstep(w)),
            ),
        }
    }
}

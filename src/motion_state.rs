#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Position, velocity and acceleration of an axis at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionState {
    pub pos: f64,
    pub vel: f64,
    pub acc: f64,
}

impl MotionState {
    pub fn new(pos: f64, vel: f64, acc: f64) -> Self {
        Self { pos, vel, acc }
    }

    pub fn at_rest(pos: f64) -> Self {
        Self::new(pos, 0.0, 0.0)
    }
}

/// A sampled trajectory point as handed to plotting or control code.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    pub time: f64,
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

impl Sample {
    pub fn from_state(time: f64, state: MotionState) -> Self {
        Self {
            time,
            position: state.pos,
            velocity: state.vel,
            acceleration: state.acc,
        }
    }
}

/// Waypoint input record. Missing velocities are synthesized by the
/// chain; missing accelerations default to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Waypoint {
    pub time: f64,
    pub position: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub velocity: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub acceleration: Option<f64>,
}

impl Waypoint {
    pub fn new(time: f64, position: f64) -> Self {
        Self {
            time,
            position,
            velocity: None,
            acceleration: None,
        }
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_acceleration(mut self, acceleration: f64) -> Self {
        self.acceleration = Some(acceleration);
        self
    }

    pub fn state(&self) -> MotionState {
        MotionState::new(
            self.position,
            self.velocity.unwrap_or(0.0),
            self.acceleration.unwrap_or(0.0),
        )
    }
}

//! # trapezoid_motion
//!
//! A small library for planning smoothed trapezoidal motion profiles
//! through timed waypoints in Rust.
//!
//! This library provides the following modules:
//! - `time_series` for an ordered `(time, value)` container with cached intervals.
//! - `motion_state` for the plain value types passed in and out of the planner.
//! - `segment_limits` for per-segment kinematic limits.
//! - `velocity_smoother` for synthesizing waypoint velocities from positions.
//! - `phase_polynomial` for closed-form evaluation of a single profile phase.
//! - `segment_profile` for solving the seven-phase profile of one segment.
//! - `profile_chain` for chaining segments through a list of waypoints.
//! - `profile_executor` for sampling a planned chain in discrete ticks.
//! - `errors` for the error types of all of the above.
//!
//! Author: Anton Khrustalev, creapunk

pub mod errors;
pub mod motion_state;
pub mod phase_polynomial;
pub mod profile_chain;
pub mod profile_executor;
pub mod segment_limits;
pub mod segment_profile;
pub mod time_series;
pub mod velocity_smoother;

// Re-export main structs for convenience:
pub use errors::*;
pub use motion_state::*;
pub use profile_chain::*;
pub use profile_executor::*;
pub use segment_limits::*;
pub use segment_profile::*;
pub use time_series::*;
pub use velocity_smoother::*;

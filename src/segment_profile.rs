use tracing::{debug, trace, warn};

use crate::errors::{ProfileError, ProfileResult};
use crate::motion_state::MotionState;
use crate::phase_polynomial::{Anchor, PhasePolynomial, PhaseShape};
use crate::segment_limits::SegmentLimits;

/// Outcome of the closed-form boundary tests for one cruise direction.
///
/// The tests look at the peak profile (ramp towards the cruise speed, then
/// ramp to the final speed) seen from a frame whose positive axis is the
/// assumed direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reachability {
    Reachable,
    /// The kinematic area balance has no real cruise speed.
    NegativeBalance,
    /// Slowing from the initial speed alone already carries past the goal.
    InitialOvershoot,
    /// The final speed cannot be built up within the displacement.
    FinalUnreachable,
    /// One boundary speed points against the assumed direction and the
    /// single ramp through zero speed between them needs more than the
    /// displacement.
    RampReversal,
}

/// Boundary values of one move: `(start, end)` pairs.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Move {
    pos: (f64, f64),
    vel: (f64, f64),
}

impl Move {
    fn displacement(&self) -> f64 {
        self.pos.1 - self.pos.0
    }

    /// `(displacement, v0, vf)` seen from a frame whose positive axis is `sign`.
    fn in_direction(&self, sign: f64) -> (f64, f64, f64) {
        (sign * self.displacement(), sign * self.vel.0, sign * self.vel.1)
    }
}

/// Acceleration magnitudes actually driven, with the seconds each ramp takes
/// per unit of velocity change (`ka`, `kd`).
#[derive(Clone, Copy, Debug, PartialEq)]
struct Ramps {
    accel: f64,
    decel: f64,
    ka: f64,
    kd: f64,
}

impl Ramps {
    fn new(accel: f64, decel: f64, limits: &SegmentLimits) -> Self {
        Self {
            accel,
            decel,
            ka: (1.0 + limits.accel_round_frac) / accel,
            kd: (1.0 + limits.decel_round_frac) / decel,
        }
    }
}

/// Cruise speed, ramp directions and cruise time of one candidate profile.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Plan {
    v_max: f64,
    sign_a: f64,
    sign_d: f64,
    cruise: f64,
    ramps: Ramps,
    duration: f64,
}

impl Plan {
    fn new(mv: &Move, ramps: Ramps, v_max: f64, signs: (f64, f64), cruise: f64) -> Self {
        let duration =
            ramps.ka * (v_max - mv.vel.0).abs() + cruise + ramps.kd * (mv.vel.1 - v_max).abs();
        Self {
            v_max,
            sign_a: signs.0,
            sign_d: signs.1,
            cruise,
            ramps,
            duration,
        }
    }

    /// Distance covered: each ramp travels at the mean of its end speeds.
    fn displacement(&self, mv: &Move) -> f64 {
        let (v0, vf) = mv.vel;
        0.5 * (v0 + self.v_max) * self.ramps.ka * (self.v_max - v0).abs()
            + self.v_max * self.cruise
            + 0.5 * (self.v_max + vf) * self.ramps.kd * (vf - self.v_max).abs()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Solution {
    breakpoints: [f64; 8],
    states: [(f64, f64); 6],
    phases: [PhasePolynomial; 7],
    sign_a: f64,
    sign_d: f64,
    v_max: f64,
    accel: f64,
    decel: f64,
    no_movement: bool,
    fastest: bool,
}

/// Seven-phase ("5-2-5-1-5-2-5") velocity profile for a single move.
///
/// Phases 1-3 change the speed from `v0` to the cruise speed with a quintic
/// ramp, a constant acceleration and a quintic ramp back to zero
/// acceleration; phase 4 cruises; phases 5-7 mirror 1-3 towards `vf` with
/// the deceleration limit.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentProfile {
    /// Kinematic limits for this segment.
    limits: SegmentLimits,

    /// (t0, tf) as passed to the last `generate` call. `tf == 0` requests
    /// the fastest profile.
    time: (f64, f64),

    /// (pos_init, pos_exit)
    pos: (f64, f64),

    /// (vel_init, vel_exit)
    vel: (f64, f64),

    /// Present only after a successful `generate`.
    solution: Option<Solution>,
}

impl Default for SegmentProfile {
    fn default() -> Self {
        SegmentProfile {
            limits: SegmentLimits::default(),
            time: (0.0, 0.0),
            pos: (0.0, 0.0),
            vel: (0.0, 0.0),
            solution: None,
        }
    }
}

impl SegmentProfile {
    // Positions/velocities closer than this count as equal for the
    // no-movement check.
    const REST_TOLERANCE: f64 = 1e-12;
    // Slack on duration comparisons, in seconds.
    const TIME_TOLERANCE: f64 = 1e-12;
    // Relative slack on the displacement reached by a fixed-duration solve.
    const DISPLACEMENT_TOLERANCE: f64 = 1e-12;
    // Relative slack on the boundary tests and ramp direction checks.
    const BALANCE_TOLERANCE: f64 = 1e-12;
    const DIRECTION_TOLERANCE: f64 = 1e-9;
    /// Sampling slack past the final breakpoint.
    pub const SAMPLE_EPSILON: f64 = 1e-9;

    /// Creates an unsolved profile after validating `limits`.
    pub fn new(limits: SegmentLimits) -> ProfileResult<Self> {
        limits.validate()?;
        Ok(SegmentProfile {
            limits,
            ..Default::default()
        })
    }

    /// Solves the profile for the given boundary values.
    ///
    /// With `tf == 0` the fastest profile is built and its end time is
    /// `t0 + duration`. Otherwise the profile finishes exactly at `tf`,
    /// which must not be earlier than the fastest profile allows.
    ///
    /// When `x0 == xf` and `v0 == vf != 0` the fastest profile passes
    /// through at that speed without any ramp, so its duration is zero.
    ///
    /// On error the profile is left unsolved. Returns the duration.
    pub fn generate(
        &mut self,
        t0: f64,
        tf: f64,
        x0: f64,
        xf: f64,
        v0: f64,
        vf: f64,
    ) -> ProfileResult<f64> {
        self.solution = None;
        Self::validate_times(t0, tf)?;
        self.validate_boundary(x0, xf, v0, vf)?;

        self.time = (t0, tf);
        self.pos = (x0, xf);
        self.vel = (v0, vf);
        let mv = Move {
            pos: self.pos,
            vel: self.vel,
        };
        let explicit = tf != 0.0;

        if (xf - x0).abs() <= Self::REST_TOLERANCE
            && v0.abs() <= Self::REST_TOLERANCE
            && vf.abs() <= Self::REST_TOLERANCE
        {
            let end = if explicit { tf } else { t0 };
            self.solution = Some(Solution::at_rest(t0, end, x0));
            debug!(t0, end, pos = x0, "segment has no movement");
            return Ok(end - t0);
        }

        let initial = initial_direction(&mv, explicit);
        let full = Ramps::new(self.limits.accel_limit, self.limits.decel_limit, &self.limits);
        let requested = if explicit { tf - t0 } else { 0.0 };

        let fastest = fastest_plan(&mv, full, self.limits.vel_limit, initial).ok_or(
            ProfileError::Unreachable {
                requested,
                fastest: f64::INFINITY,
                reason: "no feasible profile at full limits",
            },
        )?;

        let (plan, end, is_fastest) = if !explicit {
            (fastest, t0 + fastest.duration, true)
        } else if requested < fastest.duration - Self::TIME_TOLERANCE {
            return Err(ProfileError::Unreachable {
                requested,
                fastest: fastest.duration,
                reason: "requested duration is shorter than the fastest profile",
            });
        } else if requested <= fastest.duration + Self::TIME_TOLERANCE {
            (fastest, tf, true)
        } else {
            (self.explicit_plan(&mv, requested, &fastest, initial)?, tf, false)
        };

        let solution = Solution::build(t0, end, &mv, &plan, &self.limits, is_fastest);
        debug!(
            t0,
            end,
            v_max = plan.v_max,
            sign_a = solution.sign_a,
            sign_d = solution.sign_d,
            fastest = is_fastest,
            "segment profile generated"
        );
        self.solution = Some(solution);
        Ok(end - t0)
    }

    /// Position, velocity and acceleration at absolute time `t`.
    pub fn sample(&self, t: f64) -> ProfileResult<MotionState> {
        let solution = self.solution.as_ref().ok_or(ProfileError::NotGenerated)?;
        if solution.no_movement {
            return Ok(MotionState::at_rest(self.pos.0));
        }

        let bp = &solution.breakpoints;
        if !(t >= bp[0] && t <= bp[7] + Self::SAMPLE_EPSILON) {
            return Err(ProfileError::TimeOutOfRange {
                time: t,
                start: bp[0],
                end: bp[7],
            });
        }
        let index = (0..7).find(|&i| t < bp[i + 1]).unwrap_or(6);
        Ok(solution.phases[index].eval(t))
    }

    // -----------------------------------------------------------------
    //  Getter methods for SegmentProfile
    // -----------------------------------------------------------------

    pub fn limits(&self) -> &SegmentLimits {
        &self.limits
    }

    /// Replaces the limits; the profile becomes unsolved.
    pub fn set_limits(&mut self, limits: SegmentLimits) -> ProfileResult<()> {
        limits.validate()?;
        self.limits = limits;
        self.solution = None;
        Ok(())
    }

    /// Get the requested `(t0, tf)`; `tf == 0` marks a fastest request.
    pub fn get_time(&self) -> (f64, f64) {
        self.time
    }

    /// Get boundary positions `(pos_init, pos_exit)`.
    pub fn get_pos(&self) -> (f64, f64) {
        self.pos
    }

    /// Get boundary velocities `(vel_init, vel_exit)`.
    pub fn get_vel(&self) -> (f64, f64) {
        self.vel
    }

    pub fn is_generated(&self) -> bool {
        self.solution.is_some()
    }

    pub fn is_no_movement(&self) -> bool {
        self.solution.map_or(false, |s| s.no_movement)
    }

    /// True when the profile runs at full limits (no slower finish time was
    /// requested, or the requested one equals the fastest).
    pub fn is_fastest(&self) -> bool {
        self.solution.map_or(false, |s| s.fastest)
    }

    /// `t0..t7`.
    pub fn breakpoints(&self) -> ProfileResult<[f64; 8]> {
        Ok(self.solved()?.breakpoints)
    }

    /// `(pos, vel)` at `t1..t6`.
    pub fn waypoint_states(&self) -> ProfileResult<[(f64, f64); 6]> {
        Ok(self.solved()?.states)
    }

    pub fn phases(&self) -> ProfileResult<[PhasePolynomial; 7]> {
        Ok(self.solved()?.phases)
    }

    pub fn sign_a(&self) -> ProfileResult<f64> {
        Ok(self.solved()?.sign_a)
    }

    pub fn sign_d(&self) -> ProfileResult<f64> {
        Ok(self.solved()?.sign_d)
    }

    /// Signed cruise velocity.
    pub fn v_max(&self) -> ProfileResult<f64> {
        Ok(self.solved()?.v_max)
    }

    /// Acceleration magnitude used in phases 1-3 (after any scaling).
    pub fn accel(&self) -> ProfileResult<f64> {
        Ok(self.solved()?.accel)
    }

    /// Acceleration magnitude used in phases 5-7 (after any scaling).
    pub fn decel(&self) -> ProfileResult<f64> {
        Ok(self.solved()?.decel)
    }

    pub fn start_time(&self) -> ProfileResult<f64> {
        Ok(self.solved()?.breakpoints[0])
    }

    pub fn end_time(&self) -> ProfileResult<f64> {
        Ok(self.solved()?.breakpoints[7])
    }

    pub fn duration(&self) -> ProfileResult<f64> {
        let bp = self.solved()?.breakpoints;
        Ok(bp[7] - bp[0])
    }

    // -----------------------------------------------------------------------------------------
    // Below are helper methods for internal calculations:
    // -----------------------------------------------------------------------------------------

    fn solved(&self) -> ProfileResult<&Solution> {
        self.solution.as_ref().ok_or(ProfileError::NotGenerated)
    }

    fn validate_times(t0: f64, tf: f64) -> ProfileResult<()> {
        let valid = t0.is_finite()
            && tf.is_finite()
            && t0 >= 0.0
            && tf >= 0.0
            && (tf == 0.0 || t0 <= tf);
        if valid {
            Ok(())
        } else {
            Err(ProfileError::InvalidTime { t0, tf })
        }
    }

    fn validate_boundary(&self, x0: f64, xf: f64, v0: f64, vf: f64) -> ProfileResult<()> {
        for (name, value) in [("x0", x0), ("xf", xf), ("v0", v0), ("vf", vf)] {
            if !value.is_finite() {
                return Err(ProfileError::InvalidBoundary { name, value });
            }
        }
        let limit = self.limits.vel_limit;
        for velocity in [v0, vf] {
            if velocity.abs() > limit {
                return Err(ProfileError::BoundaryVelocityExceedsLimit { velocity, limit });
            }
        }
        Ok(())
    }

    /// Ramps used for a slower-than-fastest finish.
    ///
    /// The acceleration limits are pulled towards their floor by
    /// `(fastest / requested)²`. When the fastest profile under the scaled
    /// limits cannot meet `requested` the full limits are kept.
    fn explicit_ramps(&self, mv: &Move, requested: f64, fastest: &Plan, initial: f64) -> Ramps {
        let limits = &self.limits;
        let ratio = (fastest.duration / requested).powi(2);
        let accel = limits.accel_floor() + (limits.accel_limit - limits.accel_floor()) * ratio;
        let decel = limits.decel_floor() + (limits.decel_limit - limits.decel_floor()) * ratio;
        let scaled = Ramps::new(accel, decel, limits);

        match fastest_plan(mv, scaled, limits.vel_limit, initial) {
            Some(plan) if plan.duration <= requested + Self::TIME_TOLERANCE => scaled,
            _ => {
                warn!(
                    accel,
                    decel,
                    requested,
                    "scaled limits cannot meet the requested duration, using full limits"
                );
                fastest.ramps
            }
        }
    }

    /// Slower-than-fastest profile finishing in exactly `requested` seconds.
    ///
    /// Each (sign_a, sign_d) combination is tried, starting from the
    /// initially assumed direction, and the first consistent cruise speed
    /// within the velocity limit wins.
    fn explicit_plan(
        &self,
        mv: &Move,
        requested: f64,
        fastest: &Plan,
        initial: f64,
    ) -> ProfileResult<Plan> {
        let ramps = self.explicit_ramps(mv, requested, fastest, initial);

        let s = initial;
        let mut plans = Vec::new();
        for signs in [(s, -s), (s, s), (-s, -s), (-s, s)] {
            let found = fixed_duration_plans(mv, ramps, requested, signs);
            if found.is_empty() {
                trace!(
                    sign_a = signs.0,
                    sign_d = signs.1,
                    "sign combination has no consistent cruise speed"
                );
            }
            plans.extend(found);
        }

        within_velocity_limit(&plans, self.limits.vel_limit)?.ok_or(ProfileError::Unreachable {
            requested,
            fastest: fastest.duration,
            reason: "no acceleration/deceleration sign combination fits the requested duration",
        })
    }
}

impl Solution {
    fn at_rest(t0: f64, end: f64, pos: f64) -> Self {
        let breakpoints = [t0, t0, t0, t0, t0, t0, t0, end];
        let cruise = PhasePolynomial::new(
            t0,
            end - t0,
            (pos, 0.0),
            0.0,
            PhaseShape::Cruise,
            Anchor::Start,
        );
        Solution {
            breakpoints,
            states: [(pos, 0.0); 6],
            phases: [cruise; 7],
            sign_a: 1.0,
            sign_d: -1.0,
            v_max: 0.0,
            accel: 0.0,
            decel: 0.0,
            no_movement: true,
            fastest: false,
        }
    }

    /// Lays out the seven phases between `t0` and `t7`.
    ///
    /// Phases 1-3 are integrated forward from the initial state and 5-7
    /// backward from the final state, so both boundary states are reproduced
    /// exactly; the cruise phase absorbs any rounding between the two halves.
    fn build(
        t0: f64,
        t7: f64,
        mv: &Move,
        plan: &Plan,
        limits: &SegmentLimits,
        fastest: bool,
    ) -> Self {
        let (x0, xf) = mv.pos;
        let (v0, vf) = mv.vel;
        let (ramps, v_max) = (plan.ramps, plan.v_max);

        let dv_a = (v_max - v0).abs();
        let dv_d = (vf - v_max).abs();
        let sign_a = if dv_a > 0.0 { (v_max - v0).signum() } else { plan.sign_a };
        let sign_d = if dv_d > 0.0 { (vf - v_max).signum() } else { plan.sign_d };

        let round_a = limits.accel_round_frac * dv_a / ramps.accel;
        let hold_a = (1.0 - limits.accel_round_frac) * dv_a / ramps.accel;
        let round_d = limits.decel_round_frac * dv_d / ramps.decel;
        let hold_d = (1.0 - limits.decel_round_frac) * dv_d / ramps.decel;

        let t1 = t0 + round_a;
        let t2 = t1 + hold_a;
        let t3 = t2 + round_a;
        let t6 = t7 - round_d;
        let t5 = t6 - hold_d;
        let t4 = (t5 - round_d).max(t3);
        let t5 = t5.max(t4);
        let t6 = t6.max(t5);

        let acc_a = sign_a * ramps.accel;
        let acc_d = sign_d * ramps.decel;

        let forward = |start: f64, end: f64, state, shape| {
            PhasePolynomial::new(start, end - start, state, acc_a, shape, Anchor::Start)
        };
        let backward = |start: f64, end: f64, state, shape| {
            PhasePolynomial::new(start, end - start, state, acc_d, shape, Anchor::End)
        };

        let p1 = forward(t0, t1, (x0, v0), PhaseShape::RampUp);
        let s1 = p1.far_state();
        let p2 = forward(t1, t2, s1, PhaseShape::Hold);
        let s2 = p2.far_state();
        let p3 = forward(t2, t3, s2, PhaseShape::RampDown);
        let s3 = p3.far_state();

        let p7 = backward(t6, t7, (xf, vf), PhaseShape::RampDown);
        let s6 = p7.far_state();
        let p6 = backward(t5, t6, s6, PhaseShape::Hold);
        let s5 = p6.far_state();
        let p5 = backward(t4, t5, s5, PhaseShape::RampUp);
        let s4 = p5.far_state();

        let p4 = PhasePolynomial::new(t3, t4 - t3, s3, 0.0, PhaseShape::Cruise, Anchor::Start);

        Solution {
            breakpoints: [t0, t1, t2, t3, t4, t5, t6, t7],
            states: [s1, s2, s3, s4, s5, s6],
            phases: [p1, p2, p3, p4, p5, p6, p7],
            sign_a,
            sign_d,
            v_max,
            accel: ramps.accel,
            decel: ramps.decel,
            no_movement: false,
            fastest,
        }
    }
}

/// Direction first assumed for the cruise phase.
///
/// Follows the displacement; for equal positions the larger boundary speed
/// decides, reversed when a finish time was requested (that case is settled
/// by the sign search anyway).
fn initial_direction(mv: &Move, explicit: bool) -> f64 {
    let dx = mv.displacement();
    if dx.abs() > SegmentProfile::REST_TOLERANCE {
        return dx.signum();
    }
    let (v0, vf) = mv.vel;
    let dominant = if v0.abs() >= vf.abs() { v0 } else { vf };
    let sign = if dominant >= 0.0 { 1.0 } else { -1.0 };
    if explicit {
        -sign
    } else {
        sign
    }
}

/// Boundary tests for the peak profile in the frame of the assumed
/// direction (`x`, `v0`, `vf` already multiplied by the direction sign).
///
/// A peak exists exactly when the area balance is non-negative and its root
/// is not below either boundary speed. The root falls below `v0` when a
/// single braking ramp from `v0` to `vf` already covers more than `x`, and
/// below `vf` when a single ramp building up `vf` does.
fn classify(x: f64, v0: f64, vf: f64, ramps: &Ramps) -> Reachability {
    let (ka, kd) = (ramps.ka, ramps.kd);
    let magnitude = 2.0 * x.abs() + ka * v0 * v0 + kd * vf * vf;
    let tol = SegmentProfile::BALANCE_TOLERANCE * (1.0 + magnitude);

    let balance = 2.0 * x + ka * v0 * v0 + kd * vf * vf;
    if balance < -tol {
        return Reachability::NegativeBalance;
    }
    if v0 > 0.0 && 2.0 * x < kd * (v0 * v0 - vf * vf) - tol {
        return if vf < 0.0 {
            Reachability::RampReversal
        } else {
            Reachability::InitialOvershoot
        };
    }
    if vf > 0.0 && 2.0 * x < ka * (vf * vf - v0 * v0) - tol {
        return if v0 < 0.0 {
            Reachability::RampReversal
        } else {
            Reachability::FinalUnreachable
        };
    }
    Reachability::Reachable
}

/// Peak profiles (ramp up to the cruise speed, ramp down to `vf`) in the
/// frame of `sign`.
///
/// The upper root of the area balance is gated by [`classify`] and clamped
/// to the velocity limit with a cruise phase. The lower root is a peak
/// below zero in this frame (slow down, then speed up again) and is kept
/// whenever it still lies above both boundary speeds.
fn peak_candidates(
    mv: &Move,
    sign: f64,
    ramps: Ramps,
    vel_limit: f64,
) -> (Reachability, Vec<Plan>) {
    let (x, v0, vf) = mv.in_direction(sign);
    let (ka, kd) = (ramps.ka, ramps.kd);
    let reach = classify(x, v0, vf, &ramps);
    let mut plans = Vec::with_capacity(2);

    let balance = 2.0 * x + ka * v0 * v0 + kd * vf * vf;
    let root = (balance.max(0.0) / (ka + kd)).sqrt();
    let floor = v0.max(vf);

    if reach == Reachability::Reachable {
        let mut v_max = root.max(floor);
        let mut cruise = 0.0;
        if v_max > vel_limit {
            v_max = vel_limit;
            let vl2 = v_max * v_max;
            let ramp_distance = 0.5 * ka * (vl2 - v0 * v0) + 0.5 * kd * (vl2 - vf * vf);
            cruise = ((x - ramp_distance) / v_max).max(0.0);
        }
        plans.push(Plan::new(mv, ramps, sign * v_max, (sign, -sign), cruise));
    }

    if reach != Reachability::NegativeBalance && root > 0.0 {
        let tol = SegmentProfile::DIRECTION_TOLERANCE * (1.0 + v0.abs() + vf.abs());
        if -root >= floor - tol {
            let v_max = (-root).max(floor);
            plans.push(Plan::new(mv, ramps, sign * v_max, (sign, -sign), 0.0));
        }
    }
    (reach, plans)
}

/// Profile whose ramps both move the speed the same way (`v0 → v_max → vf`
/// monotonic, no cruise). Needed when asymmetric limits leave a gap
/// between the displacements covered by peak and valley profiles.
fn monotone_candidate(mv: &Move, ramps: Ramps) -> Option<Plan> {
    let (v0, vf) = mv.vel;
    if v0 == vf {
        return None;
    }
    let (ka, kd) = (ramps.ka, ramps.kd);
    let denom = ka - kd;
    if denom.abs() <= f64::EPSILON * (ka + kd) {
        return None;
    }

    let sigma = (vf - v0).signum();
    let squared = (2.0 * sigma * mv.displacement() + ka * v0 * v0 - kd * vf * vf) / denom;
    if squared < 0.0 {
        return None;
    }

    let root = squared.sqrt();
    let (lo, hi) = (v0.min(vf), v0.max(vf));
    let tol = SegmentProfile::DIRECTION_TOLERANCE * (1.0 + lo.abs() + hi.abs());
    [root, -root]
        .into_iter()
        .filter(|v| *v >= lo - tol && *v <= hi + tol)
        .map(|v| Plan::new(mv, ramps, v.clamp(lo, hi), (sigma, sigma), 0.0))
        .min_by(|a, b| a.duration.total_cmp(&b.duration))
}

/// Minimum-duration profile under `ramps`.
///
/// Starts from the peak profile in the `initial` direction; when the
/// boundary tests reject it the direction is flipped. All surviving
/// candidates (both directions, lower roots, the monotone fallback) are
/// compared and the shortest wins, ties going to the initial direction.
fn fastest_plan(mv: &Move, ramps: Ramps, vel_limit: f64, initial: f64) -> Option<Plan> {
    let mut candidates = Vec::with_capacity(5);

    let (reach, plans) = peak_candidates(mv, initial, ramps, vel_limit);
    if reach != Reachability::Reachable {
        debug!(?reach, direction = initial, "initial direction unreachable, flipping");
    }
    candidates.extend(plans);

    let (reach_flipped, plans) = peak_candidates(mv, -initial, ramps, vel_limit);
    trace!(?reach_flipped, direction = -initial, "reverse direction classified");
    candidates.extend(plans);

    candidates.extend(monotone_candidate(mv, ramps));
    candidates
        .into_iter()
        .min_by(|a, b| a.duration.total_cmp(&b.duration))
}

/// Cruise speeds and cruise times consuming exactly `duration` and the
/// move's displacement for one fixed pair of ramp directions, smallest
/// `|v_max|` first.
///
/// Eliminating the cruise time from the duration and displacement balances
/// leaves `a·v² + b·v + c = 0` in the cruise speed.
fn fixed_duration_plans(mv: &Move, ramps: Ramps, duration: f64, signs: (f64, f64)) -> Vec<Plan> {
    let (sa, sd) = signs;
    let (v0, vf) = mv.vel;
    let (ka, kd) = (ramps.ka, ramps.kd);
    let x = mv.displacement();

    let a = 0.5 * (sd * kd - sa * ka);
    let b = duration + sa * ka * v0 - sd * kd * vf;
    let c = 0.5 * (sd * kd * vf * vf - sa * ka * v0 * v0) - x;

    let mut roots = solve_quadratic(a, b, c);
    roots.sort_by(|p, q| p.abs().total_cmp(&q.abs()));

    let speed_tol = SegmentProfile::DIRECTION_TOLERANCE * (1.0 + v0.abs() + vf.abs());
    roots
        .into_iter()
        .filter_map(|v_max| {
            if sa * (v_max - v0) < -speed_tol || sd * (vf - v_max) < -speed_tol {
                return None;
            }
            let cruise = duration - ka * (v_max - v0).abs() - kd * (vf - v_max).abs();
            if cruise < -SegmentProfile::TIME_TOLERANCE * (1.0 + duration) {
                return None;
            }
            let plan = Plan::new(mv, ramps, v_max, signs, cruise.max(0.0));
            let scale = 1.0 + x.abs() + (v_max * duration).abs();
            if (plan.displacement(mv) - x).abs() > SegmentProfile::DISPLACEMENT_TOLERANCE * scale {
                return None;
            }
            Some(plan)
        })
        .collect()
}

/// First plan whose cruise speed stays within `vel_limit`. Consistent plans
/// that all run faster than the limit are a `VelocityLimitExceeded` error.
fn within_velocity_limit(plans: &[Plan], vel_limit: f64) -> ProfileResult<Option<Plan>> {
    let bound = vel_limit * (1.0 + SegmentProfile::BALANCE_TOLERANCE);
    if let Some(plan) = plans.iter().find(|plan| plan.v_max.abs() <= bound) {
        return Ok(Some(*plan));
    }
    match plans.first() {
        Some(plan) => Err(ProfileError::VelocityLimitExceeded {
            v_max: plan.v_max,
            limit: vel_limit,
        }),
        None => Ok(None),
    }
}

/// Real roots of `a·x² + b·x + c`, falling back to the linear solution when
/// `a` vanishes. Uses the cancellation-free form of the quadratic formula.
pub(crate) fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    let scale = b.abs().max(c.abs());
    if a.abs() <= f64::EPSILON * scale || a == 0.0 {
        if b == 0.0 {
            return Vec::new();
        }
        return vec![-c / b];
    }

    let mut disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        if disc > -f64::EPSILON * b * b {
            disc = 0.0;
        } else {
            return Vec::new();
        }
    }
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    if q == 0.0 {
        return vec![0.0];
    }
    let (r1, r2) = (q / a, c / q);
    if r1 == r2 {
        vec![r1]
    } else {
        vec![r1, r2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EXACT: f64 = 1e-12;

    /// Boundary exactness, velocity bound and continuity at the interior
    /// breakpoints.
    fn check_profile(profile: &SegmentProfile) {
        let (x0, xf) = profile.get_pos();
        let (v0, vf) = profile.get_vel();
        let bp = profile.breakpoints().unwrap();

        let start = profile.sample(bp[0]).unwrap();
        let end = profile.sample(bp[7]).unwrap();
        assert_relative_eq!(start.pos, x0, epsilon = EXACT, max_relative = EXACT);
        assert_relative_eq!(start.vel, v0, epsilon = EXACT, max_relative = EXACT);
        assert_relative_eq!(end.pos, xf, epsilon = EXACT, max_relative = EXACT);
        assert_relative_eq!(end.vel, vf, epsilon = EXACT, max_relative = EXACT);

        for w in bp.windows(2) {
            assert!(w[0] <= w[1], "breakpoints out of order: {bp:?}");
        }

        let phases = profile.phases().unwrap();
        for i in 1..7 {
            let left = phases[i - 1].eval(bp[i]);
            let right = phases[i].eval(bp[i]);
            let scale = 1.0 + left.pos.abs() + left.vel.abs();
            assert_abs_diff_eq!(left.pos, right.pos, epsilon = 1e-9 * scale);
            assert_abs_diff_eq!(left.vel, right.vel, epsilon = 1e-9 * scale);
        }

        let limit = profile.limits().vel_limit;
        let n = 400;
        for k in 0..=n {
            let t = bp[0] + (bp[7] - bp[0]) * k as f64 / n as f64;
            let s = profile.sample(t).unwrap();
            assert!(s.vel.abs() <= limit + 1e-9, "velocity {} over limit at {t}", s.vel);
        }
    }

    #[test]
    fn sample_before_generate_fails() {
        let profile = SegmentProfile::default();
        assert_eq!(profile.sample(0.0), Err(ProfileError::NotGenerated));
        assert_eq!(profile.breakpoints(), Err(ProfileError::NotGenerated));
    }

    #[test]
    fn rest_to_rest_fastest_triangle() {
        let limits = SegmentLimits::new(2.0, 2.0, 100.0);
        let mut profile = SegmentProfile::new(limits).unwrap();
        let duration = profile.generate(0.0, 0.0, 0.0, 4.0, 0.0, 0.0).unwrap();

        // peak speed sqrt(a*x) = sqrt(8), duration 2*sqrt(x/a)
        assert_relative_eq!(duration, 2.0 * 2.0_f64.sqrt(), max_relative = 1e-12);
        assert_relative_eq!(profile.v_max().unwrap(), 8.0_f64.sqrt(), max_relative = 1e-12);
        assert!(profile.is_fastest());
        assert_eq!(profile.sign_a().unwrap(), 1.0);
        assert_eq!(profile.sign_d().unwrap(), -1.0);
        check_profile(&profile);
    }

    #[test]
    fn velocity_limit_inserts_cruise() {
        let limits = SegmentLimits::new(10.0, 5.0, 2.0);
        let mut profile = SegmentProfile::new(limits).unwrap();
        let duration = profile.generate(1.0, 0.0, 0.0, 10.0, 0.0, 0.0).unwrap();

        // ramps: 0.2s / 0.2m and 0.4s / 0.4m, cruise 9.4m at 2 m/s
        assert_relative_eq!(duration, 0.2 + 0.4 + 4.7, max_relative = 1e-12);
        assert_relative_eq!(profile.v_max().unwrap(), 2.0, max_relative = 1e-12);
        let bp = profile.breakpoints().unwrap();
        assert_eq!(bp[0], 1.0);
        assert_relative_eq!(bp[4] - bp[3], 4.7, max_relative = 1e-12);
        check_profile(&profile);
    }

    #[test]
    fn rounding_stretches_ramps_and_zeroes_edge_acceleration() {
        let limits = SegmentLimits::new(4.0, 4.0, 100.0).with_rounding(0.5, 1.0);
        let mut profile = SegmentProfile::new(limits).unwrap();
        profile.generate(0.0, 0.0, 0.0, 3.0, 0.0, 0.0).unwrap();

        let bp = profile.breakpoints().unwrap();
        // decel ramp is fully quintic: no constant-deceleration phase
        assert_abs_diff_eq!(bp[6] - bp[5], 0.0, epsilon = 1e-12);
        let start = profile.sample(bp[0]).unwrap();
        let end = profile.sample(bp[7]).unwrap();
        assert_eq!(start.acc, 0.0);
        assert_abs_diff_eq!(end.acc, 0.0, epsilon = 1e-12);
        // peak acceleration is reached inside the hold phase
        let mid_hold = profile.sample(0.5 * (bp[1] + bp[2])).unwrap();
        assert_relative_eq!(mid_hold.acc, 4.0, max_relative = 1e-12);
        check_profile(&profile);
    }

    #[test]
    fn overshooting_start_speed_reverses_direction() {
        let limits = SegmentLimits::new(1.0, 1.0, 10.0);
        let mut profile = SegmentProfile::new(limits).unwrap();
        // braking from 4 m/s needs 8m, goal is 1m ahead: go past, come back
        profile.generate(0.0, 0.0, 0.0, 1.0, 4.0, 0.0).unwrap();

        assert!(profile.v_max().unwrap() < 0.0);
        assert_eq!(profile.sign_a().unwrap(), -1.0);
        assert_eq!(profile.sign_d().unwrap(), 1.0);
        check_profile(&profile);
    }

    #[test]
    fn equal_positions_with_speed_turn_around() {
        let mut profile = SegmentProfile::default();
        profile.generate(0.0, 0.0, 5.0, 5.0, 30.0, 0.0).unwrap();
        assert!(profile.v_max().unwrap() < 0.0);
        check_profile(&profile);
    }

    #[test]
    fn asymmetric_limits_gap_uses_monotone_profile() {
        // v0 > vf, decel much weaker than accel: neither a peak nor a
        // valley fits, the speed must fall monotonically through both ramps
        let limits = SegmentLimits::new(10.0, 1.0, 20.0);
        let mut profile = SegmentProfile::new(limits).unwrap();
        // peak needs x >= (v0^2-vf^2)/(2d) = 4.5, valley needs x <= 0.45
        profile.generate(0.0, 0.0, 0.0, 2.0, 3.0, 0.0).unwrap();

        assert_eq!(profile.sign_a().unwrap(), -1.0);
        assert_eq!(profile.sign_d().unwrap(), -1.0);
        check_profile(&profile);
    }

    #[test]
    fn no_movement_freezes_state() {
        let mut profile = SegmentProfile::default();
        let duration = profile.generate(0.0, 0.0, 0.0, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(duration, 0.0);
        assert!(profile.is_no_movement());
        for t in [0.0, 0.5, 10.0] {
            assert_eq!(profile.sample(t).unwrap(), MotionState::new(0.0, 0.0, 0.0));
        }

        profile.generate(1.0, 3.0, 2.0, 2.0, 0.0, 0.0).unwrap();
        assert_eq!(profile.get_time(), (1.0, 3.0));
        assert_eq!(profile.end_time().unwrap(), 3.0);
    }

    #[test]
    fn explicit_duration_lands_on_finish_time() {
        let mut profile = SegmentProfile::default();
        let duration = profile.generate(2.0, 3.0, 0.0, 10.0, 0.0, 0.0).unwrap();
        assert_eq!(duration, 1.0);
        assert!(!profile.is_fastest());
        assert_eq!(profile.end_time().unwrap(), 3.0);
        // a long cruise near 10 m/s
        let v_max = profile.v_max().unwrap();
        assert!(v_max > 10.0 && v_max < 10.2, "v_max = {v_max}");
        check_profile(&profile);
    }

    #[test]
    fn explicit_duration_scales_limits_towards_floor() {
        let limits = SegmentLimits::new(2.0, 2.0, 100.0).with_limit_ratio(0.25);
        let mut profile = SegmentProfile::new(limits).unwrap();
        // fastest takes 2s; asking for 4s puts the accel at 0.5 + 1.5/4
        profile.generate(0.0, 4.0, 0.0, 2.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(profile.accel().unwrap(), 0.875, max_relative = 1e-12);
        assert_relative_eq!(profile.decel().unwrap(), 0.875, max_relative = 1e-12);
        check_profile(&profile);
    }

    #[test]
    fn explicit_duration_slows_down_through_valley() {
        let limits = SegmentLimits::new(10.0, 10.0, 20.0);
        let mut profile = SegmentProfile::new(limits).unwrap();
        // 3m at 5 m/s takes 0.6s; 1s forces a slowdown to sqrt(5)
        profile.generate(0.0, 1.0, 0.0, 3.0, 5.0, 5.0).unwrap();
        assert_relative_eq!(profile.v_max().unwrap(), 5.0_f64.sqrt(), max_relative = 1e-9);
        assert_eq!(profile.sign_a().unwrap(), -1.0);
        assert_eq!(profile.sign_d().unwrap(), 1.0);
        check_profile(&profile);
    }

    #[test]
    fn too_short_duration_is_unreachable() {
        let mut profile = SegmentProfile::default();
        let err = profile.generate(0.0, 0.001, 0.0, 10.0, 0.0, 100.0).unwrap_err();
        assert!(matches!(err, ProfileError::Unreachable { .. }));
        assert!(!profile.is_generated());
    }

    #[test]
    fn slow_rounded_limits_are_unreachable() {
        let limits = SegmentLimits::new(1.0, 1.0, 0.25).with_rounding(0.8, 0.8);
        let mut profile = SegmentProfile::new(limits).unwrap();
        let err = profile.generate(0.0, 0.55, -0.25, -0.10, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, ProfileError::Unreachable { .. }), "{err:?}");
    }

    #[test]
    fn failed_generate_discards_previous_solution() {
        let mut profile = SegmentProfile::default();
        profile.generate(0.0, 0.0, 0.0, 1.0, 0.0, 0.0).unwrap();
        assert!(profile.is_generated());
        assert!(profile.generate(0.0, 0.0, 0.0, 1.0, 500.0, 0.0).is_err());
        assert!(!profile.is_generated());
        assert_eq!(profile.sample(0.0), Err(ProfileError::NotGenerated));
    }

    #[test]
    fn rejects_invalid_times_and_speeds() {
        let mut profile = SegmentProfile::default();
        assert!(matches!(
            profile.generate(-1.0, 0.0, 0.0, 1.0, 0.0, 0.0),
            Err(ProfileError::InvalidTime { .. })
        ));
        assert!(matches!(
            profile.generate(2.0, 1.0, 0.0, 1.0, 0.0, 0.0),
            Err(ProfileError::InvalidTime { .. })
        ));
        assert!(matches!(
            profile.generate(0.0, 0.0, 0.0, 1.0, 0.0, 171.0),
            Err(ProfileError::BoundaryVelocityExceedsLimit { .. })
        ));
        assert!(matches!(
            profile.generate(0.0, 0.0, f64::NAN, 1.0, 0.0, 0.0),
            Err(ProfileError::InvalidBoundary { .. })
        ));
        assert!(SegmentProfile::new(SegmentLimits::new(1.0, 1.0, -1.0)).is_err());
    }

    #[test]
    fn sample_outside_range_fails() {
        let mut profile = SegmentProfile::default();
        profile.generate(1.0, 2.0, 0.0, 1.0, 0.0, 0.0).unwrap();
        assert!(matches!(
            profile.sample(0.5),
            Err(ProfileError::TimeOutOfRange { .. })
        ));
        assert!(profile.sample(2.0 + 0.5 * SegmentProfile::SAMPLE_EPSILON).is_ok());
        assert!(profile.sample(2.1).is_err());
    }

    #[test]
    fn classify_reports_each_boundary_test() {
        let ramps = Ramps::new(1.0, 1.0, &SegmentLimits::new(1.0, 1.0, 10.0));
        assert_eq!(classify(1.0, 0.0, 0.0, &ramps), Reachability::Reachable);
        assert_eq!(classify(-1.0, 0.0, 0.0, &ramps), Reachability::NegativeBalance);
        assert_eq!(classify(1.0, 4.0, 0.0, &ramps), Reachability::InitialOvershoot);
        assert_eq!(classify(1.0, 0.0, 4.0, &ramps), Reachability::FinalUnreachable);
        // braking from 4 through zero to -1 covers 7.5m, the goal is 1m ahead
        assert_eq!(classify(1.0, 4.0, -1.0, &ramps), Reachability::RampReversal);
        assert_eq!(classify(1.0, -1.0, 4.0, &ramps), Reachability::RampReversal);
    }

    #[test]
    fn classify_accepts_exactly_the_peaks_above_both_speeds() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut seen = Vec::new();
        for _ in 0..2000 {
            let (accel, decel) = (rng.gen_range(1.0..20.0), rng.gen_range(1.0..20.0));
            let limits = SegmentLimits::new(accel, decel, 50.0)
                .with_rounding(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0));
            let ramps = Ramps::new(limits.accel_limit, limits.decel_limit, &limits);
            let x = rng.gen_range(-5.0..5.0);
            let (v0, vf) = (rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));

            let balance = 2.0 * x + ramps.ka * v0 * v0 + ramps.kd * vf * vf;
            let root = (balance.max(0.0) / (ramps.ka + ramps.kd)).sqrt();
            let has_peak = balance >= 0.0 && root >= v0.max(vf);
            let reach = classify(x, v0, vf, &ramps);
            assert_eq!(reach == Reachability::Reachable, has_peak, "{x} {v0} {vf} {ramps:?}");
            if !seen.contains(&reach) {
                seen.push(reach);
            }
        }
        assert_eq!(seen.len(), 5, "{seen:?}");
    }

    #[test]
    fn fixed_duration_plans_keep_consistent_roots_only() {
        let limits = SegmentLimits::new(1.0, 1.0, 10.0);
        let ramps = Ramps::new(1.0, 1.0, &limits);
        let mv = Move {
            pos: (0.0, 10.0),
            vel: (0.0, 0.0),
        };
        // v² - 7v + 10 = 0: v = 5 would need a negative cruise time
        let plans = fixed_duration_plans(&mv, ramps, 7.0, (1.0, -1.0));
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].v_max, 2.0);
        assert_eq!(plans[0].cruise, 3.0);
        assert!(fixed_duration_plans(&mv, ramps, 7.0, (-1.0, 1.0)).is_empty());
    }

    #[test]
    fn plans_over_the_velocity_limit_are_rejected() {
        let ramps = Ramps::new(1.0, 1.0, &SegmentLimits::new(1.0, 1.0, 10.0));
        let mv = Move {
            pos: (0.0, 10.0),
            vel: (0.0, 0.0),
        };
        let plans = fixed_duration_plans(&mv, ramps, 7.0, (1.0, -1.0));

        assert_eq!(
            within_velocity_limit(&plans, 1.5),
            Err(ProfileError::VelocityLimitExceeded {
                v_max: 2.0,
                limit: 1.5,
            })
        );
        assert_eq!(within_velocity_limit(&plans, 2.5), Ok(Some(plans[0])));
        assert_eq!(within_velocity_limit(&[], 1.0), Ok(None));

        // a later plan within the limit is preferred over an earlier fast one
        let slow = Plan::new(&mv, ramps, 1.0, (1.0, -1.0), 9.0);
        assert_eq!(within_velocity_limit(&[plans[0], slow], 1.5), Ok(Some(slow)));
    }

    #[test]
    fn equal_positions_and_speeds_pass_through_instantly() {
        let mut profile = SegmentProfile::default();
        let duration = profile.generate(0.5, 0.0, 1.0, 1.0, 5.0, 5.0).unwrap();
        assert_abs_diff_eq!(duration, 0.0, epsilon = 1e-12);
        assert!(!profile.is_no_movement());
        assert_relative_eq!(profile.v_max().unwrap(), 5.0, max_relative = 1e-12);

        let state = profile.sample(0.5).unwrap();
        assert_relative_eq!(state.pos, 1.0, max_relative = 1e-12);
        assert_relative_eq!(state.vel, 5.0, max_relative = 1e-12);
    }

    #[test]
    fn quadratic_roots() {
        let mut roots = solve_quadratic(1.0, -3.0, 2.0);
        roots.sort_by(f64::total_cmp);
        assert_eq!(roots, vec![1.0, 2.0]);
        assert_eq!(solve_quadratic(0.0, 2.0, -4.0), vec![2.0]);
        assert!(solve_quadratic(1.0, 0.0, 1.0).is_empty());
        assert!(solve_quadratic(0.0, 0.0, 1.0).is_empty());
    }

    fn random_limits(rng: &mut StdRng) -> SegmentLimits {
        let (accel, decel) = (rng.gen_range(0.5..50.0), rng.gen_range(0.5..50.0));
        SegmentLimits::new(accel, decel, rng.gen_range(1.0..20.0))
            .with_rounding(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0))
    }

    fn random_fastest_scenarios(seed: u64, count: usize) {
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..count {
            let limits = random_limits(&mut rng);
            let v = limits.vel_limit;
            let (x0, xf) = (rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));
            let (v0, vf) = (rng.gen_range(-v..v), rng.gen_range(-v..v));

            let mut profile = SegmentProfile::new(limits).unwrap();
            profile
                .generate(0.0, 0.0, x0, xf, v0, vf)
                .unwrap_or_else(|e| panic!("{limits:?} {x0} {xf} {v0} {vf}: {e}"));
            check_profile(&profile);
        }
    }

    #[test]
    fn random_fastest_profiles_hold_invariants() {
        random_fastest_scenarios(7, 300);
    }

    fn random_rest_to_rest_explicit(seed: u64, count: usize) {
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..count {
            let a = rng.gen_range(0.5..50.0);
            let limits = SegmentLimits::new(a, a, rng.gen_range(1.0..20.0));
            let xf = rng.gen_range(-10.0..10.0);

            let mut profile = SegmentProfile::new(limits).unwrap();
            let fastest = profile.generate(0.0, 0.0, 0.0, xf, 0.0, 0.0).unwrap();
            let tf = fastest * rng.gen_range(1.01..3.0);
            let duration = profile
                .generate(0.0, tf, 0.0, xf, 0.0, 0.0)
                .unwrap_or_else(|e| panic!("{limits:?} xf={xf} tf={tf}: {e}"));
            assert_eq!(duration, tf);
            check_profile(&profile);
        }
    }

    #[test]
    fn random_explicit_profiles_hit_finish_time() {
        random_rest_to_rest_explicit(11, 200);
    }

    /// Scans cruise speeds across `[-vel_limit, vel_limit]` for every ramp
    /// direction pair. True when the displacement residual changes sign
    /// between two neighbouring speeds that both keep the ramp directions
    /// and a non-negative cruise time, i.e. a fixed-duration profile exists.
    fn scan_finds_fixed_duration_profile(
        mv: &Move,
        ramps: Ramps,
        duration: f64,
        vel_limit: f64,
    ) -> bool {
        let (v0, vf) = mv.vel;
        let n = 20_000;
        for (sa, sd) in [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)] {
            let mut previous: Option<f64> = None;
            for k in 0..=n {
                let v = vel_limit * (2.0 * k as f64 / n as f64 - 1.0);
                let cruise = duration - ramps.ka * (v - v0).abs() - ramps.kd * (vf - v).abs();
                if sa * (v - v0) < 0.0 || sd * (vf - v) < 0.0 || cruise < 0.0 {
                    previous = None;
                    continue;
                }
                let residual =
                    Plan::new(mv, ramps, v, (sa, sd), cruise).displacement(mv) - mv.displacement();
                if previous.map_or(false, |p| p * residual < 0.0) {
                    return true;
                }
                previous = Some(residual);
            }
        }
        false
    }

    #[test]
    fn random_explicit_with_boundary_speeds_solve_or_are_infeasible() {
        let mut rng = StdRng::seed_from_u64(23);
        let count = 200;
        let mut solved = 0;
        for _ in 0..count {
            let limits = random_limits(&mut rng);
            let v = limits.vel_limit;
            let (x0, xf) = (rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));
            let (v0, vf) = (rng.gen_range(-v..v), rng.gen_range(-v..v));

            let mut profile = SegmentProfile::new(limits).unwrap();
            let fastest = profile.generate(0.0, 0.0, x0, xf, v0, vf).unwrap();
            let tf = fastest * rng.gen_range(1.0..2.0) + 1e-6;
            match profile.generate(0.0, tf, x0, xf, v0, vf) {
                Ok(_) => {
                    assert_eq!(profile.end_time().unwrap(), tf);
                    check_profile(&profile);
                    solved += 1;
                }
                Err(err) => {
                    assert!(matches!(err, ProfileError::Unreachable { .. }), "{err:?}");

                    // same ramps the solver settled on
                    let mv = Move {
                        pos: (x0, xf),
                        vel: (v0, vf),
                    };
                    let initial = initial_direction(&mv, true);
                    let full = Ramps::new(limits.accel_limit, limits.decel_limit, &limits);
                    let reference = fastest_plan(&mv, full, v, initial).unwrap();
                    let ramps = profile.explicit_ramps(&mv, tf, &reference, initial);
                    assert!(
                        !scan_finds_fixed_duration_profile(&mv, ramps, tf, v),
                        "solver missed a profile: {limits:?} {x0} {xf} {v0} {vf} tf={tf}"
                    );
                }
            }
        }
        assert!(solved > count / 2, "solved {solved} of {count}");
    }
}

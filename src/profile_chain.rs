use tracing::{debug, warn};

use crate::errors::{ChainError, ChainResult, TimeSeriesError};
use crate::motion_state::{MotionState, Sample, Waypoint};
use crate::segment_limits::SegmentLimits;
use crate::segment_profile::SegmentProfile;
use crate::time_series::{BoundaryQueue, PositionSeries, TimePoint};
use crate::velocity_smoother::VelocitySmoother;

/// Where the boundary states of a chain come from.
#[derive(Clone, Debug, PartialEq)]
enum ChainSource {
    /// Waypoint positions. Interior velocities are synthesized unless
    /// pinned; `start`/`end` are `(vel, acc)` at the first and last point.
    Positions {
        waypoints: PositionSeries,
        start: (f64, f64),
        end: (f64, f64),
        pinned: Vec<(usize, f64)>,
    },
    /// Every boundary fully specified.
    States(BoundaryQueue),
    /// A single move with no finish time, solved in fastest mode.
    PointToPoint {
        t0: f64,
        start: MotionState,
        goal: MotionState,
    },
}

/// Chain of [`SegmentProfile`]s through a sequence of waypoints.
///
/// `initialize_*` fixes the inputs and validates them, `generate` solves
/// every segment left to right and only publishes the result once all of
/// them succeeded. Segment `i` ends at exactly the boundary state segment
/// `i + 1` starts from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileChain {
    source: Option<ChainSource>,
    limits: Vec<SegmentLimits>,
    segments: Vec<SegmentProfile>,
    boundaries: BoundaryQueue,
}

impl ProfileChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain through position-only waypoints. `start` and `end` are the
    /// `(velocity, acceleration)` at the first and last waypoint; interior
    /// velocities come from [`VelocitySmoother`].
    pub fn initialize_positions(
        &mut self,
        waypoints: PositionSeries,
        start: (f64, f64),
        end: (f64, f64),
        limits: Vec<SegmentLimits>,
    ) -> ChainResult<()> {
        Self::check_config(waypoints.len(), &limits)?;
        self.reset(
            ChainSource::Positions {
                waypoints,
                start,
                end,
                pinned: Vec::new(),
            },
            limits,
        );
        Ok(())
    }

    /// Chain through fully specified boundary states.
    pub fn initialize_states(
        &mut self,
        states: BoundaryQueue,
        limits: Vec<SegmentLimits>,
    ) -> ChainResult<()> {
        Self::check_config(states.len(), &limits)?;
        self.reset(ChainSource::States(states), limits);
        Ok(())
    }

    /// Single fastest move from `start` (at `t0`) to `goal`.
    pub fn initialize_point_to_point(
        &mut self,
        t0: f64,
        start: MotionState,
        goal: MotionState,
        limits: SegmentLimits,
    ) -> ChainResult<()> {
        let limits = vec![limits];
        Self::check_config(2, &limits)?;
        self.reset(ChainSource::PointToPoint { t0, start, goal }, limits);
        Ok(())
    }

    /// Builds an initialized (not yet generated) chain from waypoint records.
    ///
    /// When every waypoint carries a velocity the states are used as given.
    /// Otherwise the positions are smoothed and the velocities that were
    /// provided are pinned.
    pub fn from_waypoints(
        waypoints: &[Waypoint],
        limits: Vec<SegmentLimits>,
    ) -> ChainResult<Self> {
        let (first, last) = match waypoints {
            [first, .., last] => (first, last),
            _ => {
                return Err(ChainError::TooFewWaypoints {
                    found: waypoints.len(),
                })
            }
        };

        let mut chain = Self::new();
        if waypoints.iter().all(|w| w.velocity.is_some()) {
            let states =
                BoundaryQueue::try_from_pairs(waypoints.iter().map(|w| (w.time, w.state())))?;
            chain.initialize_states(states, limits)?;
            return Ok(chain);
        }

        let positions =
            PositionSeries::try_from_pairs(waypoints.iter().map(|w| (w.time, w.position)))?;
        let start = first.state();
        let end = last.state();
        chain.initialize_positions(
            positions,
            (start.vel, start.acc),
            (end.vel, end.acc),
            limits,
        )?;
        for (index, waypoint) in waypoints.iter().enumerate().skip(1).take(waypoints.len() - 2) {
            if let Some(velocity) = waypoint.velocity {
                chain.pin_velocity(index, velocity)?;
            }
        }
        Ok(chain)
    }

    /// Fixes the velocity at boundary `index` before generation.
    pub fn pin_velocity(&mut self, index: usize, velocity: f64) -> ChainResult<()> {
        let source = self.source.as_mut().ok_or(ChainError::NotInitialized)?;
        let len = match source {
            ChainSource::Positions { waypoints, .. } => waypoints.len(),
            ChainSource::States(states) => states.len(),
            ChainSource::PointToPoint { .. } => 2,
        };
        if index >= len {
            return Err(TimeSeriesError::IndexOutOfRange { index, len }.into());
        }

        match source {
            ChainSource::Positions {
                waypoints,
                start,
                end,
                pinned,
            } => {
                if index == 0 {
                    start.0 = velocity;
                } else if index == waypoints.len() - 1 {
                    end.0 = velocity;
                } else {
                    pinned.retain(|(i, _)| *i != index);
                    pinned.push((index, velocity));
                }
            }
            ChainSource::States(states) => {
                let mut point = states.get(index)?;
                point.value.vel = velocity;
                states.set(index, point)?;
            }
            ChainSource::PointToPoint { start, goal, .. } => {
                if index == 0 {
                    start.vel = velocity;
                } else {
                    goal.vel = velocity;
                }
            }
        }
        self.clear_generated();
        Ok(())
    }

    /// Solves all segments. Returns the total duration.
    ///
    /// Either every segment is generated or the chain is left empty.
    pub fn generate(&mut self) -> ChainResult<f64> {
        self.clear_generated();
        let source = self.source.as_ref().ok_or(ChainError::NotInitialized)?;

        let (segments, boundaries) = match source {
            ChainSource::Positions {
                waypoints,
                start,
                end,
                pinned,
            } => Self::generate_smoothed(waypoints, *start, *end, pinned, &self.limits)?,
            ChainSource::States(states) => Self::generate_states(states, &self.limits)?,
            ChainSource::PointToPoint { t0, start, goal } => {
                Self::generate_point_to_point(*t0, *start, *goal, self.limits[0])?
            }
        };

        let duration = boundaries.total_interval();
        debug!(segments = segments.len(), duration, "profile chain generated");
        self.segments = segments;
        self.boundaries = boundaries;
        Ok(duration)
    }

    /// State at absolute time `t`, taken from the segment that contains it.
    pub fn sample(&self, t: f64) -> ChainResult<MotionState> {
        let (start, end) = self.span()?;
        if !(t >= start && t <= end) {
            return Err(ChainError::TimeOutOfRange { time: t, start, end });
        }

        let last = self.segments.len() - 1;
        let index = self
            .boundaries
            .times()
            .skip(1)
            .position(|segment_end| t <= segment_end)
            .unwrap_or(last)
            .min(last);
        self.segments[index]
            .sample(t)
            .map_err(|source| ChainError::Segment { index, source })
    }

    pub fn sample_point(&self, t: f64) -> ChainResult<Sample> {
        Ok(Sample::from_state(t, self.sample(t)?))
    }

    // -----------------------------------------------------------------
    //  Getter methods for ProfileChain
    // -----------------------------------------------------------------

    pub fn is_initialized(&self) -> bool {
        self.source.is_some()
    }

    pub fn is_generated(&self) -> bool {
        !self.segments.is_empty()
    }

    pub fn segments(&self) -> &[SegmentProfile] {
        &self.segments
    }

    pub fn limits(&self) -> &[SegmentLimits] {
        &self.limits
    }

    /// Boundary states the segments were generated from, including the
    /// synthesized velocities.
    ///
    /// Normally one more entry than there are segments. A point-to-point
    /// chain whose move needs no time keeps a single boundary (the goal at
    /// `t0`) next to its one zero-length segment.
    pub fn boundaries(&self) -> &BoundaryQueue {
        &self.boundaries
    }

    pub fn start_time(&self) -> ChainResult<f64> {
        Ok(self.span()?.0)
    }

    pub fn end_time(&self) -> ChainResult<f64> {
        Ok(self.span()?.1)
    }

    pub fn duration(&self) -> ChainResult<f64> {
        let (start, end) = self.span()?;
        Ok(end - start)
    }

    // -----------------------------------------------------------------------------------------
    // Below are helper methods for internal calculations:
    // -----------------------------------------------------------------------------------------

    fn span(&self) -> ChainResult<(f64, f64)> {
        if !self.is_generated() {
            return Err(ChainError::NotGenerated);
        }
        Ok((self.boundaries.front()?.time, self.boundaries.back()?.time))
    }

    fn reset(&mut self, source: ChainSource, limits: Vec<SegmentLimits>) {
        self.source = Some(source);
        self.limits = limits;
        self.clear_generated();
    }

    fn clear_generated(&mut self) {
        self.segments.clear();
        self.boundaries.clear();
    }

    fn check_config(points: usize, limits: &[SegmentLimits]) -> ChainResult<()> {
        if points < 2 {
            return Err(ChainError::TooFewWaypoints { found: points });
        }
        if limits.len() != points - 1 {
            return Err(ChainError::ConfigSizeMismatch {
                expected: points - 1,
                found: limits.len(),
            });
        }
        for (index, segment_limits) in limits.iter().enumerate() {
            segment_limits
                .validate()
                .map_err(|source| ChainError::InvalidLimits { index, source })?;
        }
        Ok(())
    }

    fn warn_boundary_acceleration(time: f64, acc: f64) {
        if acc != 0.0 {
            warn!(
                time,
                acc,
                "boundary acceleration is ignored, segments start and end at zero acceleration"
            );
        }
    }

    /// Appends `point` to `boundaries` and, once a segment has both of its
    /// ends, generates it.
    fn push_boundary(
        point: TimePoint<MotionState>,
        limits: &[SegmentLimits],
        segments: &mut Vec<SegmentProfile>,
        boundaries: &mut BoundaryQueue,
    ) -> ChainResult<()> {
        boundaries.push(point.time, point.value)?;
        if boundaries.len() < 2 {
            return Ok(());
        }

        let index = boundaries.len() - 2;
        let from = boundaries.get(index)?;
        let mut segment = SegmentProfile::new(limits[index])
            .map_err(|source| ChainError::InvalidLimits { index, source })?;
        segment
            .generate(
                from.time,
                point.time,
                from.value.pos,
                point.value.pos,
                from.value.vel,
                point.value.vel,
            )
            .map_err(|source| ChainError::Segment { index, source })?;
        segments.push(segment);
        Ok(())
    }

    fn generate_smoothed(
        waypoints: &PositionSeries,
        start: (f64, f64),
        end: (f64, f64),
        pinned: &[(usize, f64)],
        limits: &[SegmentLimits],
    ) -> ChainResult<(Vec<SegmentProfile>, BoundaryQueue)> {
        let last = waypoints.len() - 1;
        let mut smoother = VelocitySmoother::new();
        let mut segments = Vec::with_capacity(last);
        let mut boundaries = BoundaryQueue::new();

        for (index, waypoint) in waypoints.iter().enumerate() {
            smoother.push(waypoint.time, waypoint.value)?;
            let newest = smoother.size() - 1;
            if index == 0 {
                smoother.force_set_velocity(newest, start.0)?;
            } else if index == last {
                smoother.force_set_velocity(newest, end.0)?;
                smoother.flush();
            } else if let Some(&(_, velocity)) = pinned.iter().find(|(i, _)| *i == index) {
                smoother.force_set_velocity(newest, velocity)?;
            }

            while smoother.ready() > 0 {
                let mut point = smoother.pop()?;
                let k = boundaries.len();
                if k == 0 {
                    point.value.acc = start.1;
                    Self::warn_boundary_acceleration(point.time, start.1);
                } else if k == last {
                    point.value.acc = end.1;
                    Self::warn_boundary_acceleration(point.time, end.1);
                } else if !pinned.iter().any(|(i, _)| *i == k) {
                    let limit = limits[k - 1].vel_limit.min(limits[k].vel_limit);
                    if point.value.vel.abs() > limit {
                        let clamped = point.value.vel.clamp(-limit, limit);
                        warn!(
                            index = k,
                            velocity = point.value.vel,
                            clamped,
                            "synthesized velocity clamped to segment limit"
                        );
                        point.value.vel = clamped;
                    }
                }
                Self::push_boundary(point, limits, &mut segments, &mut boundaries)?;
            }
        }
        Ok((segments, boundaries))
    }

    fn generate_states(
        states: &BoundaryQueue,
        limits: &[SegmentLimits],
    ) -> ChainResult<(Vec<SegmentProfile>, BoundaryQueue)> {
        let mut segments = Vec::with_capacity(states.len() - 1);
        let mut boundaries = BoundaryQueue::new();
        for point in states.iter() {
            Self::warn_boundary_acceleration(point.time, point.value.acc);
            Self::push_boundary(*point, limits, &mut segments, &mut boundaries)?;
        }
        Ok((segments, boundaries))
    }

    fn generate_point_to_point(
        t0: f64,
        start: MotionState,
        goal: MotionState,
        limits: SegmentLimits,
    ) -> ChainResult<(Vec<SegmentProfile>, BoundaryQueue)> {
        Self::warn_boundary_acceleration(t0, start.acc);
        Self::warn_boundary_acceleration(t0, goal.acc);

        let segment_error = |source| ChainError::Segment { index: 0, source };
        let mut segment = SegmentProfile::new(limits).map_err(segment_error)?;
        segment
            .generate(t0, 0.0, start.pos, goal.pos, start.vel, goal.vel)
            .map_err(segment_error)?;
        let end = segment.end_time().map_err(segment_error)?;

        let mut boundaries = BoundaryQueue::new();
        boundaries.push(t0, start)?;
        if end > t0 {
            boundaries.push(end, goal)?;
        } else {
            // Nothing to do: keep a zero-length span ending at the goal.
            boundaries.clear();
            boundaries.push(t0, goal)?;
        }
        Ok((vec![segment], boundaries))
    }
}

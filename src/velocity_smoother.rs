use std::collections::VecDeque;

use crate::errors::{SmootherError, SmootherResult, TimeSeriesError};
use crate::motion_state::MotionState;
use crate::time_series::{BoundaryQueue, TimePoint};

/// Tangent estimate at `p1` from its two neighbours.
///
/// Each `(time, position)` pair is treated as a point of the time-position
/// plane. Both secants are normalised by their chord length before the
/// slope is taken, which reduces to the central difference for evenly spaced
/// collinear points and flattens the tangent at sharp corners.
pub fn estimate_velocity(
    p0: TimePoint<f64>,
    p1: TimePoint<f64>,
    p2: TimePoint<f64>,
) -> SmootherResult<f64> {
    if !(p1.time > p0.time && p2.time > p1.time) {
        return Err(SmootherError::InvalidInterval {
            t0: p0.time,
            t1: p1.time,
            t2: p2.time,
        });
    }

    let d01 = (p1.time - p0.time).hypot(p1.value - p0.value);
    let d12 = (p2.time - p1.time).hypot(p2.value - p1.value);

    let numerator = (p2.value - p1.value) / d12 - (p0.value - p1.value) / d01;
    let denominator = (p2.time - p1.time) / d12 - (p0.time - p1.time) / d01;

    if denominator == 0.0 {
        return Err(SmootherError::SingularEstimate { time: p1.time });
    }
    let velocity = numerator / denominator;
    if !velocity.is_finite() {
        return Err(SmootherError::SingularEstimate { time: p1.time });
    }
    Ok(velocity)
}

/// Turns a stream of `(time, position)` waypoints into velocity-annotated
/// boundary states.
///
/// Works as a three-wide sliding window over the buffered points: as soon as
/// three unfinished points are held, the middle one gets its velocity and
/// the oldest one is finished and can be [`pop`](Self::pop)ped. Velocities
/// pinned through [`force_set_velocity`](Self::force_set_velocity) are never
/// overwritten by the estimator.
#[derive(Clone, Debug, Default)]
pub struct VelocitySmoother {
    points: BoundaryQueue,
    pinned: VecDeque<bool>,
    ready: usize,
}

impl VelocitySmoother {
    const WINDOW: usize = 3;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: f64, position: f64) -> SmootherResult<()> {
        self.points.push(time, MotionState::at_rest(position))?;
        self.pinned.push_back(false);

        if self.points.len() - self.ready == Self::WINDOW {
            if let Err(err) = self.finish_window() {
                // Leave the buffer as it was before the push.
                self.points.pop_back()?;
                self.pinned.pop_back();
                return Err(err);
            }
        }
        Ok(())
    }

    /// Appends a point `dt` after the newest buffered one.
    pub fn push_interval(&mut self, dt: f64, position: f64) -> SmootherResult<()> {
        let time = match self.points.back() {
            Ok(last) => last.time + dt,
            Err(_) => dt,
        };
        self.push(time, position)
    }

    /// Overrides the velocity of the buffered point at `index` (0 is the
    /// oldest) and pins it against later estimation.
    pub fn force_set_velocity(&mut self, index: usize, velocity: f64) -> SmootherResult<()> {
        let mut point = self.points.get(index)?;
        point.value.vel = velocity;
        self.points.set(index, point)?;
        self.pinned[index] = true;
        Ok(())
    }

    /// Marks every buffered point finished. Called once the stream ends, the
    /// last points keep whatever velocity they were pinned to (or zero).
    pub fn flush(&mut self) {
        self.ready = self.points.len();
    }

    /// Removes the oldest finished point.
    pub fn pop(&mut self) -> SmootherResult<TimePoint<MotionState>> {
        if self.ready == 0 {
            return Err(SmootherError::NotReady {
                buffered: self.points.len(),
            });
        }
        let point = self.points.pop_front()?;
        self.pinned.pop_front();
        self.ready -= 1;
        Ok(point)
    }

    /// Removes the newest buffered point, finished or not.
    pub fn pop_back(&mut self) -> SmootherResult<TimePoint<MotionState>> {
        let point = self.points.pop_back()?;
        self.pinned.pop_back();
        self.ready = self.ready.min(self.points.len());
        Ok(point)
    }

    pub fn front(&self) -> SmootherResult<TimePoint<MotionState>> {
        Ok(self.points.front()?)
    }

    pub fn back(&self) -> SmootherResult<TimePoint<MotionState>> {
        Ok(self.points.back()?)
    }

    pub fn get(&self, index: usize) -> SmootherResult<TimePoint<MotionState>> {
        Ok(self.points.get(index)?)
    }

    /// Number of buffered points, finished or not.
    pub fn size(&self) -> usize {
        self.points.len()
    }

    /// Number of finished points waiting to be popped.
    pub fn ready(&self) -> usize {
        self.ready
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.pinned.clear();
        self.ready = 0;
    }

    fn finish_window(&mut self) -> SmootherResult<()> {
        let mid = self.ready + 1;
        if !self.pinned[mid] {
            let velocity = estimate_velocity(
                self.position_at(mid - 1)?,
                self.position_at(mid)?,
                self.position_at(mid + 1)?,
            )?;
            let mut point = self.points.get(mid)?;
            point.value.vel = velocity;
            self.points.set(mid, point)?;
        }
        self.ready += 1;
        Ok(())
    }

    fn position_at(&self, index: usize) -> Result<TimePoint<f64>, TimeSeriesError> {
        let point = self.points.get(index)?;
        Ok(TimePoint::new(point.time, point.value.pos))
    }
}

use std::collections::VecDeque;

use crate::errors::{SeriesResult, TimeSeriesError};
use crate::motion_state::MotionState;

/// One sample of a series: a timestamp and the value observed at it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimePoint<T> {
    pub time: f64,
    pub value: T,
}

impl<T> TimePoint<T> {
    pub fn new(time: f64, value: T) -> Self {
        Self { time, value }
    }
}

/// Ordered container of `(time, value)` pairs with strictly increasing times.
///
/// Alongside the points the series caches `interval[i] = time[i+1] - time[i]`
/// and the running sum of those intervals. Every mutation updates the cache
/// incrementally, touching only the intervals adjacent to the changed point.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeries<T> {
    points: VecDeque<TimePoint<T>>,
    intervals: VecDeque<f64>,
    total_interval: f64,
}

/// Waypoint positions without derivatives.
pub type PositionSeries = TimeSeries<f64>;

/// Segment endpoints consumed and produced by [`ProfileChain`](crate::ProfileChain).
pub type BoundaryQueue = TimeSeries<MotionState>;

impl<T> Default for TimeSeries<T> {
    fn default() -> Self {
        Self {
            points: VecDeque::new(),
            intervals: VecDeque::new(),
            total_interval: 0.0,
        }
    }
}

impl<T: Clone> TimeSeries<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from `(time, value)` pairs, rejecting the first
    /// out-of-order timestamp.
    pub fn try_from_pairs<I>(pairs: I) -> SeriesResult<Self>
    where
        I: IntoIterator<Item = (f64, T)>,
    {
        let mut series = Self::new();
        for (time, value) in pairs {
            series.push(time, value)?;
        }
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Appends a point. Fails if `time` is not strictly after the last point.
    pub fn push(&mut self, time: f64, value: T) -> SeriesResult<()> {
        if !time.is_finite() {
            return Err(TimeSeriesError::NonFiniteTime { time });
        }
        if let Some(last) = self.points.back() {
            if time <= last.time {
                return Err(TimeSeriesError::NonMonotonicTime {
                    time,
                    bound: last.time,
                });
            }
            let interval = time - last.time;
            self.intervals.push_back(interval);
            self.total_interval += interval;
        }
        self.points.push_back(TimePoint::new(time, value));
        Ok(())
    }

    /// Appends a point `dt` after the last one, or at `dt` on an empty series.
    pub fn push_relative(&mut self, dt: f64, value: T) -> SeriesResult<()> {
        let time = match self.points.back() {
            Some(last) => last.time + dt,
            None => dt,
        };
        self.push(time, value)
    }

    /// Removes the oldest point together with the interval that followed it.
    pub fn pop_front(&mut self) -> SeriesResult<TimePoint<T>> {
        let point = self.points.pop_front().ok_or(TimeSeriesError::Empty)?;
        if let Some(interval) = self.intervals.pop_front() {
            self.total_interval -= interval;
        }
        self.settle_total();
        Ok(point)
    }

    /// Removes the newest point together with the interval that led to it.
    pub fn pop_back(&mut self) -> SeriesResult<TimePoint<T>> {
        let point = self.points.pop_back().ok_or(TimeSeriesError::Empty)?;
        if let Some(interval) = self.intervals.pop_back() {
            self.total_interval -= interval;
        }
        self.settle_total();
        Ok(point)
    }

    pub fn get(&self, index: usize) -> SeriesResult<TimePoint<T>> {
        self.points
            .get(index)
            .cloned()
            .ok_or(TimeSeriesError::IndexOutOfRange {
                index,
                len: self.points.len(),
            })
    }

    pub fn front(&self) -> SeriesResult<TimePoint<T>> {
        self.get(0)
    }

    pub fn back(&self) -> SeriesResult<TimePoint<T>> {
        match self.points.len() {
            0 => self.get(0),
            len => self.get(len - 1),
        }
    }

    /// Replaces the point at `index`.
    ///
    /// The new time must stay strictly between the neighbouring times. Only
    /// the one or two adjacent cached intervals are recomputed, and the total
    /// is shifted by their delta.
    pub fn set(&mut self, index: usize, point: TimePoint<T>) -> SeriesResult<()> {
        let len = self.points.len();
        if index >= len {
            return Err(TimeSeriesError::IndexOutOfRange { index, len });
        }
        if !point.time.is_finite() {
            return Err(TimeSeriesError::NonFiniteTime { time: point.time });
        }
        if index > 0 {
            let prev = self.points[index - 1].time;
            if point.time <= prev {
                return Err(TimeSeriesError::NonMonotonicTime {
                    time: point.time,
                    bound: prev,
                });
            }
        }
        if index + 1 < len {
            let next = self.points[index + 1].time;
            if point.time >= next {
                return Err(TimeSeriesError::NonMonotonicTime {
                    time: point.time,
                    bound: next,
                });
            }
        }

        if index > 0 {
            let updated = point.time - self.points[index - 1].time;
            self.total_interval += updated - self.intervals[index - 1];
            self.intervals[index - 1] = updated;
        }
        if index + 1 < len {
            let updated = self.points[index + 1].time - point.time;
            self.total_interval += updated - self.intervals[index];
            self.intervals[index] = updated;
        }
        self.points[index] = point;
        Ok(())
    }

    /// Cached `time[index + 1] - time[index]`.
    pub fn interval(&self, index: usize) -> SeriesResult<f64> {
        self.intervals
            .get(index)
            .copied()
            .ok_or(TimeSeriesError::IndexOutOfRange {
                index,
                len: self.points.len(),
            })
    }

    /// Sum of all cached intervals, i.e. `last.time - first.time`.
    pub fn total_interval(&self) -> f64 {
        self.total_interval
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.intervals.clear();
        self.total_interval = 0.0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimePoint<T>> + '_ {
        self.points.iter()
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.time)
    }

    // A series with fewer than two points has no interval at all.
    fn settle_total(&mut self) {
        if self.intervals.is_empty() {
            self.total_interval = 0.0;
        }
    }
}

/// Lifts position waypoints into boundary states at rest.
pub fn boundary_queue_from_positions(positions: &PositionSeries) -> SeriesResult<BoundaryQueue> {
    BoundaryQueue::try_from_pairs(
        positions
            .iter()
            .map(|p| (p.time, MotionState::new(p.value, 0.0, 0.0))),
    )
}

/// Drops the derivatives of a boundary queue.
pub fn positions_of(queue: &BoundaryQueue) -> SeriesResult<PositionSeries> {
    PositionSeries::try_from_pairs(queue.iter().map(|p| (p.time, p.value.pos)))
}

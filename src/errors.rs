//! Error types for the time-series container, the velocity smoother,
//! the single-segment solver and the segment chain.
//!
//! Each component owns one enum. Variants carry the offending index, time
//! or value so a caller can report the failure without re-deriving it.
//! Lower-level errors are lifted with `#[from]` so `?` works across layers.

use thiserror::Error;

/// Result alias for [`TimeSeries`](crate::TimeSeries) operations.
pub type SeriesResult<T> = Result<T, TimeSeriesError>;

/// Result alias for [`VelocitySmoother`](crate::VelocitySmoother) operations.
pub type SmootherResult<T> = Result<T, SmootherError>;

/// Result alias for [`SegmentProfile`](crate::SegmentProfile) operations.
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Result alias for [`ProfileChain`](crate::ProfileChain) operations.
pub type ChainResult<T> = Result<T, ChainError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimeSeriesError {
    /// Timestamps must be strictly increasing.
    #[error("time {time} is not strictly ordered against neighbour time {bound}")]
    NonMonotonicTime { time: f64, bound: f64 },

    #[error("time {time} is not finite")]
    NonFiniteTime { time: f64 },

    #[error("time series is empty")]
    Empty,

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SmootherError {
    /// The three estimation points are not strictly ordered in time.
    #[error("invalid interval: times ({t0}, {t1}, {t2}) are not strictly increasing")]
    InvalidInterval { t0: f64, t1: f64, t2: f64 },

    /// The weighted-secant denominator vanished (infinite velocity implied).
    #[error("singular velocity estimate at time {time}")]
    SingularEstimate { time: f64 },

    /// No finished point is waiting to be popped.
    #[error("no finished point available ({buffered} buffered)")]
    NotReady { buffered: usize },

    #[error(transparent)]
    Series(#[from] TimeSeriesError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    /// A limit is out of its admissible range.
    #[error("invalid limit {name} = {value}: {reason}")]
    InvalidLimits {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Start/finish times violate `t0 >= 0`, `tf >= 0`, `tf == 0 || t0 <= tf`.
    #[error("invalid segment times t0 = {t0}, tf = {tf}")]
    InvalidTime { t0: f64, tf: f64 },

    /// A boundary position or velocity is not finite.
    #[error("boundary value {name} = {value} is not finite")]
    InvalidBoundary { name: &'static str, value: f64 },

    #[error("boundary velocity {velocity} exceeds velocity limit {limit}")]
    BoundaryVelocityExceedsLimit { velocity: f64, limit: f64 },

    /// The move cannot be completed in the requested time or with the
    /// given boundary conditions.
    #[error("unreachable: {reason} (requested {requested}s, fastest {fastest}s)")]
    Unreachable {
        requested: f64,
        fastest: f64,
        reason: &'static str,
    },

    /// The explicit-duration solve needs a cruise speed above the limit.
    #[error("solved cruise velocity {v_max} exceeds velocity limit {limit}")]
    VelocityLimitExceeded { v_max: f64, limit: f64 },

    #[error("profile has not been generated")]
    NotGenerated,

    #[error("time {time} outside profile range [{start}, {end}]")]
    TimeOutOfRange { time: f64, start: f64, end: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    /// The limits list must hold exactly one entry per segment.
    #[error("expected {expected} segment limit entries, found {found}")]
    ConfigSizeMismatch { expected: usize, found: usize },

    #[error("at least two waypoints are required, found {found}")]
    TooFewWaypoints { found: usize },

    #[error("chain has not been initialized")]
    NotInitialized,

    #[error("invalid limits for segment {index}: {source}")]
    InvalidLimits {
        index: usize,
        #[source]
        source: ProfileError,
    },

    #[error("segment {index} failed: {source}")]
    Segment {
        index: usize,
        #[source]
        source: ProfileError,
    },

    #[error(transparent)]
    Smoother(#[from] SmootherError),

    #[error(transparent)]
    Series(#[from] TimeSeriesError),

    #[error("chain has not been generated")]
    NotGenerated,

    #[error("time {time} outside chain range [{start}, {end}]")]
    TimeOutOfRange { time: f64, start: f64, end: f64 },

    /// Sampling frequency of an executor must be nonzero.
    #[error("invalid sampling frequency {freq} Hz")]
    InvalidFrequency { freq: u16 },
}

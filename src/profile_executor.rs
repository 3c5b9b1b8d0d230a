use crate::errors::{ChainError, ChainResult};
use crate::motion_state::Sample;
use crate::profile_chain::ProfileChain;

/// Steps through a generated [`ProfileChain`] in discrete ticks at a fixed
/// frequency, the way a control loop consumes a planned trajectory.
///
/// Tick `k` samples the chain at `start + k / freq`; the last tick is
/// clamped onto the chain end so the final state is always visited.
pub struct ProfileExecutor<'a> {
    /// The chain being executed
    chain: &'a ProfileChain,

    /// Update frequency in Hz
    freq: f64,

    /// Chain time range (start, end)
    span: (f64, f64),

    /// Current time-step in discrete ticks
    time: u64,

    /// The current instantaneous state
    inst: Sample,

    /// Set once the chain end has been sampled
    finished: bool,

    /// Iterator bookkeeping: the initial state has been yielded
    emitted: bool,
}

impl<'a> ProfileExecutor<'a> {
    /// Creates an executor positioned at the start of `chain`.
    pub fn new(chain: &'a ProfileChain, freq: u16) -> ChainResult<Self> {
        let freq = Self::check_freq(freq)?;
        let span = (chain.start_time()?, chain.end_time()?);
        let inst = chain.sample_point(span.0)?;
        Ok(Self {
            chain,
            freq,
            span,
            time: 0,
            inst,
            finished: span.1 <= span.0,
            emitted: false,
        })
    }

    /// Advances one tick. Past the chain end the final state is held.
    pub fn tick(&mut self) -> ChainResult<()> {
        if self.finished {
            return Ok(());
        }
        self.time += 1;
        let t = (self.span.0 + self.time as f64 / self.freq).min(self.span.1);
        self.inst = self.chain.sample_point(t)?;
        self.finished = t >= self.span.1;
        Ok(())
    }

    /// Returns to the first tick.
    pub fn reset(&mut self) -> ChainResult<()> {
        self.time = 0;
        self.inst = self.chain.sample_point(self.span.0)?;
        self.finished = self.span.1 <= self.span.0;
        self.emitted = false;
        Ok(())
    }

    /// Sets a new frequency in Hz. Takes effect from the next tick, counted
    /// from the chain start.
    pub fn set_freq(&mut self, freq: u16) -> ChainResult<()> {
        self.freq = Self::check_freq(freq)?;
        Ok(())
    }

    /// Returns the current acceleration.
    pub fn get_acc(&self) -> f64 {
        self.inst.acceleration
    }

    /// Returns the current velocity.
    pub fn get_vel(&self) -> f64 {
        self.inst.velocity
    }

    /// Returns the current position.
    pub fn get_pos(&self) -> f64 {
        self.inst.position
    }

    pub fn get_time(&self) -> f64 {
        self.inst.time
    }

    pub fn get_sample(&self) -> Sample {
        self.inst
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn check_freq(freq: u16) -> ChainResult<f64> {
        if freq == 0 {
            return Err(ChainError::InvalidFrequency { freq });
        }
        Ok(freq as f64)
    }
}

/// Yields the start sample, then one sample per tick up to and including
/// the chain end.
impl Iterator for ProfileExecutor<'_> {
    type Item = ChainResult<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.emitted {
            self.emitted = true;
            return Some(Ok(self.inst));
        }
        if self.finished {
            return None;
        }
        Some(self.tick().map(|_| self.inst))
    }
}

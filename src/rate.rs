//! Model parameters that may vary over time.

use std::fmt::{Debug, Formatter};
use std::rc::Rc;

use crate::error::{Error, Result};

/// Rate parameter given as a function of simulation time.
///
/// A plain number converts into a constant rate, so model constructors can accept both via `impl Into<Rate>`.
///
/// Propensities read the rate at the time of the latest reaction and hold it until the next one fires. A rate that
/// changes between two reactions is therefore sampled as a piecewise-constant function. This is exact for constant
/// rates and for step schedules only up to the first reaction after each switch.
#[derive(Clone)]
pub struct Rate(Rc<dyn Fn(f64) -> f64>);

impl Rate {
    /// Wraps a function of time.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + 'static,
    {
        Self(Rc::new(f))
    }

    /// Rate that does not change over time.
    pub fn constant(value: f64) -> Self {
        Self::new(move |_| value)
    }

    /// Base value scaled by a step schedule.
    ///
    /// The schedule lists `(time, multiplier)` pairs in any order. At time `t` the rate is `base` times the multiplier
    /// of the latest entry with `time <= t`, or `base` before the first entry. Entries sharing a time keep their
    /// given order, so the last one listed wins. A NaN time is rejected.
    pub fn schedule(base: f64, mut schedule: Vec<(f64, f64)>) -> Result<Self> {
        if let Some(&(start, _)) = schedule.iter().find(|(start, _)| start.is_nan()) {
            return Err(Error::InvalidSchedule(start));
        }
        if schedule.is_empty() {
            return Ok(Self::constant(base));
        }
        schedule.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self::new(move |t| {
            let passed = schedule.partition_point(|&(start, _)| start <= t);
            match passed {
                0 => base,
                n => base * schedule[n - 1].1,
            }
        }))
    }

    /// Value at the given time.
    pub fn at(&self, time: f64) -> f64 {
        (self.0)(time)
    }
}

impl From<f64> for Rate {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl Debug for Rate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rate(t=0: {})", self.at(0.))
    }
}

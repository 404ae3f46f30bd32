//! Gillespie's stochastic simulation algorithm.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::ReactionModel;
use crate::random::{RandomSource, UniformSource};
use crate::reaction::ReactionId;
use crate::trajectory::Trajectory;
use crate::{log_debug, log_warn};

/// Algorithm used to pick the next reaction and its time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Draws the time to the next reaction from the total propensity, then picks the reaction with probability
    /// proportional to its propensity. Uses two draws per step.
    #[default]
    Direct,
    /// Draws a candidate firing time for every active reaction and fires the earliest one. Uses one draw per active
    /// reaction per step. Equal candidate times are resolved in favor of the lowest reaction identifier.
    FirstReaction,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Direct => f.write_str("direct"),
            Method::FirstReaction => f.write_str("first_reaction"),
        }
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "direct" => Ok(Method::Direct),
            "first_reaction" | "first-reaction" => Ok(Method::FirstReaction),
            _ => Err(format!("unknown method '{}', expected 'direct' or 'first_reaction'", s)),
        }
    }
}

/// Record of one fired reaction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Step {
    /// Fired reaction.
    pub reaction: ReactionId,
    /// Sojourn time since the previous step.
    pub elapsed: f64,
    /// Time after the step.
    pub time: f64,
}

/// SSA engine driving one [`ReactionModel`].
///
/// The engine borrows the model mutably for its whole lifetime and steps it reaction by reaction until no reaction
/// is active. A completed trajectory is handed to the caller, and the model is reset to its initial conditions before
/// the next one is produced, so any number of independent trajectories can be generated from a single model.
///
/// Randomness comes from a [`UniformSource`]. [`Ssa::new`] seeds a PCG generator, so runs are reproducible for a given
/// seed and method.
///
/// Generation is not bounded: a model whose active set never empties (for example an immigration reaction with
/// constant propensity) produces a trajectory that never completes. Such models should encode their own stopping
/// state, e.g. a propensity that drops to zero past some time.
///
/// ```rust
/// use episim::{ReactionModel, Ssa};
///
/// let mut model = ReactionModel::builder()
///     .species("s", 480.)
///     .species("i", 20.)
///     .species("r", 0.)
///     .reaction(0, |x| 2.0 * x["s"] * x["i"] / 500., [("s", -1), ("i", 1)])
///     .reaction(1, |x| 1.0 * x["i"], [("i", -1), ("r", 1)])
///     .build()
///     .unwrap();
///
/// let mut ssa = Ssa::new(&mut model, 123);
/// for trajectory in ssa.direct().take(10) {
///     let trajectory = trajectory.unwrap();
///     assert_eq!(trajectory.final_value("i"), Some(0.));
/// }
/// ```
pub struct Ssa<'m, U = RandomSource> {
    model: &'m mut ReactionModel,
    random: U,
    completed: u64,
    needs_reset: bool,
}

impl<'m> Ssa<'m> {
    /// Creates an engine with a pseudo-random source seeded with the given value.
    pub fn new(model: &'m mut ReactionModel, seed: u64) -> Self {
        Self::with_source(model, RandomSource::new(seed))
    }
}

impl<'m, U: UniformSource> Ssa<'m, U> {
    /// Creates an engine drawing from the given source.
    pub fn with_source(model: &'m mut ReactionModel, random: U) -> Self {
        Self {
            model,
            random,
            completed: 0,
            needs_reset: false,
        }
    }

    /// The driven model.
    pub fn model(&self) -> &ReactionModel {
        self.model
    }

    /// Number of trajectories completed so far.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Fires a single reaction, or returns `None` if the model is terminal.
    ///
    /// A failed step leaves the model at its previous state.
    pub fn step(&mut self, method: Method) -> Result<Option<Step>> {
        let selected = match method {
            Method::Direct => self.select_direct()?,
            Method::FirstReaction => self.select_first_reaction()?,
        };
        let Some((position, elapsed)) = selected else {
            return Ok(None);
        };
        let reaction = self.model.reaction_at(position).id();
        self.model.fire(position, elapsed)?;
        Ok(Some(Step {
            reaction,
            elapsed,
            time: self.model.current_time(),
        }))
    }

    /// Steps the model until it is terminal and returns it.
    ///
    /// The model is reset first if it holds a completed trajectory or if the previous call failed. The returned
    /// reference borrows the engine, so the trajectory must be read before the next call overwrites it. A trajectory
    /// left unfinished by [`step`](Ssa::step) is continued.
    pub fn run(&mut self, method: Method) -> Result<&ReactionModel> {
        if self.needs_reset || (self.model.is_terminal() && self.model.steps() > 0) {
            self.model.reset()?;
        }
        self.needs_reset = true;
        while !self.model.is_terminal() {
            if let Err(err) = self.step(method) {
                log_warn!(self.model.current_time(), "trajectory aborted: {}", err);
                return Err(err);
            }
        }
        self.completed += 1;
        log_debug!(
            self.model.current_time(),
            "trajectory {} ({}) completed after {} reactions",
            self.completed,
            method,
            self.model.steps()
        );
        Ok(&*self.model)
    }

    /// Unbounded sequence of trajectories generated with the given method.
    pub fn trajectories(&mut self, method: Method) -> Trajectories<'_, 'm, U> {
        Trajectories { ssa: self, method }
    }

    /// Unbounded sequence of trajectories generated with the direct method.
    pub fn direct(&mut self) -> Trajectories<'_, 'm, U> {
        self.trajectories(Method::Direct)
    }

    /// Unbounded sequence of trajectories generated with the first-reaction method.
    pub fn first_reaction(&mut self) -> Trajectories<'_, 'm, U> {
        self.trajectories(Method::FirstReaction)
    }

    fn draw(&mut self) -> Result<f64> {
        let u = self.random.draw();
        if u > 0. && u < 1. {
            Ok(u)
        } else {
            Err(Error::InvalidDraw(u))
        }
    }

    fn select_direct(&mut self) -> Result<Option<(usize, f64)>> {
        let Some(&last) = self.model.active_positions().last() else {
            return Ok(None);
        };
        let total: f64 = self
            .model
            .active_positions()
            .iter()
            .map(|&p| self.model.propensity_at(p))
            .sum();

        let sojourn = (1. / self.draw()?).ln() / total;
        let mut threshold = total * self.draw()?;

        // rounding may leave the threshold non-negative after the whole walk
        let mut selected = last;
        for &position in self.model.active_positions() {
            threshold -= self.model.propensity_at(position);
            if threshold < 0. {
                selected = position;
                break;
            }
        }
        Ok(Some((selected, sojourn)))
    }

    fn select_first_reaction(&mut self) -> Result<Option<(usize, f64)>> {
        let mut earliest: Option<(usize, f64)> = None;
        for i in 0..self.model.active_positions().len() {
            let position = self.model.active_positions()[i];
            let time = (1. / self.draw()?).ln() / self.model.propensity_at(position);
            if earliest.map_or(true, |(_, t)| time < t) {
                earliest = Some((position, time));
            }
        }
        Ok(earliest)
    }
}

/// Iterator over trajectories produced by an [`Ssa`] engine.
///
/// Each item is an owned copy of a completed trajectory. The iterator never ends, take as many items as needed. A
/// failed trajectory is reported as an error and the model is reset before the next one.
pub struct Trajectories<'a, 'm, U> {
    ssa: &'a mut Ssa<'m, U>,
    method: Method,
}

impl<U> Trajectories<'_, '_, U> {
    /// Generation method.
    pub fn method(&self) -> Method {
        self.method
    }
}

impl<U: UniformSource> Iterator for Trajectories<'_, '_, U> {
    type Item = Result<Trajectory>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.ssa.run(self.method).map(ReactionModel::snapshot))
    }
}

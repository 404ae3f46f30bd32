//! Errors reported while building or simulating a reaction model.

use thiserror::Error;

use crate::reaction::ReactionId;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the reaction model and the SSA engine.
///
/// Configuration errors are reported when a model is built (or re-curated on reset). Runtime errors abort the
/// trajectory being generated. Running out of active reactions is not an error: it is how a trajectory ends.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The same species name was declared twice.
    #[error("species '{0}' is declared more than once")]
    DuplicateSpecies(String),
    /// The same reaction identifier was declared twice.
    #[error("reaction {0} is declared more than once")]
    DuplicateReaction(ReactionId),
    /// A stoichiometric delta refers to a species missing from the initial conditions.
    #[error("reaction {reaction} changes unknown species '{species}'")]
    UnknownSpecies {
        /// Reaction owning the delta.
        reaction: ReactionId,
        /// Name that failed to resolve.
        species: String,
    },
    /// A stoichiometric delta has no matching propensity function.
    #[error("reaction {0} has a stoichiometry but no propensity")]
    MissingPropensity(ReactionId),
    /// A propensity function has no matching stoichiometric delta.
    #[error("reaction {0} has a propensity but no stoichiometry")]
    MissingStoichiometry(ReactionId),
    /// The time trajectory must start at a finite non-negative value.
    #[error("start time {0} must be finite and non-negative")]
    InvalidStartTime(f64),
    /// Initial species values must be finite and non-negative.
    #[error("initial value {value} of species '{species}' must be finite and non-negative")]
    InvalidInitialValue {
        /// Species name.
        species: String,
        /// Rejected value.
        value: f64,
    },
    /// A rate schedule entry has a NaN switch time.
    #[error("rate schedule entry at time {0} is not a valid time")]
    InvalidSchedule(f64),
    /// A propensity function returned a negative or NaN rate.
    #[error("reaction {reaction} has invalid propensity {value}")]
    InvalidPropensity {
        /// Offending reaction.
        reaction: ReactionId,
        /// Value returned by its propensity function.
        value: f64,
    },
    /// The uniform source produced a value outside of the open interval (0, 1).
    #[error("uniform draw {0} is outside of the open interval (0, 1)")]
    InvalidDraw(f64),
    /// The elapsed time of a step is not finite and strictly positive.
    #[error("sojourn time {0} must be finite and positive")]
    InvalidSojourn(f64),
    /// The elapsed time of a step is lost to rounding at the current time.
    #[error("time {time} does not advance after a step of {elapsed}")]
    TimeStalled {
        /// Time before the step.
        time: f64,
        /// Sojourn time of the step.
        elapsed: f64,
    },
    /// A step drove a species population below zero.
    #[error("species '{species}' became negative ({value}) at time {time}")]
    NegativePopulation {
        /// Species name.
        species: String,
        /// Value after the step.
        value: f64,
        /// Time of the step.
        time: f64,
    },
    /// A stoichiometry built for a model with a different number of species was applied.
    #[error("stoichiometry covers {found} species but the model has {expected}")]
    StoichiometryMismatch {
        /// Species count of the model.
        expected: usize,
        /// Species count of the delta.
        found: usize,
    },
}

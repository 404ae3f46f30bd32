//! Episim is a library for stochastic simulation of small reaction networks, with ready-made epidemic compartment
//! models (SIR, SEIR, SEIRS). Trajectories are generated with Gillespie's
//! [stochastic simulation algorithm](https://en.wikipedia.org/wiki/Gillespie_algorithm) (SSA), which samples exact
//! reaction times instead of integrating rate equations over a fixed step.
//!
//! ## Contents
//!
//! - [Basic Concepts](crate#basic-concepts)
//! - [Example](crate#example)
//! - [Programming Interfaces](crate#programming-interfaces)
//! - [Epidemic Models](crate#epidemic-models)
//!
//! ## Basic Concepts
//!
//! **Species.** A species is a named population, e.g. the number of susceptible individuals. The model records the
//! value of every species after each reaction, forming a _species trajectory_. All species trajectories grow in
//! lockstep with the _time trajectory_, and index 0 of each holds the initial conditions.
//!
//! **Reaction.** A reaction is an event which changes species populations by fixed amounts, its _stoichiometry_. Each
//! reaction has a _propensity_: the rate at which it fires, computed from the current state. Reactions are identified
//! by integers which also define their order in the catalogue.
//!
//! **Curation.** After every change of the state, all propensities are re-evaluated and the catalogue is partitioned
//! into _active_ reactions (positive propensity) and _excluded_ ones (zero propensity). When no reaction is active the
//! model is _terminal_: nothing can happen anymore and the trajectory is complete.
//!
//! **Simulation.** The SSA engine repeatedly samples which active reaction fires next and after what _sojourn time_,
//! applies it and re-curates, until the model is terminal. Two sampling algorithms are supported:
//!
//! - The _direct method_ draws the sojourn time from an exponential distribution whose rate is the sum of all active
//! propensities, then picks the reaction with probability proportional to its propensity.
//! - The _first-reaction method_ draws a candidate firing time for every active reaction and fires the earliest one.
//!
//! Both produce statistically equivalent trajectories. Once a trajectory is complete the model is reset to its initial
//! conditions, so a single model can produce any number of independent trajectories.
//!
//! ## Example
//!
//! ```rust
//! use episim::{Ensemble, ReactionModel, Ssa};
//!
//! // Initial populations and reactions: infection (0) and recovery (1)
//! let mut model = ReactionModel::builder()
//!     .species("s", 480.)
//!     .species("i", 20.)
//!     .species("r", 0.)
//!     .reaction(0, |x| 2.0 * x["s"] * x["i"] / 500., [("s", -1), ("i", 1)])
//!     .reaction(1, |x| 1.0 * x["i"], [("i", -1), ("r", 1)])
//!     .build()
//!     .unwrap();
//!
//! // Create SSA engine with random seed 123
//! let mut ssa = Ssa::new(&mut model, 123);
//!
//! // Generate 100 trajectories with the direct method
//! let mut ensemble = Ensemble::new();
//! for trajectory in ssa.direct().take(100) {
//!     let trajectory = trajectory.unwrap();
//!     // The total population is preserved by both reactions
//!     assert_eq!(trajectory.final_value("s").unwrap() + trajectory.final_value("r").unwrap(), 500.);
//!     ensemble.add(&trajectory);
//! }
//! println!("Mean final size: {:.1}", ensemble.final_value("r").unwrap().mean);
//! ```
//!
//! ## Programming Interfaces
//!
//! [`ReactionModel`] holds the simulation state and the reaction catalogue. It can be created from mappings of initial
//! values, propensities and stoichiometries via [`ReactionModel::new`] or declared step by step with
//! [`ReactionModel::builder`]. Invalid declarations, such as a reaction changing an unknown species or a propensity
//! returning a negative rate, are reported as [`Error`] values.
//!
//! [`Ssa`] drives a model borrowed for the lifetime of the engine. It provides three levels of control:
//!
//! - [`Ssa::step`] fires a single reaction and reports it as a [`Step`].
//! - [`Ssa::run`] completes a trajectory and lends the model to the caller. The next call resets the model, which the
//! borrow checker enforces by tying the returned reference to the engine.
//! - [`Ssa::direct`], [`Ssa::first_reaction`] and [`Ssa::trajectories`] return an unbounded iterator of owned
//! [`Trajectory`] copies.
//!
//! Randomness is provided by a [`UniformSource`]. By default it is a PCG generator initialized with a user-defined
//! seed, so simulations are deterministic for a given seed. Tests can substitute a scripted source.
//!
//! [`Trajectory`] and [`Ensemble`] support analysis of the generated data: value lookup at arbitrary times, peaks,
//! JSON serialization and statistics over many runs.
//!
//! The engine logs completed trajectories at the debug level and every fired reaction at the trace level through the
//! [`log`](https://crates.io/crates/log) facade.
//!
//! ## Epidemic Models
//!
//! The [`epidemic`] module builds the SIR, SEIR and SEIRS compartment models as reaction networks, either directly
//! from initial counts and rates or from serializable configurations. Rates are [`Rate`] values, which can be plain
//! numbers or arbitrary functions of time, e.g. to model interventions reducing transmission.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod epidemic;
pub mod error;
pub mod log;
pub mod model;
pub mod random;
pub mod rate;
pub mod reaction;
pub mod ssa;
mod state;
pub mod trajectory;

pub use colored;
pub use error::{Error, Result};
pub use model::{ReactionModel, ReactionModelBuilder};
pub use random::{RandomSource, UniformSource};
pub use rate::Rate;
pub use reaction::{Propensity, Reaction, ReactionId, Stoichiometry};
pub use ssa::{Method, Ssa, Step, Trajectories};
pub use state::State;
pub use trajectory::{Ensemble, SpeciesTrajectory, Statistics, Trajectory, TrajectorySummary};

#[doc(hidden)]
pub use ::log as __log;

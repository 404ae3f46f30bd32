//! Epidemic compartment models expressed as reaction networks.
//!
//! Each individual moves between compartments through the following reactions (`N` is the initial population size,
//! all networks are closed so `N` stays constant):
//!
//! | id | reaction  | change            | propensity         | models        |
//! |----|-----------|-------------------|--------------------|---------------|
//! | 0  | infection | `s-1, i+1` (SIR)  | `beta(t)*s*i/N`    | all           |
//! |    |           | `s-1, e+1`        |                    | SEIR, SEIRS   |
//! | 1  | recovery  | `i-1, r+1`        | `gamma(t)*i`       | all           |
//! | 2  | onset     | `e-1, i+1`        | `sigma(t)*e`       | SEIR, SEIRS   |
//! | 3  | waning    | `r-1, s+1`        | `omega(t)*r`       | SEIRS         |
//!
//! An empty population (`N = 0`) has no infection pressure: the infection propensity is zero.
//!
//! Time-varying rates are read at the time of the latest reaction and held until the next one, so a schedule switch
//! takes effect from the first reaction after it.
//!
//! Trajectories end once no reaction is possible, i.e. when the infection has died out and, for SEIRS, all immunity
//! has waned.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{ReactionModel, ReactionModelBuilder};
use crate::rate::Rate;
use crate::reaction::ReactionId;

/// Susceptible compartment.
pub const SUSCEPTIBLE: &str = "s";
/// Exposed (infected, not yet infectious) compartment.
pub const EXPOSED: &str = "e";
/// Infectious compartment.
pub const INFECTED: &str = "i";
/// Recovered (immune) compartment.
pub const RECOVERED: &str = "r";

/// Infection of a susceptible individual.
pub const INFECTION: ReactionId = 0;
/// Recovery of an infectious individual.
pub const RECOVERY: ReactionId = 1;
/// Exposed individual becoming infectious.
pub const ONSET: ReactionId = 2;
/// Recovered individual losing immunity.
pub const WANING: ReactionId = 3;

fn infection(beta: f64, s: f64, i: f64, n: f64) -> f64 {
    if n > 0. {
        beta * s * i / n
    } else {
        0.
    }
}

/// Builds the SIR network from initial `[s, i, r]` counts.
pub fn sir(initial: [f64; 3], beta: impl Into<Rate>, gamma: impl Into<Rate>) -> Result<ReactionModel> {
    let [s, i, r] = initial;
    let n = s + i + r;
    let beta: Rate = beta.into();
    let gamma: Rate = gamma.into();
    ReactionModel::builder()
        .species(SUSCEPTIBLE, s)
        .species(INFECTED, i)
        .species(RECOVERED, r)
        .reaction(
            INFECTION,
            move |x| infection(beta.at(x.time()), x[SUSCEPTIBLE], x[INFECTED], n),
            [(SUSCEPTIBLE, -1), (INFECTED, 1)],
        )
        .reaction(
            RECOVERY,
            move |x| gamma.at(x.time()) * x[INFECTED],
            [(INFECTED, -1), (RECOVERED, 1)],
        )
        .build()
}

/// Builds the SEIR network from initial `[s, e, i, r]` counts.
pub fn seir(
    initial: [f64; 4],
    beta: impl Into<Rate>,
    sigma: impl Into<Rate>,
    gamma: impl Into<Rate>,
) -> Result<ReactionModel> {
    seir_builder(initial, beta.into(), sigma.into(), gamma.into()).build()
}

/// Builds the SEIRS network from initial `[s, e, i, r]` counts.
pub fn seirs(
    initial: [f64; 4],
    beta: impl Into<Rate>,
    sigma: impl Into<Rate>,
    gamma: impl Into<Rate>,
    omega: impl Into<Rate>,
) -> Result<ReactionModel> {
    let omega: Rate = omega.into();
    seir_builder(initial, beta.into(), sigma.into(), gamma.into())
        .reaction(
            WANING,
            move |x| omega.at(x.time()) * x[RECOVERED],
            [(RECOVERED, -1), (SUSCEPTIBLE, 1)],
        )
        .build()
}

fn seir_builder(initial: [f64; 4], beta: Rate, sigma: Rate, gamma: Rate) -> ReactionModelBuilder {
    let [s, e, i, r] = initial;
    let n = s + e + i + r;
    ReactionModel::builder()
        .species(SUSCEPTIBLE, s)
        .species(EXPOSED, e)
        .species(INFECTED, i)
        .species(RECOVERED, r)
        .reaction(
            INFECTION,
            move |x| infection(beta.at(x.time()), x[SUSCEPTIBLE], x[INFECTED], n),
            [(SUSCEPTIBLE, -1), (EXPOSED, 1)],
        )
        .reaction(
            RECOVERY,
            move |x| gamma.at(x.time()) * x[INFECTED],
            [(INFECTED, -1), (RECOVERED, 1)],
        )
        .reaction(
            ONSET,
            move |x| sigma.at(x.time()) * x[EXPOSED],
            [(EXPOSED, -1), (INFECTED, 1)],
        )
}

/// Configuration of the SIR model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SirConfig {
    /// Initial number of susceptible individuals.
    pub susceptible: f64,
    /// Initial number of infectious individuals.
    pub infected: f64,
    /// Initial number of recovered individuals.
    pub recovered: f64,
    /// Transmission rate.
    pub beta: f64,
    /// Recovery rate (inverse of the infectious period).
    pub gamma: f64,
    /// `(time, multiplier)` steps applied to `beta`, e.g. to model interventions. Order does not matter.
    pub beta_schedule: Vec<(f64, f64)>,
}

impl Default for SirConfig {
    fn default() -> Self {
        Self {
            susceptible: 480.,
            infected: 20.,
            recovered: 0.,
            beta: 2.,
            gamma: 1.,
            beta_schedule: Vec::new(),
        }
    }
}

impl SirConfig {
    /// Parses a JSON configuration, missing fields take default values.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Total population.
    pub fn population(&self) -> f64 {
        self.susceptible + self.infected + self.recovered
    }

    /// Basic reproduction number.
    pub fn r0(&self) -> f64 {
        self.beta / self.gamma
    }

    fn beta_rate(&self) -> Result<Rate> {
        Rate::schedule(self.beta, self.beta_schedule.clone())
    }

    /// Builds the reaction network.
    pub fn model(&self) -> Result<ReactionModel> {
        sir(
            [self.susceptible, self.infected, self.recovered],
            self.beta_rate()?,
            self.gamma,
        )
    }
}

/// Configuration of the SEIR model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeirConfig {
    /// Compartments and rates shared with SIR.
    #[serde(flatten)]
    pub sir: SirConfig,
    /// Initial number of exposed individuals.
    pub exposed: f64,
    /// Onset rate (inverse of the incubation period).
    pub sigma: f64,
}

impl Default for SeirConfig {
    fn default() -> Self {
        let infective_period = 3.3;
        Self {
            sir: SirConfig {
                beta: 2.4 / infective_period,
                gamma: 1. / infective_period,
                ..SirConfig::default()
            },
            exposed: 0.,
            sigma: 1. / 5.1,
        }
    }
}

impl SeirConfig {
    /// Parses a JSON configuration, missing fields take default values.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Total population.
    pub fn population(&self) -> f64 {
        self.sir.population() + self.exposed
    }

    fn initial(&self) -> [f64; 4] {
        [self.sir.susceptible, self.exposed, self.sir.infected, self.sir.recovered]
    }

    /// Builds the reaction network.
    pub fn model(&self) -> Result<ReactionModel> {
        seir(self.initial(), self.sir.beta_rate()?, self.sigma, self.sir.gamma)
    }
}

/// Configuration of the SEIRS model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeirsConfig {
    /// Compartments and rates shared with SEIR.
    #[serde(flatten)]
    pub seir: SeirConfig,
    /// Waning rate (inverse of the immunity period).
    pub omega: f64,
}

impl Default for SeirsConfig {
    fn default() -> Self {
        Self {
            seir: SeirConfig::default(),
            omega: 1. / 365.,
        }
    }
}

impl SeirsConfig {
    /// Parses a JSON configuration, missing fields take default values.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Builds the reaction network.
    pub fn model(&self) -> Result<ReactionModel> {
        let sir = &self.seir.sir;
        seirs(self.seir.initial(), sir.beta_rate()?, self.seir.sigma, sir.gamma, self.omega)
    }
}

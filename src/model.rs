//! Reaction model: species and time trajectories together with the reaction catalogue.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::reaction::{Propensity, Reaction, ReactionId, Stoichiometry};
use crate::state::State;
use crate::trajectory::{SpeciesTrajectory, Trajectory};
use crate::{log_debug, log_trace};

/// Simulation state of a reaction network.
///
/// The model owns one trajectory per species plus the time trajectory, all growing in lockstep: index 0 holds the
/// initial conditions of the current run and every applied step appends one value to each of them. The reaction
/// catalogue is fixed at construction and kept in identifier order. After every state change the catalogue is
/// [curated](ReactionModel::curate) into the _active_ reactions (positive propensity) and the _excluded_ ones (zero
/// propensity). Both sets preserve catalogue order, so walking the active reactions is reproducible run over run.
///
/// The model is reusable: [`reset`](ReactionModel::reset) truncates all trajectories back to the initial conditions.
#[derive(Debug)]
pub struct ReactionModel {
    names: Vec<String>,
    index: FxHashMap<String, usize>,
    species: Vec<Vec<f64>>,
    time: Vec<f64>,
    reactions: Vec<Reaction>,
    propensities: Vec<f64>,
    active: Vec<usize>,
    excluded: Vec<usize>,
}

impl ReactionModel {
    /// Creates a model from initial species values, a propensity per reaction and a stoichiometric delta per reaction.
    ///
    /// Species keep the order in which they are listed. Deltas may omit species, those are left unchanged by the
    /// reaction. Every reaction must have both a propensity and a delta. The initial active/excluded partition is
    /// computed before returning.
    pub fn new<I, N, P, T, D, S>(initial: I, propensities: P, stoichiometry: T) -> Result<Self>
    where
        I: IntoIterator<Item = (N, f64)>,
        N: Into<String>,
        P: IntoIterator<Item = (ReactionId, Propensity)>,
        T: IntoIterator<Item = (ReactionId, D)>,
        D: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut builder = Self::builder();
        for (name, value) in initial {
            builder = builder.species(name, value);
        }

        let mut propensities: BTreeMap<ReactionId, Propensity> = propensities.into_iter().collect();
        let stoichiometry: BTreeMap<ReactionId, D> = stoichiometry.into_iter().collect();
        for (id, delta) in stoichiometry {
            let propensity = propensities.remove(&id).ok_or(Error::MissingPropensity(id))?;
            builder = builder.reaction_with(id, propensity, delta);
        }
        if let Some((&id, _)) = propensities.iter().next() {
            return Err(Error::MissingStoichiometry(id));
        }
        builder.build()
    }

    /// Returns a builder for declaring species and reactions one by one.
    pub fn builder() -> ReactionModelBuilder {
        ReactionModelBuilder::default()
    }

    /// Returns `true` if no reaction can fire, i.e. the current trajectory is complete.
    pub fn is_terminal(&self) -> bool {
        self.active.is_empty()
    }

    /// Re-evaluates every reaction's propensity at the current state and re-partitions the catalogue.
    ///
    /// All reactions are evaluated, both previously active and previously excluded ones, since any propensity may
    /// depend on any species. Fails if a propensity is negative, NaN or infinite, leaving the previous partition and
    /// propensities in place.
    pub fn curate(&mut self) -> Result<()> {
        let time = self.current_time();
        let state = State::new(&self.index, &self.species, time);
        let mut propensities = Vec::with_capacity(self.reactions.len());
        let mut active = Vec::with_capacity(self.reactions.len());
        let mut excluded = Vec::with_capacity(self.reactions.len());
        for (idx, reaction) in self.reactions.iter().enumerate() {
            let value = reaction.propensity().eval(&state);
            if !(value >= 0.0 && value.is_finite()) {
                return Err(Error::InvalidPropensity {
                    reaction: reaction.id(),
                    value,
                });
            }
            propensities.push(value);
            if value > 0.0 {
                active.push(idx);
            } else {
                excluded.push(idx);
            }
        }
        self.propensities = propensities;
        self.active = active;
        self.excluded = excluded;
        Ok(())
    }

    /// Appends one step: the time advances by `elapsed` and every species changes by its delta.
    ///
    /// The state is validated before anything is appended, so a failed call leaves all trajectories untouched. The
    /// partition is not updated, call [`curate`](ReactionModel::curate) afterwards.
    pub fn apply(&mut self, delta: &Stoichiometry, elapsed: f64) -> Result<()> {
        extend(&self.names, &mut self.species, &mut self.time, delta.deltas(), elapsed)
    }

    /// Fires the reaction at the given catalogue position and re-curates.
    ///
    /// If curation fails the new point is dropped again, so the model stays at the state its cache describes.
    pub(crate) fn fire(&mut self, position: usize, elapsed: f64) -> Result<()> {
        let deltas = self.reactions[position].stoichiometry().deltas();
        extend(&self.names, &mut self.species, &mut self.time, deltas, elapsed)?;
        if let Err(err) = self.curate() {
            // the cache still describes the previous point
            let points = self.time.len() - 1;
            self.time.truncate(points);
            for values in &mut self.species {
                values.truncate(points);
            }
            return Err(err);
        }
        log_trace!(
            self.current_time(),
            "reaction {} fired after {:.6}",
            self.reactions[position].id(),
            elapsed
        );
        Ok(())
    }

    /// Truncates every trajectory to its initial value and re-curates the catalogue.
    pub fn reset(&mut self) -> Result<()> {
        let steps = self.steps();
        for values in self.species.iter_mut() {
            values.truncate(1);
        }
        self.time.truncate(1);
        log_debug!(self.current_time(), "model reset after {} steps", steps);
        self.curate()
    }

    /// Species names in declaration order.
    pub fn species_names(&self) -> &[String] {
        &self.names
    }

    /// Declaration index of the named species.
    pub fn species_index(&self, species: &str) -> Option<usize> {
        self.index.get(species).copied()
    }

    /// Trajectory of the named species.
    pub fn trajectory(&self, species: &str) -> Option<&[f64]> {
        self.species_index(species).map(|idx| self.species[idx].as_slice())
    }

    /// Time trajectory.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Time of the last recorded step.
    pub fn current_time(&self) -> f64 {
        self.time[self.time.len() - 1]
    }

    /// Current value of the named species.
    pub fn value(&self, species: &str) -> Option<f64> {
        self.trajectory(species).and_then(|values| values.last().copied())
    }

    /// View of the current state, as seen by propensity functions.
    pub fn state(&self) -> State<'_> {
        State::new(&self.index, &self.species, self.current_time())
    }

    /// Number of recorded points, including the initial conditions.
    pub fn points(&self) -> usize {
        self.time.len()
    }

    /// Number of steps applied since the initial conditions.
    pub fn steps(&self) -> usize {
        self.time.len() - 1
    }

    /// Reaction catalogue in identifier order.
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    /// Looks up a reaction by identifier.
    pub fn reaction(&self, id: ReactionId) -> Option<&Reaction> {
        self.position(id).map(|idx| &self.reactions[idx])
    }

    /// Identifiers of the active reactions in catalogue order.
    pub fn active(&self) -> impl Iterator<Item = ReactionId> + '_ {
        self.active.iter().map(|&idx| self.reactions[idx].id())
    }

    /// Identifiers of the excluded reactions in catalogue order.
    pub fn excluded(&self) -> impl Iterator<Item = ReactionId> + '_ {
        self.excluded.iter().map(|&idx| self.reactions[idx].id())
    }

    /// Returns `true` if the reaction was found active by the last curation.
    pub fn is_active(&self, id: ReactionId) -> bool {
        self.position(id).is_some_and(|idx| self.active.binary_search(&idx).is_ok())
    }

    /// Propensity of the reaction computed by the last curation.
    pub fn propensity(&self, id: ReactionId) -> Option<f64> {
        self.position(id).map(|idx| self.propensities[idx])
    }

    /// Copies the trajectories recorded so far.
    pub fn snapshot(&self) -> Trajectory {
        let species = self
            .names
            .iter()
            .zip(self.species.iter())
            .map(|(name, values)| SpeciesTrajectory {
                name: name.clone(),
                values: values.clone(),
            })
            .collect();
        Trajectory::new(self.time.clone(), species)
    }

    pub(crate) fn active_positions(&self) -> &[usize] {
        &self.active
    }

    pub(crate) fn propensity_at(&self, position: usize) -> f64 {
        self.propensities[position]
    }

    pub(crate) fn reaction_at(&self, position: usize) -> &Reaction {
        &self.reactions[position]
    }

    fn position(&self, id: ReactionId) -> Option<usize> {
        self.reactions.binary_search_by_key(&id, |r| r.id()).ok()
    }
}

fn extend(
    names: &[String],
    species: &mut [Vec<f64>],
    time: &mut Vec<f64>,
    deltas: &[i64],
    elapsed: f64,
) -> Result<()> {
    if deltas.len() != species.len() {
        return Err(Error::StoichiometryMismatch {
            expected: species.len(),
            found: deltas.len(),
        });
    }
    if !(elapsed > 0.0 && elapsed.is_finite()) {
        return Err(Error::InvalidSojourn(elapsed));
    }
    let last = time[time.len() - 1];
    let now = last + elapsed;
    if !(now > last) {
        return Err(Error::TimeStalled { time: last, elapsed });
    }
    for (idx, values) in species.iter().enumerate() {
        let value = values[values.len() - 1] + deltas[idx] as f64;
        if value < 0.0 {
            return Err(Error::NegativePopulation {
                species: names[idx].clone(),
                value,
                time: now,
            });
        }
    }
    for (values, &delta) in species.iter_mut().zip(deltas) {
        let value = values[values.len() - 1] + delta as f64;
        values.push(value);
    }
    time.push(now);
    Ok(())
}

/// Builder for [`ReactionModel`].
///
/// ```rust
/// use episim::ReactionModel;
///
/// let model = ReactionModel::builder()
///     .species("s", 480.)
///     .species("i", 20.)
///     .species("r", 0.)
///     .reaction(0, |x| 2.0 * x["s"] * x["i"] / 500., [("s", -1), ("i", 1)])
///     .reaction(1, |x| 1.0 * x["i"], [("i", -1), ("r", 1)])
///     .build()
///     .unwrap();
/// assert_eq!(model.active().collect::<Vec<_>>(), vec![0, 1]);
/// ```
pub struct ReactionModelBuilder {
    species: Vec<(String, f64)>,
    start_time: f64,
    reactions: Vec<(ReactionId, Propensity, Vec<(String, i64)>)>,
}

impl Default for ReactionModelBuilder {
    fn default() -> Self {
        Self {
            species: Vec::new(),
            start_time: 0.,
            reactions: Vec::new(),
        }
    }
}

impl ReactionModelBuilder {
    /// Declares a species with its initial value.
    pub fn species(mut self, name: impl Into<String>, value: f64) -> Self {
        self.species.push((name.into(), value));
        self
    }

    /// Sets the time of the initial conditions (0 by default).
    pub fn start_time(mut self, time: f64) -> Self {
        self.start_time = time;
        self
    }

    /// Declares a reaction with propensity given as a function of the current state.
    pub fn reaction<F, D, S>(self, id: ReactionId, propensity: F, delta: D) -> Self
    where
        F: Fn(&State) -> f64 + 'static,
        D: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        self.reaction_with(id, Propensity::new(propensity), delta)
    }

    /// Declares a reaction with an already wrapped propensity.
    pub fn reaction_with<D, S>(mut self, id: ReactionId, propensity: Propensity, delta: D) -> Self
    where
        D: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let delta = delta.into_iter().map(|(name, change)| (name.into(), change)).collect();
        self.reactions.push((id, propensity, delta));
        self
    }

    /// Validates the declarations and builds the model with its initial partition.
    pub fn build(self) -> Result<ReactionModel> {
        if !(self.start_time >= 0.0 && self.start_time.is_finite()) {
            return Err(Error::InvalidStartTime(self.start_time));
        }

        let mut names = Vec::with_capacity(self.species.len());
        let mut index = FxHashMap::default();
        let mut species = Vec::with_capacity(self.species.len());
        for (name, value) in self.species {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(Error::InvalidInitialValue { species: name, value });
            }
            if index.insert(name.clone(), names.len()).is_some() {
                return Err(Error::DuplicateSpecies(name));
            }
            names.push(name);
            species.push(vec![value]);
        }

        let mut reactions = self.reactions;
        reactions.sort_by_key(|(id, _, _)| *id);
        let mut catalogue: Vec<Reaction> = Vec::with_capacity(reactions.len());
        for (id, propensity, delta) in reactions {
            if catalogue.last().is_some_and(|r| r.id() == id) {
                return Err(Error::DuplicateReaction(id));
            }
            let mut deltas = vec![0; names.len()];
            for (name, change) in delta {
                match index.get(&name) {
                    Some(&idx) => deltas[idx] += change,
                    None => return Err(Error::UnknownSpecies { reaction: id, species: name }),
                }
            }
            catalogue.push(Reaction::new(id, Stoichiometry::from_deltas(deltas), propensity));
        }

        let mut model = ReactionModel {
            names,
            index,
            species,
            time: vec![self.start_time],
            propensities: vec![0.; catalogue.len()],
            reactions: catalogue,
            active: Vec::new(),
            excluded: Vec::new(),
        };
        model.curate()?;
        Ok(model)
    }
}

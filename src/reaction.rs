//! Reaction catalogue entries.

use std::fmt::{Debug, Formatter};

use crate::state::State;

/// Reaction identifier.
///
/// Identifiers also define the catalogue order: reactions are stored, curated and walked by increasing identifier.
pub type ReactionId = u32;

/// Instantaneous rate of a reaction as a function of the current model state.
///
/// The function must be pure and return a non-negative value. A rate of exactly zero marks the reaction as currently
/// impossible, a negative or NaN rate is rejected as a configuration error.
pub struct Propensity(Box<dyn Fn(&State) -> f64>);

impl Propensity {
    /// Wraps a function of the current state.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&State) -> f64 + 'static,
    {
        Self(Box::new(f))
    }

    /// Propensity which does not depend on the state.
    pub fn constant(rate: f64) -> Self {
        Self::new(move |_| rate)
    }

    /// Evaluates the propensity at the given state.
    pub fn eval(&self, state: &State) -> f64 {
        (self.0)(state)
    }
}

impl Debug for Propensity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Propensity(..)")
    }
}

/// Change of every species population caused by one firing of a reaction.
///
/// Deltas are stored densely in species declaration order, species not affected by the reaction hold zero. This keeps
/// all species trajectories growing in lockstep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stoichiometry {
    deltas: Vec<i64>,
}

impl Stoichiometry {
    /// Creates a stoichiometry from per-species deltas listed in species declaration order.
    pub fn from_deltas(deltas: Vec<i64>) -> Self {
        Self { deltas }
    }

    /// Stoichiometry leaving every species unchanged.
    pub fn zero(species: usize) -> Self {
        Self::from_deltas(vec![0; species])
    }

    /// Number of species covered.
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    /// Returns `true` if no species is covered.
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Delta of the species with given declaration index.
    pub fn delta(&self, species: usize) -> i64 {
        self.deltas.get(species).copied().unwrap_or(0)
    }

    /// Deltas in species declaration order.
    pub fn deltas(&self) -> &[i64] {
        &self.deltas
    }

    /// Returns `true` if the total population is unchanged by the reaction.
    pub fn is_conservative(&self) -> bool {
        self.deltas.iter().sum::<i64>() == 0
    }
}

/// Immutable catalogue entry: identifier, stoichiometric delta and propensity.
#[derive(Debug)]
pub struct Reaction {
    id: ReactionId,
    stoichiometry: Stoichiometry,
    propensity: Propensity,
}

impl Reaction {
    pub(crate) fn new(id: ReactionId, stoichiometry: Stoichiometry, propensity: Propensity) -> Self {
        Self {
            id,
            stoichiometry,
            propensity,
        }
    }

    /// Reaction identifier.
    pub fn id(&self) -> ReactionId {
        self.id
    }

    /// Population change caused by the reaction.
    pub fn stoichiometry(&self) -> &Stoichiometry {
        &self.stoichiometry
    }

    /// Rate function of the reaction.
    pub fn propensity(&self) -> &Propensity {
        &self.propensity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_species_delta_is_zero() {
        let sto = Stoichiometry::from_deltas(vec![-1, 1]);
        assert_eq!(sto.delta(0), -1);
        assert_eq!(sto.delta(1), 1);
        assert_eq!(sto.delta(5), 0);
        assert!(sto.is_conservative());
        assert!(!Stoichiometry::from_deltas(vec![1, 0]).is_conservative());
    }
}

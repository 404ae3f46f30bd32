//! Read-only view of the model state handed to propensity functions.

use std::ops::Index;

use rustc_hash::FxHashMap;

/// Read-only view of the latest model state, handed to propensity functions.
#[derive(Clone, Copy)]
pub struct State<'a> {
    index: &'a FxHashMap<String, usize>,
    species: &'a [Vec<f64>],
    time: f64,
}

impl<'a> State<'a> {
    pub(crate) fn new(index: &'a FxHashMap<String, usize>, species: &'a [Vec<f64>], time: f64) -> Self {
        Self { index, species, time }
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Current value of the named species, or `None` if there is no such species.
    pub fn get(&self, species: &str) -> Option<f64> {
        self.index.get(species).map(|&idx| self.value(idx))
    }

    /// Current value of the species with given declaration index.
    ///
    /// Panics if the index is out of range.
    pub fn value(&self, species: usize) -> f64 {
        self.species[species].last().copied().unwrap_or(f64::NAN)
    }

    /// Number of species.
    pub fn len(&self) -> usize {
        self.species.len()
    }

    /// Returns `true` if the model has no species.
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Sum of all species values.
    pub fn total(&self) -> f64 {
        (0..self.species.len()).map(|idx| self.value(idx)).sum()
    }
}

impl Index<&str> for State<'_> {
    type Output = f64;

    /// Panics if there is no such species.
    fn index(&self, species: &str) -> &f64 {
        match self.index.get(species) {
            Some(&idx) => self.species[idx].last().unwrap_or(&f64::NAN),
            None => panic!("unknown species '{}'", species),
        }
    }
}

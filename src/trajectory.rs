//! Owned trajectory snapshots and statistics over many trajectories.

use serde::{Deserialize, Serialize};

/// Values of one species over a trajectory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesTrajectory {
    /// Species name.
    pub name: String,
    /// Value at each recorded point.
    pub values: Vec<f64>,
}

/// Owned copy of a model run: the time trajectory and one trajectory per species, all of equal length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    time: Vec<f64>,
    species: Vec<SpeciesTrajectory>,
}

impl Trajectory {
    pub(crate) fn new(time: Vec<f64>, species: Vec<SpeciesTrajectory>) -> Self {
        Self { time, species }
    }

    /// Number of recorded points, including the initial conditions.
    pub fn points(&self) -> usize {
        self.time.len()
    }

    /// Number of reactions fired.
    pub fn steps(&self) -> usize {
        self.time.len().saturating_sub(1)
    }

    /// Time trajectory.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Species trajectories in declaration order.
    pub fn species(&self) -> &[SpeciesTrajectory] {
        &self.species
    }

    /// Values of the named species.
    pub fn values(&self, species: &str) -> Option<&[f64]> {
        self.species
            .iter()
            .find(|s| s.name == species)
            .map(|s| s.values.as_slice())
    }

    /// Time at which the trajectory ended.
    pub fn final_time(&self) -> f64 {
        self.time.last().copied().unwrap_or(0.)
    }

    /// Last value of the named species.
    pub fn final_value(&self, species: &str) -> Option<f64> {
        self.values(species).and_then(|v| v.last().copied())
    }

    /// Value of the named species at an arbitrary time.
    ///
    /// Populations are piecewise constant between reactions, so this is the value recorded at the last point not
    /// after `time`. Returns `None` before the start of the trajectory or for an unknown species.
    pub fn value_at(&self, species: &str, time: f64) -> Option<f64> {
        let values = self.values(species)?;
        let after = self.time.partition_point(|&t| t <= time);
        if after == 0 {
            return None;
        }
        values.get(after - 1).copied()
    }

    /// Maximum value of the named species and the earliest time it was reached.
    pub fn peak(&self, species: &str) -> Option<(f64, f64)> {
        let values = self.values(species)?;
        let mut best: Option<(f64, f64)> = None;
        for (&time, &value) in self.time.iter().zip(values) {
            if best.map_or(true, |(_, v)| value > v) {
                best = Some((time, value));
            }
        }
        best
    }

    /// Serializes the trajectory to a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Summary of the trajectory.
    pub fn summary(&self) -> TrajectorySummary {
        TrajectorySummary {
            steps: self.steps(),
            final_time: self.final_time(),
            species: self
                .species
                .iter()
                .map(|s| {
                    let (peak_time, peak) = self.peak(&s.name).unwrap_or((0., 0.));
                    SpeciesSummary {
                        name: s.name.clone(),
                        initial: s.values.first().copied().unwrap_or(0.),
                        last: s.values.last().copied().unwrap_or(0.),
                        peak,
                        peak_time,
                    }
                })
                .collect(),
        }
    }
}

/// Per-species part of [`TrajectorySummary`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSummary {
    /// Species name.
    pub name: String,
    /// Initial value.
    pub initial: f64,
    /// Final value.
    pub last: f64,
    /// Maximum value.
    pub peak: f64,
    /// Earliest time of the maximum.
    pub peak_time: f64,
}

/// Compact description of a trajectory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySummary {
    /// Number of reactions fired.
    pub steps: usize,
    /// Time at which the trajectory ended.
    pub final_time: f64,
    /// Per-species values.
    pub species: Vec<SpeciesSummary>,
}

/// Sample statistics of a quantity over an ensemble.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Sample size.
    pub count: usize,
    /// Mean value.
    pub mean: f64,
    /// Sample standard deviation (0 for a single sample).
    pub std_dev: f64,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl Statistics {
    /// Computes statistics of the values, `None` if there are none.
    pub fn of<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let var = if count > 1 {
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64
        } else {
            0.
        };
        Some(Self {
            count,
            mean,
            std_dev: var.sqrt(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Collection of trajectory summaries from repeated runs of the same model.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Ensemble {
    runs: Vec<TrajectorySummary>,
}

impl Ensemble {
    /// Creates an empty ensemble.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a trajectory.
    pub fn add(&mut self, trajectory: &Trajectory) {
        self.runs.push(trajectory.summary());
    }

    /// Number of collected trajectories.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Returns `true` if no trajectory was collected.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Collected summaries.
    pub fn runs(&self) -> &[TrajectorySummary] {
        &self.runs
    }

    /// Statistics of the trajectory durations.
    pub fn final_time(&self) -> Option<Statistics> {
        Statistics::of(self.runs.iter().map(|r| r.final_time))
    }

    /// Statistics of the number of fired reactions.
    pub fn steps(&self) -> Option<Statistics> {
        Statistics::of(self.runs.iter().map(|r| r.steps as f64))
    }

    /// Statistics of the final value of the named species.
    pub fn final_value(&self, species: &str) -> Option<Statistics> {
        self.species_stats(species, |s| s.last)
    }

    /// Statistics of the peak value of the named species.
    pub fn peak(&self, species: &str) -> Option<Statistics> {
        self.species_stats(species, |s| s.peak)
    }

    /// Statistics of the time at which the named species peaked.
    pub fn peak_time(&self, species: &str) -> Option<Statistics> {
        self.species_stats(species, |s| s.peak_time)
    }

    fn species_stats<F: Fn(&SpeciesSummary) -> f64>(&self, species: &str, f: F) -> Option<Statistics> {
        Statistics::of(
            self.runs
                .iter()
                .filter_map(|r| r.species.iter().find(|s| s.name == species))
                .map(f),
        )
    }
}

impl Extend<Trajectory> for Ensemble {
    fn extend<T: IntoIterator<Item = Trajectory>>(&mut self, iter: T) {
        for trajectory in iter {
            self.add(&trajectory);
        }
    }
}

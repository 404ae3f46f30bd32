use std::collections::VecDeque;

use episim::epidemic::{self, SeirConfig, SeirsConfig, SirConfig};
use episim::{Ensemble, Error, Method, ReactionModel, Ssa, Trajectory, UniformSource};

const METHODS: [Method; 2] = [Method::Direct, Method::FirstReaction];

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn sir() -> ReactionModel {
    ReactionModel::builder()
        .species("s", 480.)
        .species("i", 20.)
        .species("r", 0.)
        .reaction(0, |x| 2.0 * x["s"] * x["i"] / 500., [("s", -1), ("i", 1)])
        .reaction(1, |x| 1.0 * x["i"], [("i", -1), ("r", 1)])
        .build()
        .unwrap()
}

fn total(trajectory: &Trajectory, point: usize) -> f64 {
    trajectory.species().iter().map(|s| s.values[point]).sum()
}

struct Fixed(f64);

impl UniformSource for Fixed {
    fn draw(&mut self) -> f64 {
        self.0
    }
}

struct Script(VecDeque<f64>);

impl UniformSource for Script {
    fn draw(&mut self) -> f64 {
        self.0.pop_front().unwrap_or(0.5)
    }
}

#[test]
fn time_is_strictly_increasing() {
    init_logger();
    let mut model = sir();
    for method in METHODS {
        let mut ssa = Ssa::new(&mut model, 7);
        for trajectory in ssa.trajectories(method).take(20) {
            let trajectory = trajectory.unwrap();
            assert_eq!(trajectory.time()[0], 0.);
            for pair in trajectory.time().windows(2) {
                assert!(pair[1] > pair[0], "{:?}", pair);
            }
        }
    }
}

#[test]
fn closed_network_conserves_population() {
    init_logger();
    let mut model = epidemic::seirs([95., 3., 2., 0.], 3., 0.5, 1., 0.2).unwrap();
    assert!(model.reactions().iter().all(|r| r.stoichiometry().is_conservative()));
    for method in METHODS {
        let mut ssa = Ssa::new(&mut model, 11);
        for trajectory in ssa.trajectories(method).take(10) {
            let trajectory = trajectory.unwrap();
            for point in 0..trajectory.points() {
                assert_eq!(total(&trajectory, point), 100.);
            }
        }
    }
}

#[test]
fn trajectories_end_exactly_when_terminal() {
    init_logger();
    for method in METHODS {
        let mut model = sir();
        let mut ssa = Ssa::new(&mut model, 3);
        let mut model_steps = 0;
        while !ssa.model().is_terminal() {
            assert!(ssa.model().active().count() > 0);
            ssa.step(method).unwrap().unwrap();
            model_steps += 1;
        }
        assert_eq!(ssa.model().active().count(), 0);
        assert_eq!(ssa.step(method).unwrap(), None);
        assert_eq!(ssa.model().steps(), model_steps);
        assert_eq!(ssa.model().value("i"), Some(0.));
    }
}

#[test]
fn same_seed_same_trajectory() {
    let mut model = sir();
    for method in METHODS {
        let first: Vec<Trajectory> = Ssa::new(&mut model, 99)
            .trajectories(method)
            .take(3)
            .collect::<Result<_, _>>()
            .unwrap();
        let second: Vec<Trajectory> = Ssa::new(&mut model, 99)
            .trajectories(method)
            .take(3)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(first, second);
        assert_ne!(first[0], first[1]);
    }
}

#[test]
fn reset_restores_construction_state() {
    let mut model = sir();
    let active: Vec<_> = model.active().collect();
    let excluded: Vec<_> = model.excluded().collect();
    {
        let mut ssa = Ssa::new(&mut model, 5);
        let completed = ssa.run(Method::FirstReaction).unwrap();
        assert!(completed.steps() > 0);
        assert!(completed.is_terminal());
    }
    model.reset().unwrap();
    assert_eq!(model.points(), 1);
    assert_eq!(model.time(), &[0.]);
    assert_eq!(model.trajectory("s").unwrap(), &[480.]);
    assert_eq!(model.trajectory("i").unwrap(), &[20.]);
    assert_eq!(model.trajectory("r").unwrap(), &[0.]);
    assert_eq!(model.active().collect::<Vec<_>>(), active);
    assert_eq!(model.excluded().collect::<Vec<_>>(), excluded);
}

#[test]
fn populations_stay_non_negative() {
    let mut model = epidemic::seir([180., 10., 10., 0.], 2., 1., 0.5).unwrap();
    for method in METHODS {
        let mut ssa = Ssa::new(&mut model, 21);
        for trajectory in ssa.trajectories(method).take(10) {
            let trajectory = trajectory.unwrap();
            for species in trajectory.species() {
                assert!(species.values.iter().all(|&v| v >= 0.), "{}", species.name);
                assert_eq!(species.values.len(), trajectory.points());
            }
        }
    }
}

#[test]
fn reference_scenario_first_step() {
    let mut model = sir();
    let mut ssa = Ssa::with_source(&mut model, Fixed(0.5));
    let p0 = 2.0 * 480. * 20. / 500.;
    let p1 = 1.0 * 20.;
    let total = p0 + p1;
    let step = ssa.step(Method::Direct).unwrap().unwrap();
    let expected = if p0 > total * 0.5 { 0 } else { 1 };
    assert_eq!(step.reaction, expected);
    assert_eq!(step.reaction, 0);
    assert_eq!(step.time, 2f64.ln() / total);
    assert_eq!(ssa.model().value("s"), Some(479.));
    assert_eq!(ssa.model().value("i"), Some(21.));
    assert_eq!(ssa.model().value("r"), Some(0.));
}

#[test]
fn first_reaction_tie_goes_to_lower_id() {
    let mut model = ReactionModel::builder()
        .species("x", 1.)
        .species("a", 0.)
        .species("b", 0.)
        .reaction(1, |x| 2. * x["x"], [("x", -1), ("b", 1)])
        .reaction(0, |x| 2. * x["x"], [("x", -1), ("a", 1)])
        .build()
        .unwrap();
    let mut ssa = Ssa::with_source(&mut model, Fixed(0.3));
    let trajectory = ssa.first_reaction().next().unwrap().unwrap();
    assert_eq!(trajectory.values("a").unwrap(), &[0., 1.]);
    assert_eq!(trajectory.values("b").unwrap(), &[0., 0.]);
}

#[test]
fn failed_trajectory_is_reset_before_the_next() {
    let mut model = sir();
    // a valid step, a degenerate draw, then valid draws again
    let mut ssa = Ssa::with_source(&mut model, Script(VecDeque::from([0.5, 0.5, 1.0])));
    let mut trajectories = ssa.direct();
    assert_eq!(trajectories.next().unwrap(), Err(Error::InvalidDraw(1.0)));
    let trajectory = trajectories.next().unwrap().unwrap();
    assert_eq!(trajectory.values("s").unwrap()[0], 480.);
    assert_eq!(trajectory.final_value("i"), Some(0.));
}

#[test]
fn abandoned_trajectory_does_not_corrupt_reset() {
    let mut model = sir();
    {
        let mut ssa = Ssa::new(&mut model, 8);
        for _ in 0..15 {
            ssa.step(Method::Direct).unwrap();
        }
    }
    assert_eq!(model.steps(), 15);
    model.reset().unwrap();
    let mut ssa = Ssa::new(&mut model, 8);
    let trajectory = ssa.direct().next().unwrap().unwrap();
    assert_eq!(trajectory.time()[0], 0.);
    assert_eq!(trajectory.values("i").unwrap()[0], 20.);
}

#[test]
fn invalid_propensity_aborts_trajectory() {
    let mut model = ReactionModel::builder()
        .species("a", 3.)
        .reaction(0, |x| x["a"], [("a", -1)])
        .reaction(1, |x| if x["a"] < 2. { -1. } else { 0. }, [("a", 1)])
        .build()
        .unwrap();
    let mut ssa = Ssa::new(&mut model, 1);
    let result = ssa.run(Method::Direct).map(|m| m.steps());
    assert_eq!(result, Err(Error::InvalidPropensity { reaction: 1, value: -1. }));
}

#[test]
fn failed_curation_leaves_model_unchanged() {
    let mut model = ReactionModel::builder()
        .species("a", 3.)
        .reaction(0, |x| x["a"], [("a", -1)])
        .reaction(1, |x| if x["a"] < 3. { -1. } else { 0. }, [("a", 1)])
        .build()
        .unwrap();
    let mut ssa = Ssa::new(&mut model, 1);
    for _ in 0..2 {
        assert_eq!(
            ssa.step(Method::Direct),
            Err(Error::InvalidPropensity { reaction: 1, value: -1. })
        );
        assert_eq!(ssa.model().trajectory("a").unwrap(), &[3.]);
        assert_eq!(ssa.model().points(), 1);
        assert_eq!(ssa.model().active().collect::<Vec<_>>(), vec![0]);
    }
}

#[test]
fn stalled_time_aborts_step() {
    let mut model = ReactionModel::builder()
        .species("a", 5.)
        .start_time(1e12)
        .reaction(0, |x| 1e6 * x["a"], [("a", -1)])
        .build()
        .unwrap();
    let mut ssa = Ssa::with_source(&mut model, Fixed(0.5));
    let err = ssa.step(Method::Direct).unwrap_err();
    assert!(matches!(err, Error::TimeStalled { time, .. } if time == 1e12), "{:?}", err);
    assert_eq!(ssa.model().time(), &[1e12]);
    assert_eq!(ssa.model().value("a"), Some(5.));
    assert!(ssa.run(Method::Direct).is_err());
}

#[test]
fn pure_death_extinction_time_matches_theory() {
    // mean extinction time of a -> 0 at rate a is the harmonic number H_10
    let expected: f64 = (1..=10).map(|j| 1. / j as f64).sum();
    let mut model = ReactionModel::builder()
        .species("a", 10.)
        .reaction(0, |x| x["a"], [("a", -1)])
        .build()
        .unwrap();
    for method in METHODS {
        let mut ensemble = Ensemble::new();
        ensemble.extend(
            Ssa::new(&mut model, 2024)
                .trajectories(method)
                .take(2000)
                .map(|t| t.unwrap()),
        );
        let time = ensemble.final_time().unwrap();
        assert!((time.mean - expected).abs() < 0.15, "{}: {}", method, time.mean);
        assert_eq!(ensemble.steps().unwrap().mean, 10.);
    }
}

#[test]
fn branching_follows_propensity_ratio() {
    let mut model = ReactionModel::builder()
        .species("a", 1.)
        .species("b", 0.)
        .species("c", 0.)
        .reaction(0, |x| 3. * x["a"], [("a", -1), ("b", 1)])
        .reaction(1, |x| 1. * x["a"], [("a", -1), ("c", 1)])
        .build()
        .unwrap();
    for method in METHODS {
        let mut ensemble = Ensemble::new();
        ensemble.extend(Ssa::new(&mut model, 77).trajectories(method).take(4000).map(|t| t.unwrap()));
        let b = ensemble.final_value("b").unwrap().mean;
        assert!((b - 0.75).abs() < 0.04, "{}: {}", method, b);
    }
}

#[test]
fn epidemic_configs_run_to_extinction() {
    init_logger();
    let mut sir = SirConfig::default().model().unwrap();
    let trajectory = Ssa::new(&mut sir, 1).direct().next().unwrap().unwrap();
    assert_eq!(trajectory.final_value("i"), Some(0.));

    let mut seir = SeirConfig::default().model().unwrap();
    let trajectory = Ssa::new(&mut seir, 1).first_reaction().next().unwrap().unwrap();
    assert_eq!(trajectory.final_value("e"), Some(0.));
    assert_eq!(trajectory.final_value("i"), Some(0.));

    let mut seirs = SeirsConfig::default().model().unwrap();
    let trajectory = Ssa::new(&mut seirs, 1).direct().next().unwrap().unwrap();
    assert_eq!(trajectory.final_value("r"), Some(0.));
    assert_eq!(trajectory.final_value("s"), Some(500.));
}

#[test]
fn intervention_schedule_stops_transmission() {
    let config = SirConfig {
        susceptible: 990.,
        infected: 10.,
        beta: 3.,
        beta_schedule: vec![(0.5, 0.)],
        ..SirConfig::default()
    };
    let mut model = config.model().unwrap();
    let mut ssa = Ssa::new(&mut model, 4);
    for trajectory in ssa.direct().take(20) {
        let trajectory = trajectory.unwrap();
        let s = trajectory.values("s").unwrap();
        for (point, &t) in trajectory.time().iter().enumerate().skip(1) {
            // rates are held at their value from the previous reaction
            if trajectory.time()[point - 1] >= 0.5 {
                assert!(s[point] == s[point - 1], "infection at {}", t);
            }
        }
    }
}

//! End to end outbreaks on small hand-built cities.

use std::collections::BTreeSet;

use petgraph::stable_graph::NodeIndex;
use zombie_spread::{
    config::SpreadConfig, generators, simulation::Simulation, City, Rule, SpreadError,
};

fn run(city: City, zombies: &[usize], rule: Rule, timesteps: u32) -> BTreeSet<usize> {
    let dir = tempfile::tempdir().unwrap();
    let config = SpreadConfig {
        rule,
        timesteps,
        save_frames: false,
        animate: false,
        seed: Some(5),
        output_dir: dir.path().to_path_buf(),
        layout_iterations: 10,
        ..SpreadConfig::default()
    };
    let mut sim = Simulation::builder(config)
        .seeds(zombies.iter().copied().map(NodeIndex::new).collect::<Vec<_>>())
        .build()
        .unwrap();
    let report = sim.run(city).unwrap();
    assert_eq!(report.history.len(), timesteps as usize + 1);
    report.city.zombies()
}

#[test]
fn single_zombie_on_a_cycle_stays_alone() {
    let last = run(generators::cycle(5), &[0], Rule::TargetSetSelection, 3);
    assert_eq!(last, BTreeSet::from([0]));
}

#[test]
fn path_middle_is_surrounded() {
    let last = run(generators::path(3), &[0, 2], Rule::TargetSetSelection, 1);
    assert_eq!(last, BTreeSet::from([0, 1, 2]));
}

#[test]
fn deterministic_rule_survives_isolated_citizens() {
    let mut city = generators::path(4);
    city.add_citizen(Default::default());
    let last = run(city, &[0], Rule::Deterministic, 4);
    // 1 has half of its neighbors infected, then 2, then 3; the hermit stays human.
    assert_eq!(last, BTreeSet::from([0, 1, 2, 3]));
}

#[test]
fn full_pipeline_writes_frames_and_gif() {
    let dir = tempfile::tempdir().unwrap();
    let config = SpreadConfig {
        rule: Rule::Stochastic,
        timesteps: 2,
        update_topology: true,
        seed: Some(3),
        output_dir: dir.path().to_path_buf(),
        frame_size: (120, 120),
        layout_iterations: 20,
        ..SpreadConfig::default()
    };
    let report = Simulation::builder(config)
        .build()
        .unwrap()
        .run(generators::cycle(8))
        .unwrap();

    let frame_dir = dir.path().join("stochastic").join("dynamic");
    let names: Vec<_> = report
        .frames
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["zombies-0.png", "zombies-0-edges.png", "zombies-1.png", "zombies-1-edges.png"]
    );
    assert!(report.frames.iter().all(|p| p.is_file()));
    assert_eq!(report.animation, Some(frame_dir.join("zombies.gif")));
    assert!(frame_dir.join("zombies.gif").is_file());
}

#[test]
fn unknown_rule_name_is_refused() {
    assert!(matches!(
        "zombie_majority".parse::<Rule>(),
        Err(SpreadError::UnknownRule(_))
    ));
}

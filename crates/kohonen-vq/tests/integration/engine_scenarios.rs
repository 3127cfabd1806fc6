//! Engine scenarios with known outcomes.

use kohonen_vq::{
    CompetitiveNetwork, NetworkConfig, SampleSet, Trainer, TrainingConfig, VqError,
};

fn repeated(row: &[f32], count: usize) -> SampleSet {
    let rows: Vec<Vec<f32>> = (0..count).map(|_| row.to_vec()).collect();
    SampleSet::from_rows(&rows).unwrap()
}

/// Four well-separated points in 4-D, each twice.
fn corners() -> SampleSet {
    let points = [
        [0.0, 0.0, 0.0, 0.0],
        [10.0, 0.0, 0.0, 0.0],
        [0.0, 10.0, 0.0, 0.0],
        [0.0, 0.0, 10.0, 0.0],
    ];
    let rows: Vec<Vec<f32>> = points.iter().flat_map(|p| [p.to_vec(), p.to_vec()]).collect();
    SampleSet::from_rows(&rows).unwrap()
}

#[test]
fn test_identical_samples_one_winner_three_losers() {
    let config = NetworkConfig::new(4).with_seed(2024);
    let mut network = CompetitiveNetwork::new(config, repeated(&[1.0, 1.0, 1.0, 1.0], 8)).unwrap();

    let stats = network.train_step(0.1).unwrap();

    assert_eq!(stats.winners, 1);
    assert_eq!(stats.losers, 3);
    assert_eq!(stats.assignments.iter().max(), Some(&8));
    assert!(!network.should_stop().unwrap());

    // Losers were redrawn from the (degenerate) sample range
    for (i, _) in stats.assignments.iter().enumerate().filter(|(_, n)| **n == 0) {
        assert_eq!(network.codebook().get(i).unwrap(), &[1.0, 1.0, 1.0, 1.0]);
    }
}

#[test]
fn test_losers_reabsorbed_then_stop() {
    let config = NetworkConfig::new(4).with_seed(7);
    let mut network = CompetitiveNetwork::new(config, corners()).unwrap();
    let trainer = Trainer::new(TrainingConfig {
        learning_rate: 0.5,
        max_steps: Some(20_000),
        ..Default::default()
    });

    let mut saw_losers = false;
    let report = trainer
        .train_with(&mut network, |s| saw_losers |= s.losers > 0)
        .unwrap();

    assert!(report.converged);
    assert_eq!(report.last.losers, 0);
    assert!(network.should_stop().unwrap());

    // Every corner is claimed by its own code
    let winners = network
        .winner(&[0.0, 0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 0.0, 10.0, 0.0])
        .unwrap();
    let mut sorted = winners.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), 4, "winners {:?} (losers seen: {})", winners, saw_losers);
}

#[test]
fn test_precondition_errors_before_training() {
    let network = CompetitiveNetwork::new(NetworkConfig::new(2).with_seed(1), corners()).unwrap();

    assert!(matches!(network.should_stop(), Err(VqError::Precondition(_))));
    assert!(matches!(network.winner_one(&[0.0; 4]), Err(VqError::Precondition(_))));
    assert!(network.last_step().is_none());
}

#[test]
fn test_construction_errors() {
    assert!(matches!(
        CompetitiveNetwork::new(NetworkConfig::new(0), corners()),
        Err(VqError::InvalidConfig(_))
    ));
    assert!(matches!(
        SampleSet::new(Vec::new(), 4),
        Err(VqError::InvalidConfig(_))
    ));
    assert!(matches!(
        CompetitiveNetwork::new(NetworkConfig::new(2).with_stop_tolerance(-1.0), corners()),
        Err(VqError::InvalidConfig(_))
    ));
}

#[test]
fn test_winner_batch_shape_checked() {
    let mut network = CompetitiveNetwork::new(NetworkConfig::new(2).with_seed(1), corners()).unwrap();
    network.train_step(0.1).unwrap();

    assert!(matches!(
        network.winner(&[0.0; 6]),
        Err(VqError::DimensionMismatch { .. })
    ));
    assert_eq!(network.winner(&[0.0; 8]).unwrap().len(), 2);
}

#[test]
fn test_independent_runs_do_not_interact() {
    let config = NetworkConfig::new(3).with_seed(55);
    let mut first = CompetitiveNetwork::new(config.clone(), corners()).unwrap();
    let mut second = CompetitiveNetwork::new(config, corners()).unwrap();

    // Advancing one instance leaves the other untouched
    for _ in 0..10 {
        first.train_step(0.2).unwrap();
    }
    let s = second.train_step(0.2).unwrap();
    assert_eq!(s.step, 1);
    assert_eq!(first.steps(), 10);

    let handle = std::thread::spawn(move || {
        second.train_step(0.2).unwrap();
        second.steps()
    });
    assert_eq!(handle.join().unwrap(), 2);
}

//! Integration tests for RNN_SIM

use rnn_sim::activation_log::ActivationLog;
use rnn_sim::checkpoint::Checkpoint;
use rnn_sim::neural::{MutationRates, Network, WeightBounds};
use rnn_sim::random::{seeded, RandomSource};
use rnn_sim::record::{save_record, to_record_string, NetworkRecord};
use rnn_sim::{Config, RecordShape, Simulation};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("rnn_sim_it_{}_{}", std::process::id(), name))
}

fn evolving_config() -> Config {
    let mut config = Config::default();
    config.network.n_inputs = 3;
    config.network.n_outputs = 2;
    config.mutation.enabled = true;
    config.mutation.weight_mutation_rate = 0.1;
    config.mutation.neuron_mutation_rate = 0.1;
    config.mutation.add_neuron_rate = 0.2;
    config.mutation.add_connection_rate = 0.3;
    config
}

#[test]
fn test_full_simulation_cycle() {
    let config = evolving_config();
    let mut sim = Simulation::new_with_seed(config, 12345).unwrap();
    sim.prepare();

    let trace_path = temp_path("trace.txt");
    let mut log = ActivationLog::create(Some(&trace_path)).unwrap();
    sim.run(200, &mut log).unwrap();
    drop(log);

    assert_eq!(sim.tick, 200);
    sim.network.check_adjacency().unwrap();

    let bounds = sim.network.bounds();
    assert!(sim.network.neurons().iter().all(|n| bounds.contains(n.bias())));
    assert!(sim.network.connections().iter().all(|c| bounds.contains(c.weight())));

    // One line per tick, each at least as wide as the starting network
    let trace = std::fs::read_to_string(&trace_path).unwrap();
    std::fs::remove_file(&trace_path).ok();
    let lines: Vec<&str> = trace.lines().collect();
    assert_eq!(lines.len(), 200);
    assert_eq!(lines[0].split(' ').count(), 5);
    assert!(lines
        .iter()
        .all(|l| l.split(' ').all(|v| v.parse::<f64>().map(f64::is_finite).unwrap_or(false))));

    // Widths never shrink since neurons are never removed
    let widths: Vec<usize> = lines.iter().map(|l| l.split(' ').count()).collect();
    assert!(widths.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_reproducibility() {
    let run = |seed: u64| {
        let mut sim = Simulation::new_with_seed(evolving_config(), seed).unwrap();
        sim.prepare();
        let path = temp_path(&format!("repro_{}.txt", seed));
        let mut log = ActivationLog::create(Some(&path)).unwrap();
        sim.run(150, &mut log).unwrap();
        drop(log);
        let trace = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();
        (trace, to_record_string(&sim.network, RecordShape::Full))
    };

    let first = run(99999);
    let second = run(99999);
    assert_eq!(first, second, "identical seeds must give identical traces");
}

#[test]
fn test_checkpoint_resume_matches_uninterrupted_run() {
    let mut straight = Simulation::new_with_seed(evolving_config(), 4242).unwrap();
    straight.prepare();
    straight.run(120, &mut ActivationLog::disabled()).unwrap();

    let mut first_half = Simulation::new_with_seed(evolving_config(), 4242).unwrap();
    first_half.prepare();
    first_half.run(60, &mut ActivationLog::disabled()).unwrap();

    let path = temp_path("resume.bin");
    first_half.create_checkpoint().save(&path).unwrap();
    let loaded = Checkpoint::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let mut resumed = Simulation::from_checkpoint(loaded);
    assert_eq!(resumed.tick, 60);
    resumed.run(60, &mut ActivationLog::disabled()).unwrap();

    assert_eq!(resumed.tick, straight.tick);
    assert_eq!(resumed.network, straight.network);
    assert_eq!(
        resumed.stats_history.snapshots,
        straight.stats_history.snapshots
    );
}

#[test]
fn test_record_file_roundtrip() {
    let mut sim = Simulation::new_with_seed(evolving_config(), 777).unwrap();
    sim.prepare();
    sim.run(80, &mut ActivationLog::disabled()).unwrap();

    for shape in [RecordShape::Full, RecordShape::Compact] {
        let path = temp_path(&format!("record_{:?}.csv", shape));
        save_record(&sim.network, shape, &path).unwrap();
        let record = NetworkRecord::load(&path, shape).unwrap();
        std::fs::remove_file(&path).ok();

        let rebuilt = Network::from_record(&record, 3, 2).unwrap();
        assert_eq!(rebuilt.connections(), sim.network.connections());
        let biases: Vec<f64> = rebuilt.neurons().iter().map(|n| n.bias()).collect();
        let expected: Vec<f64> = sim.network.neurons().iter().map(|n| n.bias()).collect();
        assert_eq!(biases, expected);
    }
}

#[test]
fn test_adjacency_survives_heavy_splitting() {
    let mut rng = seeded(31337);
    let mut net = Network::new(4, 4);
    net.set_bounds(WeightBounds::new(-2.0, 2.0));
    net.set_rates(MutationRates {
        weight: 0.2,
        neuron: 0.2,
        add_neuron: 1.0,
        add_connection: 1.0,
    });
    net.randomize(&mut rng);

    for _ in 0..500 {
        net.mutate(&mut rng).unwrap();
    }
    // Remove a random third of the connections as well
    for _ in 0..net.connections().len() / 3 {
        let c = rng.uniform_index(0, net.connections().len());
        net.remove_connection(c).unwrap();
    }

    net.check_adjacency().unwrap();
    for (n, neuron) in net.neurons().iter().enumerate() {
        for &c in neuron.incoming_indices() {
            assert_eq!(net.target(c).unwrap(), n);
        }
        for &c in neuron.outgoing_indices() {
            assert_eq!(net.source(c).unwrap(), n);
        }
    }
    assert_eq!(net.n_hidden(), 500);
}

#[test]
fn test_inputs_are_externally_driven() {
    let mut config = Config::default();
    config.network.n_inputs = 2;
    config.network.n_outputs = 1;
    config.run.randomize = false;

    let mut sim = Simulation::new_with_seed(config, 5).unwrap();
    sim.network.initialize(0.5, 0.0);
    sim.step().unwrap();

    assert_eq!(sim.network.value(0).unwrap(), 0.5);
    assert_eq!(sim.network.value(1).unwrap(), 0.5);
    assert_eq!(sim.network.output_value(0).unwrap(), 0.0);

    sim.network.set_inputs(&[1.0, -1.0]).unwrap();
    sim.network.set_weight(0, 0.2).unwrap();
    sim.step().unwrap();
    assert!((sim.network.output_value(0).unwrap() - (0.2f64 * 5.0).tanh()).abs() < 1e-12);
}

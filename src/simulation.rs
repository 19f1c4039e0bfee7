//! Simulation driver - runs a network tick by tick.

use crate::activation_log::ActivationLog;
use crate::checkpoint::Checkpoint;
use crate::config::{Config, ConfigError};
use crate::neural::{MutationReport, Network, NetworkError};
use crate::random::{self, RandomSource, SimRng};
use crate::stats::{NetworkStats, StatsHistory};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A network together with the generator that randomizes and mutates it
pub struct Simulation {
    pub network: Network,
    pub config: Config,
    /// Ticks simulated so far
    pub tick: u64,
    pub stats_history: StatsHistory,
    rng: SimRng,
    seed: u64,
}

impl Simulation {
    /// Create a simulation, seeded from the config or the clock
    pub fn new(config: Config) -> Result<Self, SimulationError> {
        let seed = config.run.seed.unwrap_or_else(random::time_seed);
        Self::new_with_seed(config, seed)
    }

    /// Create a simulation with a specific seed for reproducibility
    pub fn new_with_seed(config: Config, seed: u64) -> Result<Self, SimulationError> {
        config.validate()?;
        let mut network = Network::with_activation(
            config.network.n_inputs,
            config.network.n_outputs,
            config.activation()?,
        );
        network.set_bounds(config.bounds());
        network.set_rates(config.rates());

        Ok(Self {
            network,
            stats_history: StatsHistory::new(config.logging.stats_interval),
            config,
            tick: 0,
            rng: random::seeded(seed),
            seed,
        })
    }

    /// Restore a simulation from a checkpoint
    pub fn from_checkpoint(checkpoint: Checkpoint) -> Self {
        Self {
            network: checkpoint.network,
            config: checkpoint.config,
            tick: checkpoint.tick,
            stats_history: checkpoint.stats_history,
            rng: checkpoint.rng,
            seed: checkpoint.seed,
        }
    }

    pub fn create_checkpoint(&self) -> Checkpoint {
        Checkpoint::new(
            self.tick,
            self.config.clone(),
            self.network.clone(),
            self.rng.clone(),
            self.seed,
            self.stats_history.clone(),
        )
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Put the network in its starting state: clear it, set a random initial
    /// activation and the initial weight, then randomize if configured.
    pub fn prepare(&mut self) {
        let run = &self.config.run;
        self.network.reset();
        let init_value = self.rng.uniform(run.init_value_min, run.init_value_max);
        self.network.initialize(init_value, run.init_weight);
        if run.randomize {
            self.network.randomize(&mut self.rng);
        }
        log::debug!("network prepared: init value {:.4}", init_value);
    }

    /// Advance one tick, mutating afterwards when mutation is enabled
    pub fn step(&mut self) -> Result<Option<MutationReport>, SimulationError> {
        self.network.update();
        self.tick += 1;
        self.mutate_if_enabled()
    }

    fn mutate_if_enabled(&mut self) -> Result<Option<MutationReport>, SimulationError> {
        if !self.config.mutation.enabled {
            return Ok(None);
        }
        let report = self.network.mutate(&mut self.rng)?;
        if let Some(neuron) = report.added_neuron {
            log::debug!("tick {}: grew hidden neuron {}", self.tick, neuron);
        }
        Ok(Some(report))
    }

    /// Run `steps` ticks, logging activations after every update
    pub fn run(&mut self, steps: u64, activations: &mut ActivationLog) -> Result<(), SimulationError> {
        log::info!(
            "running {} ticks from tick {} ({} neurons, {} connections, mutation {})",
            steps,
            self.tick,
            self.network.neurons().len(),
            self.network.connections().len(),
            if self.config.mutation.enabled { "on" } else { "off" }
        );

        for _ in 0..steps {
            self.network.update();
            self.tick += 1;
            activations.record(&self.network)?;
            self.mutate_if_enabled()?;

            if self.stats_history.is_due(self.tick) {
                let stats = NetworkStats::capture(self.tick, &self.network);
                log::info!("{}", stats.summary());
                self.stats_history.record(stats);
            }
        }

        activations.finish()?;
        Ok(())
    }

    pub fn stats(&self) -> NetworkStats {
        NetworkStats::capture(self.tick, &self.network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation_log::write_activations;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.network.n_inputs = 3;
        config.network.n_outputs = 2;
        config.run.steps = 20;
        config
    }

    #[test]
    fn test_prepare_randomizes_within_bounds() {
        let mut sim = Simulation::new_with_seed(small_config(), 1).unwrap();
        sim.prepare();
        let b = sim.network.bounds();
        assert!(sim.network.neurons().iter().all(|n| b.contains(n.bias())));
        assert!(sim.network.connections().iter().all(|c| b.contains(c.weight())));

        let init = sim.network.value(0).unwrap();
        assert!((0.0..1.0).contains(&init));
        assert!(sim.network.values().iter().all(|&v| v == init));
    }

    #[test]
    fn test_without_mutation_topology_is_fixed() {
        let mut sim = Simulation::new_with_seed(small_config(), 3).unwrap();
        sim.prepare();
        let before = sim.network.connections().to_vec();
        for _ in 0..50 {
            assert!(sim.step().unwrap().is_none());
        }
        assert_eq!(sim.network.connections(), &before[..]);
        assert_eq!(sim.tick, 50);
    }

    #[test]
    fn test_evolving_run_grows() {
        let mut config = small_config();
        config.mutation.enabled = true;
        config.mutation.add_neuron_rate = 0.5;
        config.mutation.add_connection_rate = 0.5;

        let mut sim = Simulation::new_with_seed(config, 8).unwrap();
        sim.prepare();
        let mut log = ActivationLog::disabled();
        sim.run(100, &mut log).unwrap();

        assert_eq!(sim.tick, 100);
        assert!(sim.network.n_hidden() > 0);
        assert!(sim.network.connections().len() > 6);
        sim.network.check_adjacency().unwrap();
        assert_eq!(sim.stats_history.snapshots.len(), 10);
    }

    #[test]
    fn test_same_seed_same_trace() {
        let mut config = small_config();
        config.mutation.enabled = true;
        config.mutation.add_neuron_rate = 0.3;

        let trace = |seed: u64| {
            let mut sim = Simulation::new_with_seed(config.clone(), seed).unwrap();
            sim.prepare();
            let mut out = Vec::new();
            for _ in 0..40 {
                sim.step().unwrap();
                write_activations(&sim.network, &mut out).unwrap();
            }
            out
        };

        assert_eq!(trace(77), trace(77));
        assert_ne!(trace(77), trace(78));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = small_config();
        config.network.activation = "step".to_string();
        assert!(matches!(
            Simulation::new_with_seed(config, 0),
            Err(SimulationError::Config(_))
        ));
    }
}

//! Configuration for a simulation run.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::neural::{Activation, MutationRates, WeightBounds};
use crate::record::RecordShape;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub weights: WeightConfig,
    pub mutation: MutationConfig,
    pub run: RunConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Shape of the initial network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Number of input neurons
    pub n_inputs: usize,
    /// Number of output neurons
    pub n_outputs: usize,
    /// Activation function of every neuron (linear, sine, gaussian, sigmoid)
    pub activation: String,
}

/// Range for biases and weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    pub min_weight: f64,
    pub max_weight: f64,
}

/// Mutation operators applied after every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Mutate the network while running
    pub enabled: bool,
    /// Probability of redrawing each weight
    pub weight_mutation_rate: f64,
    /// Probability of redrawing each bias
    pub neuron_mutation_rate: f64,
    /// Probability of splitting a connection
    pub add_neuron_rate: f64,
    /// Probability of adding a connection
    pub add_connection_rate: f64,
}

/// Initial state and length of the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of ticks to simulate
    pub steps: u64,
    /// Initial activation is drawn from [init_value_min, init_value_max)
    pub init_value_min: f64,
    pub init_value_max: f64,
    /// Weight every connection starts with before randomization
    pub init_weight: f64,
    /// Draw biases and weights uniformly within the weight range
    pub randomize: bool,
    /// Random seed; a time-based seed is used when absent
    pub seed: Option<u64>,
}

/// Files written by a run, relative to the output directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Record of the network before the first tick
    pub network_file: String,
    /// Activation trace, one line per tick (empty disables it)
    pub activation_file: String,
    /// Record of the network after the last tick (empty disables it)
    pub final_network_file: String,
    /// Stats history as JSON (empty disables it)
    pub stats_file: String,
    pub record_shape: RecordShape,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Ticks between stats snapshots
    pub stats_interval: u64,
    pub log_level: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            n_inputs: 4,
            n_outputs: 8,
            activation: "sigmoid".to_string(),
        }
    }
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            min_weight: -1.0,
            max_weight: 1.0,
        }
    }
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            weight_mutation_rate: 0.05,
            neuron_mutation_rate: 0.05,
            add_neuron_rate: 0.02,
            add_connection_rate: 0.05,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: 50,
            init_value_min: 0.0,
            init_value_max: 1.0,
            init_weight: 0.0,
            randomize: true,
            seed: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            network_file: "standard_RNN.csv".to_string(),
            activation_file: "standard_RNN_activation.csv".to_string(),
            final_network_file: "final_RNN.csv".to_string(),
            stats_file: "stats_history.json".to_string(),
            record_shape: RecordShape::Full,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 10,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when it exists, otherwise fall back to the defaults.
    /// A file that exists but does not parse is an error.
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        self.activation()?;
        if self.weights.min_weight > self.weights.max_weight {
            return invalid("min_weight must not exceed max_weight");
        }
        if self.run.init_value_min > self.run.init_value_max {
            return invalid("init_value_min must not exceed init_value_max");
        }
        let rates = [
            self.mutation.weight_mutation_rate,
            self.mutation.neuron_mutation_rate,
            self.mutation.add_neuron_rate,
            self.mutation.add_connection_rate,
        ];
        if rates.iter().any(|r| !(0.0..=1.0).contains(r)) {
            return invalid("mutation rates must be between 0 and 1");
        }
        if self.logging.stats_interval == 0 {
            return invalid("stats_interval must be > 0");
        }
        Ok(())
    }

    /// Parsed activation function of the network section
    pub fn activation(&self) -> Result<Activation, ConfigError> {
        self.network
            .activation
            .parse()
            .map_err(|e: crate::neural::NetworkError| ConfigError::Invalid(e.to_string()))
    }

    pub fn bounds(&self) -> WeightBounds {
        WeightBounds::new(self.weights.min_weight, self.weights.max_weight)
    }

    /// Rates handed to the network; all zero when mutation is disabled
    pub fn rates(&self) -> MutationRates {
        if !self.mutation.enabled {
            return MutationRates::default();
        }
        MutationRates {
            weight: self.mutation.weight_mutation_rate,
            neuron: self.mutation.neuron_mutation_rate,
            add_neuron: self.mutation.add_neuron_rate,
            add_connection: self.mutation.add_connection_rate,
        }
    }
}

//! Statistics tracking for a simulation run.

use crate::neural::Network;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Statistics snapshot for a simulation tick
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    /// Tick the snapshot was taken at
    pub tick: u64,
    /// Total neuron count
    pub neurons: usize,
    /// Neurons grown by node splits
    pub hidden: usize,
    /// Connection count
    pub connections: usize,
    /// Mean activation over all neurons
    pub activation_mean: f64,
    /// Mean activation of the output layer
    pub output_mean: f64,
    /// Mean absolute connection weight
    pub weight_abs_mean: f64,
    /// Mean bias over all neurons
    pub bias_mean: f64,
}

fn mean<I: Iterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

impl NetworkStats {
    /// Capture stats from the current network state
    pub fn capture(tick: u64, network: &Network) -> Self {
        Self {
            tick,
            neurons: network.neurons().len(),
            hidden: network.n_hidden(),
            connections: network.connections().len(),
            activation_mean: mean(network.neurons().iter().map(|n| n.value())),
            output_mean: mean(network.outputs().into_iter()),
            weight_abs_mean: mean(network.connections().iter().map(|c| c.weight().abs())),
            bias_mean: mean(network.neurons().iter().map(|n| n.bias())),
        }
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:6} | Neurons:{:4} (hidden {:3}) | Conns:{:5} | Act:{:+.3} | Out:{:+.3} | |W|:{:.3}",
            self.tick,
            self.neurons,
            self.hidden,
            self.connections,
            self.activation_mean,
            self.output_mean,
            self.weight_abs_mean,
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded snapshots
    pub snapshots: Vec<NetworkStats>,
    /// Recording interval in ticks
    pub interval: u64,
}

impl StatsHistory {
    pub fn new(interval: u64) -> Self {
        Self {
            snapshots: Vec::new(),
            interval,
        }
    }

    /// Whether a snapshot is due at `tick`
    pub fn is_due(&self, tick: u64) -> bool {
        self.interval > 0 && tick % self.interval == 0
    }

    pub fn record(&mut self, stats: NetworkStats) {
        self.snapshots.push(stats);
    }

    /// Connection count over time
    pub fn connection_series(&self) -> Vec<(u64, usize)> {
        self.snapshots.iter().map(|s| (s.tick, s.connections)).collect()
    }

    /// Save history to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Load history from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

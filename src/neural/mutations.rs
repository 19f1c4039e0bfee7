//! Parametric and structural mutation operators (NEAT-style).

use super::error::NetworkError;
use super::network::Network;
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};

/// Range that randomized or mutated biases and weights are kept in
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightBounds {
    pub min_weight: f64,
    pub max_weight: f64,
}

impl Default for WeightBounds {
    fn default() -> Self {
        Self {
            min_weight: -1.0,
            max_weight: 1.0,
        }
    }
}

impl WeightBounds {
    pub fn new(min_weight: f64, max_weight: f64) -> Self {
        Self { min_weight, max_weight }
    }

    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min_weight).min(self.max_weight)
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min_weight && value <= self.max_weight
    }
}

/// Per-tick probabilities of each mutation operator.
///
/// All rates default to zero, which gives a network whose structure and
/// parameters never change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationRates {
    /// Probability of redrawing each connection weight
    pub weight: f64,
    /// Probability of redrawing each neuron bias
    pub neuron: f64,
    /// Probability of splitting a connection with a new neuron
    pub add_neuron: f64,
    /// Probability of adding a random connection
    pub add_connection: f64,
}

/// What a call to [`Network::mutate`] changed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MutationReport {
    pub biases_mutated: usize,
    pub weights_mutated: usize,
    /// Index of the neuron created by a split
    pub added_neuron: Option<usize>,
    /// Index of the connection added by the add-connection operator
    pub added_connection: Option<usize>,
}

impl Network {
    /// Draw every bias, then every weight, uniformly within the bounds
    pub fn randomize<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        let WeightBounds { min_weight, max_weight } = self.bounds;
        for neuron in self.neurons_mut() {
            neuron.set_bias(rng.uniform(min_weight, max_weight));
        }
        for conn in self.connections_mut() {
            conn.set_weight(rng.uniform(min_weight, max_weight));
        }
    }

    /// Apply every operator once, each with its own probability.
    ///
    /// Order: biases, weights, node split, new connection.
    pub fn mutate<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<MutationReport, NetworkError> {
        let rates = self.rates;
        let mut report = MutationReport {
            biases_mutated: self.mutate_biases(rates.neuron, rng),
            weights_mutated: self.mutate_weights(rates.weight, rng),
            ..Default::default()
        };

        if rng.uniform01() < rates.add_neuron {
            report.added_neuron = self.add_random_neuron(rng)?;
        }

        if rng.uniform01() < rates.add_connection {
            report.added_connection = self.add_random_connection(rng)?;
        }

        Ok(report)
    }

    /// Replace each bias, with probability `rate`, by a clamped N(0, 1) draw
    pub fn mutate_biases<R: RandomSource + ?Sized>(&mut self, rate: f64, rng: &mut R) -> usize {
        let bounds = self.bounds;
        let mut count = 0;
        for neuron in self.neurons_mut() {
            if rng.uniform01() < rate {
                neuron.set_bias(bounds.clamp(rng.gaussian(0.0, 1.0)));
                count += 1;
            }
        }
        count
    }

    /// Replace each weight, with probability `rate`, by a clamped N(0, 1) draw
    pub fn mutate_weights<R: RandomSource + ?Sized>(&mut self, rate: f64, rng: &mut R) -> usize {
        let bounds = self.bounds;
        let mut count = 0;
        for conn in self.connections_mut() {
            if rng.uniform01() < rate {
                conn.set_weight(bounds.clamp(rng.gaussian(0.0, 1.0)));
                count += 1;
            }
        }
        count
    }

    /// Split a uniformly chosen connection. Returns the new neuron, or `None`
    /// when there is no connection to split.
    pub fn add_random_neuron<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Option<usize>, NetworkError> {
        if self.connections().is_empty() {
            log::debug!("node split skipped: network has no connections");
            return Ok(None);
        }
        let chosen = rng.uniform_index(0, self.connections().len());
        self.split_connection(chosen).map(Some)
    }

    /// Insert a neuron into connection `index`.
    ///
    /// `s -> t` (weight `w`) becomes `s -> new` (weight 1) and `new -> t`
    /// (weight `w`), so the connection count grows by one.
    pub fn split_connection(&mut self, index: usize) -> Result<usize, NetworkError> {
        let removed = self.remove_connection(index)?;
        let hidden = self.add_neuron();
        self.add_connection(removed.source(), hidden, 1.0)?;
        self.add_connection(hidden, removed.target(), removed.weight())?;

        log::debug!(
            "split connection {} ({} -> {}) with neuron {}",
            index,
            removed.source(),
            removed.target(),
            hidden
        );
        Ok(hidden)
    }

    /// Connect a random neuron to a random non-input neuron with a uniform
    /// weight. Duplicates and self-loops are legal.
    pub fn add_random_connection<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Option<usize>, NetworkError> {
        let len = self.neurons().len();
        if len <= self.n_inputs() {
            log::debug!("add connection skipped: no non-input neurons");
            return Ok(None);
        }

        let source = rng.uniform_index(0, len);
        let target = rng.uniform_index(self.n_inputs(), len);
        let weight = rng.uniform(self.bounds.min_weight, self.bounds.max_weight);

        let index = self.add_connection(source, target, weight)?;
        log::debug!("added connection {} ({} -> {}, w={:.4})", index, source, target, weight);
        Ok(Some(index))
    }
}

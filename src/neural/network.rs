//! Network structure, adjacency bookkeeping and synchronous propagation.

use super::connection::Connection;
use super::error::NetworkError;
use super::mutations::{MutationRates, WeightBounds};
use super::neuron::{Activation, Neuron};
use serde::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, NetworkError>;

/// Recurrent neural network stored as two dense arenas.
///
/// Neurons `[0, n_inputs)` are inputs, the next `n_outputs` are outputs and
/// everything after that is a hidden neuron grown by mutation. Connections
/// refer to neurons by index and every neuron caches the indices of the
/// connections touching it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Network {
    neurons: Vec<Neuron>,
    connections: Vec<Connection>,
    n_inputs: usize,
    n_outputs: usize,
    /// Function given to neurons created by this network
    activation: Activation,
    pub(crate) bounds: WeightBounds,
    pub(crate) rates: MutationRates,
}

impl Network {
    /// Build an input and an output layer, fully cross-connected at weight 0
    pub fn new(n_inputs: usize, n_outputs: usize) -> Self {
        Self::with_activation(n_inputs, n_outputs, Activation::default())
    }

    pub fn with_activation(n_inputs: usize, n_outputs: usize, activation: Activation) -> Self {
        let mut net = Self::unconnected(n_inputs, n_outputs, n_inputs + n_outputs, activation);
        net.connections.reserve(n_inputs * n_outputs);

        for i in 0..n_inputs {
            for j in 0..n_outputs {
                net.link(i, n_inputs + j, 0.0);
            }
        }

        net
    }

    /// `neuron_count` neurons and no connections at all
    pub(crate) fn unconnected(
        n_inputs: usize,
        n_outputs: usize,
        neuron_count: usize,
        activation: Activation,
    ) -> Self {
        Self {
            neurons: (0..neuron_count).map(|_| Neuron::with_activation(activation)).collect(),
            connections: Vec::new(),
            n_inputs,
            n_outputs,
            activation,
            bounds: WeightBounds::default(),
            rates: MutationRates::default(),
        }
    }

    // ---- topology ----

    #[inline]
    pub fn n_inputs(&self) -> usize {
        self.n_inputs
    }

    #[inline]
    pub fn n_outputs(&self) -> usize {
        self.n_outputs
    }

    /// Number of neurons grown beyond the input and output layers
    pub fn n_hidden(&self) -> usize {
        self.neurons.len() - self.n_inputs - self.n_outputs
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn bounds(&self) -> WeightBounds {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: WeightBounds) {
        self.bounds = bounds;
    }

    pub fn rates(&self) -> MutationRates {
        self.rates
    }

    pub fn set_rates(&mut self, rates: MutationRates) {
        self.rates = rates;
    }

    /// Append a hidden neuron and return its index
    pub fn add_neuron(&mut self) -> usize {
        self.neurons.push(Neuron::with_activation(self.activation));
        self.neurons.len() - 1
    }

    /// Add a connection and register it with both endpoints.
    ///
    /// Self-loops and parallel edges are allowed.
    pub fn add_connection(&mut self, source: usize, target: usize, weight: f64) -> Result<usize> {
        self.check_neuron(source)?;
        self.check_neuron(target)?;
        Ok(self.link(source, target, weight))
    }

    fn link(&mut self, source: usize, target: usize, weight: f64) -> usize {
        let index = self.connections.len();
        self.connections.push(Connection::new(source, target, weight));
        self.neurons[target].push_incoming(index);
        self.neurons[source].push_outgoing(index);
        index
    }

    /// Remove a connection and repair every adjacency list in place.
    ///
    /// Connections after `index` shift left by one, so every cached index
    /// greater than `index` is decremented on every neuron.
    pub fn remove_connection(&mut self, index: usize) -> Result<Connection> {
        self.check_connection(index)?;
        let removed = self.connections.remove(index);
        for neuron in &mut self.neurons {
            neuron.detach_connection(index);
        }
        Ok(removed)
    }

    // ---- checked accessors ----

    fn check_neuron(&self, index: usize) -> Result<()> {
        if index < self.neurons.len() {
            Ok(())
        } else {
            Err(NetworkError::NeuronOutOfRange { index, len: self.neurons.len() })
        }
    }

    fn check_connection(&self, index: usize) -> Result<()> {
        if index < self.connections.len() {
            Ok(())
        } else {
            Err(NetworkError::ConnectionOutOfRange { index, len: self.connections.len() })
        }
    }

    pub fn neuron(&self, index: usize) -> Result<&Neuron> {
        self.check_neuron(index)?;
        Ok(&self.neurons[index])
    }

    pub(crate) fn neurons_mut(&mut self) -> &mut [Neuron] {
        &mut self.neurons
    }

    pub(crate) fn connections_mut(&mut self) -> &mut [Connection] {
        &mut self.connections
    }

    pub(crate) fn neuron_mut(&mut self, index: usize) -> Result<&mut Neuron> {
        self.check_neuron(index)?;
        Ok(&mut self.neurons[index])
    }

    pub fn connection(&self, index: usize) -> Result<&Connection> {
        self.check_connection(index)?;
        Ok(&self.connections[index])
    }

    pub(crate) fn connection_mut(&mut self, index: usize) -> Result<&mut Connection> {
        self.check_connection(index)?;
        Ok(&mut self.connections[index])
    }

    pub fn value(&self, neuron: usize) -> Result<f64> {
        Ok(self.neuron(neuron)?.value())
    }

    pub fn set_value(&mut self, neuron: usize, value: f64) -> Result<()> {
        self.neuron_mut(neuron)?.set_value(value);
        Ok(())
    }

    pub fn bias(&self, neuron: usize) -> Result<f64> {
        Ok(self.neuron(neuron)?.bias())
    }

    pub fn set_bias(&mut self, neuron: usize, bias: f64) -> Result<()> {
        self.neuron_mut(neuron)?.set_bias(bias);
        Ok(())
    }

    pub fn set_activation(&mut self, neuron: usize, activation: Activation) -> Result<()> {
        self.neuron_mut(neuron)?.set_activation(activation);
        Ok(())
    }

    /// Activation of the `output`-th output neuron
    pub fn output_value(&self, output: usize) -> Result<f64> {
        if output >= self.n_outputs {
            return Err(NetworkError::NeuronOutOfRange {
                index: self.n_inputs + output,
                len: self.n_inputs + self.n_outputs,
            });
        }
        self.value(self.n_inputs + output)
    }

    pub fn weight(&self, connection: usize) -> Result<f64> {
        Ok(self.connection(connection)?.weight())
    }

    pub fn set_weight(&mut self, connection: usize, weight: f64) -> Result<()> {
        self.connection_mut(connection)?.set_weight(weight);
        Ok(())
    }

    pub fn source(&self, connection: usize) -> Result<usize> {
        Ok(self.connection(connection)?.source())
    }

    pub fn target(&self, connection: usize) -> Result<usize> {
        Ok(self.connection(connection)?.target())
    }

    /// Drive the input neurons
    pub fn set_inputs(&mut self, inputs: &[f64]) -> Result<()> {
        if inputs.len() != self.n_inputs {
            return Err(NetworkError::InputLengthMismatch {
                expected: self.n_inputs,
                found: inputs.len(),
            });
        }
        for (neuron, &v) in self.neurons.iter_mut().zip(inputs) {
            neuron.set_value(v);
        }
        Ok(())
    }

    /// Current activations of the output layer
    pub fn outputs(&self) -> Vec<f64> {
        self.neurons[self.n_inputs..self.n_inputs + self.n_outputs]
            .iter()
            .map(Neuron::value)
            .collect()
    }

    /// Activations of every neuron in index order
    pub fn values(&self) -> Vec<f64> {
        self.neurons.iter().map(Neuron::value).collect()
    }

    // ---- simulation ----

    /// One synchronous tick.
    ///
    /// All incoming potentials are gathered from the activations of the
    /// previous tick before any neuron propagates, so cycles and self-loops
    /// read stale values only. Input neurons are externally driven and keep
    /// their value.
    pub fn update(&mut self) {
        for neuron in &mut self.neurons {
            neuron.set_incoming(0.0);
        }

        for i in 0..self.neurons.len() {
            let potential: f64 = self.neurons[i]
                .incoming_indices()
                .iter()
                .map(|&c| {
                    let conn = &self.connections[c];
                    self.neurons[conn.source()].value() * conn.weight()
                })
                .sum();
            self.neurons[i].add_incoming(potential);
        }

        for neuron in self.neurons.iter_mut().skip(self.n_inputs) {
            neuron.propagate();
        }
    }

    /// Set every activation to `init_value` and every weight to `init_weight`
    pub fn initialize(&mut self, init_value: f64, init_weight: f64) {
        for neuron in &mut self.neurons {
            neuron.set_value(init_value);
        }
        for conn in &mut self.connections {
            conn.set_weight(init_weight);
        }
    }

    /// Clear the transient state of every neuron
    pub fn reset(&mut self) {
        for neuron in &mut self.neurons {
            neuron.reset();
        }
    }

    /// Check every structural invariant: the input and output layers fit in
    /// the neuron arena and the adjacency caches are consistent
    pub fn validate(&self) -> Result<()> {
        if self.neurons.len() < self.n_inputs + self.n_outputs {
            return Err(NetworkError::Partition {
                neurons: self.neurons.len(),
                inputs: self.n_inputs,
                outputs: self.n_outputs,
            });
        }
        self.check_adjacency()
    }

    /// Verify that the adjacency caches mirror the connection list exactly
    pub fn check_adjacency(&self) -> Result<()> {
        let corrupt = |neuron: usize, reason: String| NetworkError::Adjacency { neuron, reason };
        let mut seen_in = vec![0usize; self.connections.len()];
        let mut seen_out = vec![0usize; self.connections.len()];

        for (n, neuron) in self.neurons.iter().enumerate() {
            for &c in neuron.incoming_indices() {
                let conn = self
                    .connections
                    .get(c)
                    .ok_or_else(|| corrupt(n, format!("dangling incoming index {}", c)))?;
                if conn.target() != n {
                    return Err(corrupt(n, format!("incoming {} targets {}", c, conn.target())));
                }
                seen_in[c] += 1;
            }
            for &c in neuron.outgoing_indices() {
                let conn = self
                    .connections
                    .get(c)
                    .ok_or_else(|| corrupt(n, format!("dangling outgoing index {}", c)))?;
                if conn.source() != n {
                    return Err(corrupt(n, format!("outgoing {} starts at {}", c, conn.source())));
                }
                seen_out[c] += 1;
            }
        }

        for (c, conn) in self.connections.iter().enumerate() {
            self.check_neuron(conn.source())?;
            self.check_neuron(conn.target())?;
            if seen_in[c] != 1 {
                return Err(corrupt(conn.target(), format!("connection {} listed {} times", c, seen_in[c])));
            }
            if seen_out[c] != 1 {
                return Err(corrupt(conn.source(), format!("connection {} listed {} times", c, seen_out[c])));
            }
        }

        Ok(())
    }
}

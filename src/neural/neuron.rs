//! Single neuron state and activation functions.

use super::error::NetworkError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gain applied inside the sigmoid activation
pub const DEFAULT_GAIN: f64 = 5.0;

/// Closed set of activation functions a neuron can use
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// Identity truncated to [-1, 1]
    Linear,
    /// sin(x)
    Sine,
    /// e^(-x^2) rescaled to [-1, 1]
    Gaussian,
    /// tanh(x * gain)
    #[default]
    Sigmoid,
}

impl Activation {
    /// All variants, in declaration order
    pub const ALL: [Activation; 4] = [
        Activation::Linear,
        Activation::Sine,
        Activation::Gaussian,
        Activation::Sigmoid,
    ];

    /// Apply the function to a net input
    #[inline]
    pub fn apply(self, x: f64, gain: f64) -> f64 {
        match self {
            Activation::Linear => x.clamp(-1.0, 1.0),
            Activation::Sine => x.sin(),
            Activation::Gaussian => (-x * x).exp() * 2.0 - 1.0,
            Activation::Sigmoid => (x * gain).tanh(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Activation::Linear => "linear",
            Activation::Sine => "sine",
            Activation::Gaussian => "gaussian",
            Activation::Sigmoid => "sigmoid",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activation {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Activation::Linear),
            "sin" | "sine" => Ok(Activation::Sine),
            "gaussian" => Ok(Activation::Gaussian),
            "sigmoid" | "tanh" => Ok(Activation::Sigmoid),
            other => Err(NetworkError::UnknownActivation(other.to_string())),
        }
    }
}

/// A neuron of a recurrent network.
///
/// The neuron only knows the indices of the connections touching it; the
/// connections themselves live in the owning [`Network`](super::Network).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    value: f64,
    incoming: f64,
    bias: f64,
    activation: Activation,
    gain: f64,
    incoming_indices: Vec<usize>,
    outgoing_indices: Vec<usize>,
}

impl Default for Neuron {
    fn default() -> Self {
        Self::new()
    }
}

impl Neuron {
    /// Create a resting sigmoid neuron with no bias
    pub fn new() -> Self {
        Self::with_activation(Activation::default())
    }

    pub fn with_activation(activation: Activation) -> Self {
        Self {
            value: 0.0,
            incoming: 0.0,
            bias: 0.0,
            activation,
            gain: DEFAULT_GAIN,
            incoming_indices: Vec::new(),
            outgoing_indices: Vec::new(),
        }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    #[inline]
    pub fn incoming(&self) -> f64 {
        self.incoming
    }

    #[inline]
    pub fn set_incoming(&mut self, incoming: f64) {
        self.incoming = incoming;
    }

    /// Accumulate into the incoming potential
    #[inline]
    pub fn add_incoming(&mut self, delta: f64) {
        self.incoming += delta;
    }

    #[inline]
    pub fn bias(&self) -> f64 {
        self.bias
    }

    #[inline]
    pub fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn set_activation(&mut self, activation: Activation) {
        self.activation = activation;
    }

    /// Indices of connections ending at this neuron
    pub fn incoming_indices(&self) -> &[usize] {
        &self.incoming_indices
    }

    /// Indices of connections starting at this neuron
    pub fn outgoing_indices(&self) -> &[usize] {
        &self.outgoing_indices
    }

    pub(crate) fn push_incoming(&mut self, connection: usize) {
        self.incoming_indices.push(connection);
    }

    pub(crate) fn push_outgoing(&mut self, connection: usize) {
        self.outgoing_indices.push(connection);
    }

    /// Drop `removed` from both adjacency lists and shift every larger index
    /// down by one, matching the erase in the connection vector.
    pub(crate) fn detach_connection(&mut self, removed: usize) {
        shift_after_removal(&mut self.incoming_indices, removed);
        shift_after_removal(&mut self.outgoing_indices, removed);
    }

    /// Zero the transient state. Bias, function and adjacency are kept.
    pub fn reset(&mut self) {
        self.value = 0.0;
        self.incoming = 0.0;
    }

    /// Turn incoming potential plus bias into the new activation value
    #[inline]
    pub fn propagate(&mut self) {
        let x = self.incoming + self.bias;
        self.value = self.activation.apply(x, self.gain);
    }
}

fn shift_after_removal(indices: &mut Vec<usize>, removed: usize) {
    indices.retain(|&i| i != removed);
    for i in indices.iter_mut() {
        if *i > removed {
            *i -= 1;
        }
    }
}

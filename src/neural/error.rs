//! Contract violations raised by the network.

use thiserror::Error;

/// Errors raised when the network is addressed with indices or selectors it
/// does not know about.
///
/// None of these are recoverable: they signal a caller bug or corrupted
/// adjacency caches and are surfaced immediately.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    #[error("neuron index {index} out of bounds (size {len})")]
    NeuronOutOfRange { index: usize, len: usize },

    #[error("connection index {index} out of bounds (size {len})")]
    ConnectionOutOfRange { index: usize, len: usize },

    #[error("expected {expected} input values, got {found}")]
    InputLengthMismatch { expected: usize, found: usize },

    #[error("unknown activation function: {0}")]
    UnknownActivation(String),

    #[error("{neurons} neurons cannot hold {inputs} inputs and {outputs} outputs")]
    Partition {
        neurons: usize,
        inputs: usize,
        outputs: usize,
    },

    #[error("adjacency corrupted at neuron {neuron}: {reason}")]
    Adjacency { neuron: usize, reason: String },
}

//! Recurrent neural network with growable topology.
//!
//! Implements:
//! - Index-based neuron/connection arenas with per-neuron adjacency caches
//! - Synchronous propagation over arbitrary (cyclic) graphs
//! - Bias and weight mutations
//! - Structural mutations (node split, add connection)

mod connection;
mod error;
mod mutations;
mod network;
mod neuron;

pub use connection::Connection;
pub use error::NetworkError;
pub use mutations::{MutationRates, MutationReport, WeightBounds};
pub use network::Network;
pub use neuron::{Activation, Neuron, DEFAULT_GAIN};

//! # RNN_SIM
//!
//! Recurrent neural network simulator with NEAT-style structural mutation.
//!
//! ## Features
//!
//! - **Recurrent**: synchronous ticks over arbitrary cyclic graphs
//! - **Evolvable**: bias/weight mutation, node splits, new connections
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust
//! use rnn_sim::{ActivationLog, Config, Simulation};
//!
//! let mut config = Config::default();
//! config.mutation.enabled = true;
//!
//! let mut sim = Simulation::new_with_seed(config, 42).unwrap();
//! sim.prepare();
//! sim.run(100, &mut ActivationLog::disabled()).unwrap();
//!
//! println!("{}", sim.stats().summary());
//! ```
//!
//! ## Working with a network directly
//!
//! ```rust
//! use rnn_sim::neural::{MutationRates, Network};
//! use rnn_sim::random::seeded;
//!
//! let mut rng = seeded(7);
//! let mut net = Network::new(2, 1);
//! net.set_rates(MutationRates { add_neuron: 1.0, ..Default::default() });
//! net.randomize(&mut rng);
//! net.set_inputs(&[0.5, -0.5]).unwrap();
//! net.update();
//! net.mutate(&mut rng).unwrap();
//! assert_eq!(net.n_hidden(), 1);
//! ```

pub mod activation_log;
pub mod checkpoint;
pub mod config;
pub mod neural;
pub mod random;
pub mod record;
pub mod simulation;
pub mod stats;

// Re-export main types
pub use activation_log::ActivationLog;
pub use config::Config;
pub use neural::{Activation, Network, NetworkError};
pub use record::{NetworkRecord, RecordShape};
pub use simulation::Simulation;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

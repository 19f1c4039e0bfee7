//! Checkpoint system for saving and resuming a simulation.

use crate::config::Config;
use crate::neural::{Network, NetworkError};
use crate::random::SimRng;
use crate::stats::StatsHistory;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

const MAGIC: &[u8; 4] = b"RNNS";

/// Complete simulation state.
///
/// The generator state is stored as-is, so a resumed run draws exactly the
/// numbers the uninterrupted run would have.
#[derive(Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Version for compatibility checking
    pub version: u32,
    /// Ticks simulated so far
    pub tick: u64,
    pub config: Config,
    pub network: Network,
    pub rng: SimRng,
    /// Seed the run was started with
    pub seed: u64,
    pub stats_history: StatsHistory,
}

impl Checkpoint {
    /// Current checkpoint version
    pub const VERSION: u32 = 1;

    pub fn new(
        tick: u64,
        config: Config,
        network: Network,
        rng: SimRng,
        seed: u64,
        stats_history: StatsHistory,
    ) -> Self {
        Self {
            version: Self::VERSION,
            tick,
            config,
            network,
            rng,
            seed,
            stats_history,
        }
    }

    /// Save checkpoint to binary file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CheckpointError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(MAGIC)?;
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;

        Ok(())
    }

    /// Load checkpoint from binary file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CheckpointError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(CheckpointError::InvalidFormat("Invalid magic bytes".to_string()));
        }

        let checkpoint: Checkpoint = bincode::deserialize_from(&mut reader)?;

        if checkpoint.version != Self::VERSION {
            return Err(CheckpointError::VersionMismatch {
                expected: Self::VERSION,
                found: checkpoint.version,
            });
        }
        checkpoint.network.validate()?;

        Ok(checkpoint)
    }

    /// Get approximate size in bytes
    pub fn size_bytes(&self) -> usize {
        bincode::serialized_size(self).unwrap_or(0) as usize
    }
}

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Corrupted network: {0}")]
    Network(#[from] NetworkError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neural::Activation;
    use crate::random::{seeded, RandomSource};

    fn create_test_checkpoint() -> Checkpoint {
        let mut rng = seeded(12345);
        let mut network = Network::new(3, 2);
        network.randomize(&mut rng);
        network.split_connection(2).unwrap();
        Checkpoint::new(40, Config::default(), network, rng, 12345, StatsHistory::new(10))
    }

    #[test]
    fn test_checkpoint_roundtrip() {
        let checkpoint = create_test_checkpoint();
        let temp_path = std::env::temp_dir().join("rnn_sim_test_checkpoint.bin");

        checkpoint.save(&temp_path).unwrap();
        let mut loaded = Checkpoint::load(&temp_path).unwrap();
        std::fs::remove_file(&temp_path).ok();

        assert_eq!(loaded.tick, checkpoint.tick);
        assert_eq!(loaded.seed, checkpoint.seed);
        assert_eq!(loaded.config, checkpoint.config);
        assert_eq!(loaded.network, checkpoint.network);

        // Generator continues where it left off
        let mut original_rng = checkpoint.rng.clone();
        assert_eq!(loaded.rng.uniform01().to_bits(), original_rng.uniform01().to_bits());
    }

    #[test]
    fn test_rejects_foreign_file() {
        let temp_path = std::env::temp_dir().join("rnn_sim_test_not_a_checkpoint.bin");
        std::fs::write(&temp_path, b"PRMD0000").unwrap();
        let result = Checkpoint::load(&temp_path);
        std::fs::remove_file(&temp_path).ok();

        assert!(matches!(result, Err(CheckpointError::InvalidFormat(_))));
    }

    #[test]
    fn test_rejects_network_without_room_for_layers() {
        let network = Network::unconnected(4, 8, 2, Activation::Sigmoid);
        let checkpoint = Checkpoint::new(0, Config::default(), network, seeded(1), 1, StatsHistory::new(10));
        let temp_path = std::env::temp_dir().join("rnn_sim_test_truncated_network.bin");

        checkpoint.save(&temp_path).unwrap();
        let result = Checkpoint::load(&temp_path);
        std::fs::remove_file(&temp_path).ok();

        assert!(matches!(
            result,
            Err(CheckpointError::Network(NetworkError::Partition {
                neurons: 2,
                inputs: 4,
                outputs: 8
            }))
        ));
    }

    #[test]
    fn test_checkpoint_size() {
        let size = create_test_checkpoint().size_bytes();
        assert!(size > 0);
        assert!(size < 100_000);
    }
}

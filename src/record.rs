//! Plain-text network record used by the analysis and plotting tools.
//!
//! A record is a single whitespace-separated line:
//!
//! ```text
//! [n_inputs n_outputs] n_neurons n_connections bias_0 .. bias_N (source target weight)*
//! ```
//!
//! The leading input/output counts are only present in the full shape.

use crate::neural::{Activation, Network, NetworkError};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Which of the two record layouts to read or write
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordShape {
    /// Starts with the input and output counts
    #[default]
    Full,
    /// Topology only; the reader must know the layer sizes
    Compact,
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record ended early: missing {0}")]
    MissingField(&'static str),

    #[error("invalid {field}: {token:?}")]
    InvalidToken { field: &'static str, token: String },

    #[error("{found} trailing tokens after the last connection")]
    TrailingTokens { found: usize },

    #[error("record has {neurons} neurons but {inputs} inputs and {outputs} outputs")]
    TooFewNeurons {
        neurons: usize,
        inputs: usize,
        outputs: usize,
    },

    #[error("record declares {recorded:?} inputs/outputs but {requested:?} were requested")]
    LayerMismatch {
        recorded: (usize, usize),
        requested: (usize, usize),
    },

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Parsed contents of a record line
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkRecord {
    /// `(n_inputs, n_outputs)`, present for full records only
    pub layers: Option<(usize, usize)>,
    pub biases: Vec<f64>,
    pub connections: Vec<(usize, usize, f64)>,
}

impl NetworkRecord {
    /// Snapshot the topology and biases of a network
    pub fn capture(network: &Network) -> Self {
        Self {
            layers: Some((network.n_inputs(), network.n_outputs())),
            biases: network.neurons().iter().map(|n| n.bias()).collect(),
            connections: network
                .connections()
                .iter()
                .map(|c| (c.source(), c.target(), c.weight()))
                .collect(),
        }
    }

    pub fn parse(line: &str, shape: RecordShape) -> Result<Self, RecordError> {
        let mut tokens = line.split_whitespace();

        let layers = match shape {
            RecordShape::Full => Some((
                next_token(&mut tokens, "input count")?,
                next_token(&mut tokens, "output count")?,
            )),
            RecordShape::Compact => None,
        };
        let n_neurons: usize = next_token(&mut tokens, "neuron count")?;
        let n_connections: usize = next_token(&mut tokens, "connection count")?;

        let biases = (0..n_neurons)
            .map(|_| next_token(&mut tokens, "bias"))
            .collect::<Result<Vec<f64>, _>>()?;

        let connections = (0..n_connections)
            .map(|_| {
                Ok((
                    next_token(&mut tokens, "connection source")?,
                    next_token(&mut tokens, "connection target")?,
                    next_token(&mut tokens, "connection weight")?,
                ))
            })
            .collect::<Result<Vec<(usize, usize, f64)>, RecordError>>()?;

        let trailing = tokens.count();
        if trailing > 0 {
            return Err(RecordError::TrailingTokens { found: trailing });
        }

        Ok(Self { layers, biases, connections })
    }

    pub fn load<P: AsRef<Path>>(path: P, shape: RecordShape) -> Result<Self, RecordError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, shape)
    }

    /// Render as a single line without a trailing newline. A record parsed
    /// from the compact shape has no layer counts to write in the full one.
    pub fn to_line(&self, shape: RecordShape) -> Result<String, RecordError> {
        match shape {
            RecordShape::Full => {
                let layers = self.layers.ok_or(RecordError::MissingField("input/output counts"))?;
                Ok(self.render(Some(layers)))
            }
            RecordShape::Compact => Ok(self.render(None)),
        }
    }

    fn render(&self, layers: Option<(usize, usize)>) -> String {
        let mut out = String::new();
        if let Some((inputs, outputs)) = layers {
            let _ = write!(out, "{} {} ", inputs, outputs);
        }
        let _ = write!(out, "{} {}", self.biases.len(), self.connections.len());
        for bias in &self.biases {
            let _ = write!(out, " {}", bias);
        }
        for (source, target, weight) in &self.connections {
            let _ = write!(out, " {} {} {}", source, target, weight);
        }
        out
    }

    /// Rebuild a network. `layers` is required for compact records and must
    /// agree with the counts stored in a full one.
    pub fn to_network(
        &self,
        layers: Option<(usize, usize)>,
        activation: Activation,
    ) -> Result<Network, RecordError> {
        let (inputs, outputs) = match (self.layers, layers) {
            (Some(recorded), Some(requested)) if recorded != requested => {
                return Err(RecordError::LayerMismatch { recorded, requested });
            }
            (recorded, requested) => requested
                .or(recorded)
                .ok_or(RecordError::MissingField("input/output counts"))?,
        };
        let neurons = self.biases.len();
        if neurons < inputs + outputs {
            return Err(RecordError::TooFewNeurons { neurons, inputs, outputs });
        }

        let mut net = Network::unconnected(inputs, outputs, neurons, activation);
        for (i, &bias) in self.biases.iter().enumerate() {
            net.set_bias(i, bias)?;
        }
        for &(source, target, weight) in &self.connections {
            net.add_connection(source, target, weight)?;
        }
        net.validate()?;
        Ok(net)
    }
}

fn next_token<'a, T, I>(tokens: &mut I, field: &'static str) -> Result<T, RecordError>
where
    T: FromStr,
    I: Iterator<Item = &'a str>,
{
    let token = tokens.next().ok_or(RecordError::MissingField(field))?;
    token.parse().map_err(|_| RecordError::InvalidToken {
        field,
        token: token.to_string(),
    })
}

/// Write the record line for `network`, newline-terminated
pub fn write_record<W: Write>(network: &Network, shape: RecordShape, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", to_record_string(network, shape))
}

pub fn to_record_string(network: &Network, shape: RecordShape) -> String {
    let layers = match shape {
        RecordShape::Full => Some((network.n_inputs(), network.n_outputs())),
        RecordShape::Compact => None,
    };
    NetworkRecord::capture(network).render(layers)
}

/// Write the record to `path`, replacing any existing file
pub fn save_record<P: AsRef<Path>>(network: &Network, shape: RecordShape, path: P) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_record(network, shape, &mut file)?;
    file.flush()
}

impl Network {
    pub fn from_record(
        record: &NetworkRecord,
        n_inputs: usize,
        n_outputs: usize,
    ) -> Result<Self, RecordError> {
        record.to_network(Some((n_inputs, n_outputs)), Activation::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Network {
        let mut net = Network::new(2, 1);
        net.set_bias(0, 0.25).unwrap();
        net.set_bias(2, -0.5).unwrap();
        net.set_weight(0, 0.75).unwrap();
        net.set_weight(1, -1.0).unwrap();
        net.split_connection(1).unwrap();
        net
    }

    #[test]
    fn test_full_layout() {
        let line = to_record_string(&sample(), RecordShape::Full);
        assert_eq!(line, "2 1 4 3 0.25 0 -0.5 0 0 2 0.75 1 3 1 3 2 -1");
    }

    #[test]
    fn test_compact_layout() {
        let line = to_record_string(&Network::new(1, 1), RecordShape::Compact);
        assert_eq!(line, "2 1 0 0 0 1 0");
    }

    #[test]
    fn test_parse_rebuilds_network() {
        let net = sample();
        let line = to_record_string(&net, RecordShape::Full);
        let record = NetworkRecord::parse(&line, RecordShape::Full).unwrap();
        let rebuilt = record.to_network(None, Activation::Sigmoid).unwrap();
        assert_eq!(rebuilt, net);

        let compact = to_record_string(&net, RecordShape::Compact);
        let record = NetworkRecord::parse(&compact, RecordShape::Compact).unwrap();
        assert_eq!(record.layers, None);
        assert_eq!(Network::from_record(&record, 2, 1).unwrap(), net);
    }

    #[test]
    fn test_compact_needs_layers() {
        let record = NetworkRecord::parse("2 0 0 0", RecordShape::Compact).unwrap();
        assert!(matches!(
            record.to_network(None, Activation::Sigmoid),
            Err(RecordError::MissingField(_))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            NetworkRecord::parse("2 1 3 2 0 0 0 0 2 1.0 1", RecordShape::Full),
            Err(RecordError::MissingField("connection target"))
        ));
        assert!(matches!(
            NetworkRecord::parse("2 1 3 0 0 zero 0", RecordShape::Full),
            Err(RecordError::InvalidToken { field: "bias", .. })
        ));
        assert!(matches!(
            NetworkRecord::parse("2 0 0 0 7", RecordShape::Compact),
            Err(RecordError::TrailingTokens { found: 1 })
        ));
    }

    #[test]
    fn test_rebuild_rejects_bad_topology() {
        let record = NetworkRecord::parse("1 1 2 1 0 0 0 5 1", RecordShape::Full).unwrap();
        assert!(matches!(
            record.to_network(None, Activation::Sigmoid),
            Err(RecordError::Network(NetworkError::NeuronOutOfRange { index: 5, len: 2 }))
        ));

        let record = NetworkRecord::parse("3 1 2 0 0 0", RecordShape::Full).unwrap();
        assert!(matches!(
            record.to_network(None, Activation::Sigmoid),
            Err(RecordError::TooFewNeurons { .. })
        ));
    }

    #[test]
    fn test_rebuild_rejects_conflicting_layers() {
        let line = to_record_string(&sample(), RecordShape::Full);
        let record = NetworkRecord::parse(&line, RecordShape::Full).unwrap();
        assert!(matches!(
            Network::from_record(&record, 1, 2),
            Err(RecordError::LayerMismatch { recorded: (2, 1), requested: (1, 2) })
        ));
        assert!(Network::from_record(&record, 2, 1).is_ok());
    }

    #[test]
    fn test_compact_record_cannot_render_full() {
        let line = to_record_string(&sample(), RecordShape::Compact);
        let record = NetworkRecord::parse(&line, RecordShape::Compact).unwrap();
        assert!(matches!(
            record.to_line(RecordShape::Full),
            Err(RecordError::MissingField("input/output counts"))
        ));
        assert_eq!(record.to_line(RecordShape::Compact).unwrap(), line);
    }
}

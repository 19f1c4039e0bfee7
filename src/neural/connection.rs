use serde::{Deserialize, Serialize};

/// Weighted directed edge between two neurons of the same network.
///
/// Endpoints are fixed once created; rewiring means removing the connection
/// and adding a new one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    source: usize,
    target: usize,
    weight: f64,
}

impl Connection {
    pub fn new(source: usize, target: usize, weight: f64) -> Self {
        Self { source, target, weight }
    }

    #[inline]
    pub fn source(&self) -> usize {
        self.source
    }

    #[inline]
    pub fn target(&self) -> usize {
        self.target
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    #[inline]
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }
}

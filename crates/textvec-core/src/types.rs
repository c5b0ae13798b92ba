//! Domain types shared between the provider and the adapter.

use serde::{Deserialize, Serialize};

/// The single output record written to stdout.
///
/// `embedding` holds exactly D values in the order the model produced
/// them; dimension order is semantically meaningful and never re-sorted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub embedding: Vec<f32>,
}

impl EmbeddingRecord {
    pub fn new(embedding: Vec<f32>) -> Self {
        Self { embedding }
    }

    pub fn dim(&self) -> usize {
        self.embedding.len()
    }
}

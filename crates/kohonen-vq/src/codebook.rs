//! Codebook storage and nearest-code search

use crate::{Result, VqError};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Similarity metric used to pick a winning code vector.
///
/// The two metrics answer different questions and are never mixed:
/// `Euclidean` clusters raw intensities, `Cosine` clusters directions and
/// expects unit-norm queries and codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Similarity {
    /// Minimum squared L2 distance
    Euclidean,
    /// Maximum dot product between unit vectors
    Cosine,
}

impl Similarity {
    /// Metric matching a normalization flag
    pub fn for_normalized(normalize: bool) -> Self {
        if normalize {
            Similarity::Cosine
        } else {
            Similarity::Euclidean
        }
    }
}

/// A fixed-size set of N code vectors of dimension D
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Codebook {
    num_codes: usize,
    dim: usize,
    /// Code vectors [num_codes × dim], row-major
    vectors: Vec<f32>,
}

impl Codebook {
    /// Create a codebook with every component drawn uniformly from `[lo, hi]`.
    pub fn random<R: Rng + ?Sized>(
        num_codes: usize,
        dim: usize,
        (lo, hi): (f32, f32),
        rng: &mut R,
    ) -> Result<Self> {
        check_shape(num_codes, dim)?;
        if !(lo.is_finite() && hi.is_finite()) || lo > hi {
            return Err(VqError::InvalidConfig(format!(
                "invalid value range [{}, {}]",
                lo, hi
            )));
        }
        // Uniform sampling needs a representable span
        if !(hi - lo).is_finite() {
            return Err(VqError::InvalidConfig(format!(
                "value range [{}, {}] is too wide to sample from",
                lo, hi
            )));
        }

        let vectors = (0..num_codes * dim)
            .map(|_| rng.gen_range(lo..=hi))
            .collect();

        Ok(Self {
            num_codes,
            dim,
            vectors,
        })
    }

    /// Create from existing code vectors
    pub fn from_vectors(num_codes: usize, dim: usize, vectors: Vec<f32>) -> Result<Self> {
        check_shape(num_codes, dim)?;
        let expected = num_codes * dim;
        if vectors.len() != expected {
            return Err(VqError::DimensionMismatch {
                expected,
                actual: vectors.len(),
            });
        }

        Ok(Self {
            num_codes,
            dim,
            vectors,
        })
    }

    /// Number of code vectors (N)
    pub fn num_codes(&self) -> usize {
        self.num_codes
    }

    /// Dimension of each code vector (D)
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Get code vector by index
    pub fn get(&self, index: usize) -> Option<&[f32]> {
        if index >= self.num_codes {
            return None;
        }
        let offset = index * self.dim;
        Some(&self.vectors[offset..offset + self.dim])
    }

    /// Row-major view of all code vectors
    pub fn vectors(&self) -> &[f32] {
        &self.vectors
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> &mut [f32] {
        let offset = index * self.dim;
        &mut self.vectors[offset..offset + self.dim]
    }

    pub(crate) fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, f32> {
        self.vectors.chunks_exact_mut(self.dim)
    }

    /// Index of the winning code vector for one query.
    ///
    /// Comparison runs in index order with a strict improvement test, so
    /// ties resolve to the lowest index.
    pub fn nearest(&self, query: &[f32], similarity: Similarity) -> Result<usize> {
        if query.len() != self.dim {
            return Err(VqError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }
        Ok(self.nearest_unchecked(query, similarity))
    }

    fn nearest_unchecked(&self, query: &[f32], similarity: Similarity) -> usize {
        let codes = self.vectors.chunks_exact(self.dim);
        let mut best_idx = 0;

        match similarity {
            Similarity::Euclidean => {
                let mut best_dist = f32::INFINITY;
                for (i, code) in codes.enumerate() {
                    let dist = squared_distance(query, code);
                    if dist < best_dist {
                        best_dist = dist;
                        best_idx = i;
                    }
                }
            }
            Similarity::Cosine => {
                let mut best_dot = f32::NEG_INFINITY;
                for (i, code) in codes.enumerate() {
                    let dot = dot(query, code);
                    if dot > best_dot {
                        best_dot = dot;
                        best_idx = i;
                    }
                }
            }
        }

        best_idx
    }

    /// Winning code index for every row of a row-major query matrix.
    pub fn assign(&self, queries: &[f32], similarity: Similarity) -> Result<Vec<usize>> {
        if !queries.len().is_multiple_of(self.dim) {
            return Err(VqError::DimensionMismatch {
                expected: queries.len().div_ceil(self.dim) * self.dim,
                actual: queries.len(),
            });
        }

        Ok(queries
            .chunks_exact(self.dim)
            .map(|q| self.nearest_unchecked(q, similarity))
            .collect())
    }

    /// Storage cost of the codebook at 8 bits per component
    pub fn memory_bits(&self) -> u64 {
        self.num_codes as u64 * self.dim as u64 * 8
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| VqError::InvalidFormat(e.to_string()))
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let codebook: Self =
            bincode::deserialize(bytes).map_err(|e| VqError::InvalidFormat(e.to_string()))?;
        check_shape(codebook.num_codes, codebook.dim)?;
        if codebook.vectors.len() != codebook.num_codes * codebook.dim {
            return Err(VqError::InvalidFormat(format!(
                "codebook holds {} values, header says {}×{}",
                codebook.vectors.len(),
                codebook.num_codes,
                codebook.dim
            )));
        }
        Ok(codebook)
    }
}

fn check_shape(num_codes: usize, dim: usize) -> Result<()> {
    if num_codes == 0 {
        return Err(VqError::InvalidConfig(
            "code vector count must be positive".into(),
        ));
    }
    if dim == 0 {
        return Err(VqError::InvalidConfig(
            "code vector dimension must be positive".into(),
        ));
    }
    Ok(())
}

/// Squared L2 distance between two vectors
pub(crate) fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

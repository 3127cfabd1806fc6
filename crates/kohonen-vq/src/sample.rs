//! Training sample sets

use crate::{Result, VqError};

/// Norms below this are treated as zero and left unscaled.
pub(crate) const NORM_EPSILON: f32 = 1e-12;

/// A fixed M×D matrix of training vectors, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    data: Vec<f32>,
    dim: usize,
}

impl SampleSet {
    /// Create a sample set from a row-major buffer of `dim`-sized rows.
    pub fn new(data: Vec<f32>, dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(VqError::InvalidConfig(
                "sample dimension must be positive".into(),
            ));
        }
        if data.is_empty() {
            return Err(VqError::InvalidConfig("sample set is empty".into()));
        }
        if !data.len().is_multiple_of(dim) {
            return Err(VqError::InvalidConfig(format!(
                "sample buffer of {} values is not a whole number of {}-dim rows",
                data.len(),
                dim
            )));
        }
        if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
            return Err(VqError::InvalidConfig(format!(
                "sample value at offset {} is not finite",
                pos
            )));
        }

        Ok(Self { data, dim })
    }

    /// Create a sample set from individual rows, which must share one length.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self> {
        let dim = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            let row = row.as_ref();
            if row.len() != dim {
                return Err(VqError::DimensionMismatch {
                    expected: dim,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::new(data, dim)
    }

    /// Number of sample vectors (M)
    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    /// Always false; empty sample sets are rejected at construction
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Dimension of every sample vector (D)
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Sample vector `i`
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        let offset = i.checked_mul(self.dim)?;
        self.data.get(offset..offset + self.dim)
    }

    /// Iterate over sample vectors in order
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f32]> {
        self.data.chunks_exact(self.dim)
    }

    /// Row-major view of all values
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Minimum and maximum over every value in the set.
    pub fn value_range(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Rescale every row to unit L2 norm, returning each row's original norm.
    ///
    /// A zero row stays zero and reports a scale of 0.
    pub fn normalize(&mut self) -> Vec<f32> {
        self.data
            .chunks_exact_mut(self.dim)
            .map(normalize_in_place)
            .collect()
    }
}

/// L2 norm of a vector
pub(crate) fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Divide `v` by its L2 norm and return the norm. Zero vectors are untouched.
pub(crate) fn normalize_in_place(v: &mut [f32]) -> f32 {
    let norm = l2_norm(v);
    if norm > NORM_EPSILON {
        v.iter_mut().for_each(|x| *x /= norm);
        norm
    } else {
        0.0
    }
}

//! Dispersion matrix
//!
//! The fixed positive-definite matrix over the outcome dimensions used to
//! weight squared distances between outcome vectors and child means. Its
//! inverse is computed once and cached by the splitter, never inside the
//! per-sample scoring loop.
use crate::errors::ForestError;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// A square matrix encoding the assumed correlation and scale structure
/// across the outcome dimensions.
///
/// Must be sized exactly `num_outcomes x num_outcomes` and invertible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispersionMatrix {
    values: Vec<f64>,
    dim: usize,
}

impl DispersionMatrix {
    /// Create a dispersion matrix from row-major entries.
    ///
    /// * `values` - The matrix entries, row major, `dim * dim` of them.
    /// * `dim` - The number of outcome dimensions.
    pub fn new(values: Vec<f64>, dim: usize) -> Result<Self, ForestError> {
        if values.len() != dim * dim {
            return Err(ForestError::DimensionMismatch(format!(
                "expected {} entries for a {} x {} dispersion matrix, got {}",
                dim * dim,
                dim,
                dim,
                values.len()
            )));
        }
        Ok(DispersionMatrix { values, dim })
    }

    /// The identity dispersion matrix, which reduces the generalized
    /// squared distance to the ordinary squared euclidean distance.
    pub fn identity(dim: usize) -> Self {
        let mut values = vec![0.0; dim * dim];
        for i in 0..dim {
            values[i * dim + i] = 1.0;
        }
        DispersionMatrix { values, dim }
    }

    /// The number of outcome dimensions this matrix covers.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Invert the matrix, returning the inverse in row-major order.
    pub fn inverse(&self) -> Result<Vec<f64>, ForestError> {
        let m = DMatrix::from_row_slice(self.dim, self.dim, &self.values);
        let inv = m.try_inverse().ok_or(ForestError::SingularDispersion)?;
        let mut out = Vec::with_capacity(self.dim * self.dim);
        for i in 0..self.dim {
            for j in 0..self.dim {
                out.push(inv[(i, j)]);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::precision_round;

    #[test]
    fn test_identity_inverse() {
        let sigma = DispersionMatrix::identity(3);
        let inv = sigma.inverse().unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_eq!(inv[i * 3 + j], expected);
            }
        }
    }

    #[test]
    fn test_correlated_inverse() {
        let sigma = DispersionMatrix::new(vec![1.0, 0.5, 0.5, 1.0], 2).unwrap();
        let inv = sigma.inverse().unwrap();
        // [[1, 0.5], [0.5, 1]]^-1 = [[4/3, -2/3], [-2/3, 4/3]]
        assert_eq!(precision_round(inv[0], 7), precision_round(4.0 / 3.0, 7));
        assert_eq!(precision_round(inv[1], 7), precision_round(-2.0 / 3.0, 7));
        assert_eq!(precision_round(inv[2], 7), precision_round(-2.0 / 3.0, 7));
        assert_eq!(precision_round(inv[3], 7), precision_round(4.0 / 3.0, 7));
    }

    #[test]
    fn test_singular_rejected() {
        let sigma = DispersionMatrix::new(vec![1.0, 1.0, 1.0, 1.0], 2).unwrap();
        assert!(matches!(sigma.inverse(), Err(ForestError::SingularDispersion)));
    }

    #[test]
    fn test_size_mismatch_rejected() {
        assert!(DispersionMatrix::new(vec![1.0, 0.0, 0.0], 2).is_err());
    }
}

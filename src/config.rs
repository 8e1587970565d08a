//! Forest configuration
//!
//! Tuning parameters for forest training, with validation of the ranges
//! each one accepts.
use crate::constants::{DEFAULT_ALPHA, DEFAULT_MIN_NODE_SIZE, DEFAULT_NUM_TREES, DEFAULT_SAMPLE_FRACTION, MAX_ALPHA};
use crate::errors::ForestError;
use crate::utils::{validate_float_parameter, validate_positive_float_parameter};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ForestConfig {
    /// Number of trees in the forest.
    pub num_trees: usize,
    /// Number of candidate variables drawn per node. Zero selects the
    /// default of `min(ceil(sqrt(p) + 20), p)` for `p` features.
    pub mtry: usize,
    /// Nodes with at most this many samples are not split further.
    pub min_node_size: usize,
    /// Fraction of rows drawn, without replacement, for each tree.
    pub sample_fraction: f64,
    /// Minimum fraction of a node's samples each child must receive.
    pub alpha: f64,
    /// Reserved for a child-size-imbalance penalty; carried but not
    /// applied.
    pub imbalance_penalty: f64,
    /// Seed for subsampling and candidate-variable draws.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        ForestConfig {
            num_trees: DEFAULT_NUM_TREES,
            mtry: 0,
            min_node_size: DEFAULT_MIN_NODE_SIZE,
            sample_fraction: DEFAULT_SAMPLE_FRACTION,
            alpha: DEFAULT_ALPHA,
            imbalance_penalty: 0.0,
            seed: 42,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<(), ForestError> {
        if self.num_trees == 0 {
            return Err(ForestError::InvalidParameter(
                "num_trees".to_string(),
                "a positive integer".to_string(),
                "0".to_string(),
            ));
        }
        validate_float_parameter(self.alpha, 0.0, MAX_ALPHA, "alpha")?;
        validate_float_parameter(self.sample_fraction, 0.0, 1.0, "sample_fraction")?;
        if self.sample_fraction == 0.0 {
            return Err(ForestError::InvalidParameter(
                "sample_fraction".to_string(),
                "a fraction in (0, 1]".to_string(),
                "0".to_string(),
            ));
        }
        validate_positive_float_parameter(self.imbalance_penalty, "imbalance_penalty")?;
        Ok(())
    }

    /// The per-node candidate variable count, resolving the zero default.
    pub fn resolved_mtry(&self, num_variables: usize) -> usize {
        if self.mtry > 0 {
            self.mtry.min(num_variables)
        } else {
            (((num_variables as f64).sqrt() + 20.0).ceil() as usize).min(num_variables)
        }
    }
}

//! Splitter
//!
//! Best-split search for a single tree node. For every candidate variable
//! and threshold, a candidate partition is scored by the size-weighted
//! within-child dispersion of the outcome vectors, where dispersion is the
//! generalized squared distance `(y - mu)^T sigma^-1 (y - mu)` between a
//! sample's outcome vector and its child's mean.
use crate::data::Matrix;
use crate::dataset::{values_equal, Dataset};
use crate::dispersion::DispersionMatrix;
use crate::errors::ForestError;

/// Reusable best-split evaluator for multivariate regression trees.
///
/// One instance serves a whole tree-growing pass. It owns the bucket
/// scratch buffers, sized once at construction from the largest
/// per-variable distinct-value count the dataset can produce, and cleared
/// rather than reallocated for every (node, variable) evaluation. The
/// inverse of the dispersion matrix is computed here, once, and reused
/// across all variables, boundaries, and samples.
///
/// An instance must not be shared across threads: each call mutates the
/// scratch buffers in place. Parallel training requires one instance per
/// worker, sized from the same cardinality bound.
pub struct DispersionSplitter {
    alpha: f64,
    /// Reserved for a child-size-imbalance penalty term. Carried through
    /// the configuration but not applied to the loss.
    #[allow(dead_code)]
    imbalance_penalty: f64,
    num_outcomes: usize,
    /// Row-major `num_outcomes x num_outcomes` inverse of sigma.
    sigma_inverse: Vec<f64>,
    /// Per-bucket sample counts.
    counter: Vec<usize>,
    /// Per-bucket outcome-vector sums, bucket-major.
    sums: Vec<f64>,
}

impl DispersionSplitter {
    /// Create a splitter for one tree-growing pass.
    ///
    /// * `max_num_unique_values` - Upper bound on the distinct values any
    ///   variable takes over the full dataset, used to size the scratch
    ///   buffers.
    /// * `alpha` - Minimum fraction of a node's samples each child must
    ///   receive.
    /// * `imbalance_penalty` - Reserved, not currently applied.
    /// * `sigma` - Dispersion matrix over the outcome dimensions; inverted
    ///   here once.
    pub fn new(
        max_num_unique_values: usize,
        alpha: f64,
        imbalance_penalty: f64,
        sigma: &DispersionMatrix,
    ) -> Result<Self, ForestError> {
        let sigma_inverse = sigma.inverse()?;
        let num_outcomes = sigma.dim();
        Ok(DispersionSplitter {
            alpha,
            imbalance_penalty,
            num_outcomes,
            sigma_inverse,
            counter: vec![0; max_num_unique_values],
            sums: vec![0.0; max_num_unique_values * num_outcomes],
        })
    }

    /// Search every candidate variable for the best split of `node`.
    ///
    /// Returns `true` if no admissible split exists, in which case the
    /// node's entries in the output arrays are left untouched and the
    /// caller should finalize the node as a leaf. Otherwise the chosen
    /// variable and threshold are written into the grower-owned, per-node
    /// output arrays and `false` is returned. Samples with a value equal to
    /// the threshold belong to the left child.
    ///
    /// The caller must guarantee `samples[node]` is non-empty and that the
    /// response matrix has `num_outcomes` columns covering every sample
    /// index.
    #[allow(clippy::too_many_arguments)]
    pub fn find_best_split(
        &mut self,
        dataset: &Dataset,
        node: usize,
        possible_split_vars: &[usize],
        responses: &Matrix<f64>,
        samples: &[Vec<usize>],
        split_vars: &mut [usize],
        split_values: &mut [f64],
    ) -> bool {
        let size_node = samples[node].len();
        let min_child_size = ((size_node as f64 * self.alpha).ceil() as usize).max(1);

        // Precompute the sum of outcomes in this node.
        let mut sum_node = vec![0.0; self.num_outcomes];
        for &sample in &samples[node] {
            for k in 0..self.num_outcomes {
                sum_node[k] += *responses.get(sample, k);
            }
        }

        let mut best_var = 0;
        let mut best_value = 0.0;
        let mut best_loss = f64::INFINITY;

        for &var in possible_split_vars {
            self.find_best_split_value(
                dataset,
                node,
                var,
                &sum_node,
                size_node,
                min_child_size,
                &mut best_value,
                &mut best_var,
                &mut best_loss,
                responses,
                samples,
            );
        }

        // Stop if no good split found.
        if best_loss.is_infinite() {
            return true;
        }

        split_vars[node] = best_var;
        split_values[node] = best_value;
        false
    }

    /// Scan one candidate variable, updating the running best split in
    /// place. Only a strictly smaller loss replaces the current best, so
    /// ties keep the earlier candidate in scan order.
    #[allow(clippy::too_many_arguments)]
    fn find_best_split_value(
        &mut self,
        dataset: &Dataset,
        node: usize,
        var: usize,
        sum_node: &[f64],
        size_node: usize,
        min_child_size: usize,
        best_value: &mut f64,
        best_var: &mut usize,
        best_loss: &mut f64,
        responses: &Matrix<f64>,
        samples: &[Vec<usize>],
    ) {
        let (possible_split_values, sorted_samples) = dataset.sorted_values_and_samples(&samples[node], var);

        // Try next variable if all values are equal for this one.
        if possible_split_values.len() < 2 {
            return;
        }

        // A split is only considered between two distinct values, never at
        // the maximal one, which would leave an empty right child.
        let num_splits = possible_split_values.len() - 1;
        let num_outcomes = self.num_outcomes;
        self.counter[..num_splits].fill(0);
        self.sums[..num_splits * num_outcomes].fill(0.0);

        // Fill counter and sums buckets. A change of value between two
        // adjacent sorted samples closes the current bucket; a missing
        // value never compares equal to a non-missing neighbor, so the
        // missing group closes a bucket too instead of merging with it.
        let mut split_index = 0;
        for i in 0..size_node - 1 {
            let sample = sorted_samples[i];
            let sample_value = dataset.value(sample, var);

            self.counter[split_index] += 1;
            for k in 0..num_outcomes {
                self.sums[split_index * num_outcomes + k] += *responses.get(sample, k);
            }

            let next_sample_value = dataset.value(sorted_samples[i + 1], var);
            if !values_equal(sample_value, next_sample_value) {
                split_index += 1;
            }
        }

        let mut n_left = 0;
        let mut sum_left = vec![0.0; num_outcomes];
        let mut mu_left = vec![0.0; num_outcomes];
        let mut mu_right = vec![0.0; num_outcomes];
        let mut diff = vec![0.0; num_outcomes];

        // Walk the boundaries left to right, accumulating the left child.
        for i in 0..num_splits {
            n_left += self.counter[i];
            for k in 0..num_outcomes {
                sum_left[k] += self.sums[i * num_outcomes + k];
            }

            // Skip this split if the left child is too small.
            if n_left < min_child_size {
                continue;
            }

            // Stop once the right child is too small, later boundaries only
            // shrink it further.
            let n_right = size_node - n_left;
            if n_right < min_child_size {
                break;
            }

            for k in 0..num_outcomes {
                mu_left[k] = sum_left[k] / n_left as f64;
                mu_right[k] = (sum_node[k] - sum_left[k]) / n_right as f64;
            }

            let ss_left = self.dispersion_sum(&sorted_samples[..n_left], &mu_left, responses, &mut diff);
            let ss_right = self.dispersion_sum(&sorted_samples[n_left..], &mu_right, responses, &mut diff);

            let loss =
                (n_left as f64 / size_node as f64) * ss_left + (n_right as f64 / size_node as f64) * ss_right;

            // If better than before, use this.
            if loss < *best_loss {
                *best_value = possible_split_values[i];
                *best_var = var;
                *best_loss = loss;
            }
        }
    }

    /// Sum over `child_samples` of the generalized squared distance between
    /// each sample's outcome vector and the child mean `mu`, using the
    /// cached inverse of sigma.
    fn dispersion_sum(&self, child_samples: &[usize], mu: &[f64], responses: &Matrix<f64>, diff: &mut [f64]) -> f64 {
        let k = self.num_outcomes;
        let mut total = 0.0;
        for &sample in child_samples {
            for a in 0..k {
                diff[a] = *responses.get(sample, a) - mu[a];
            }
            for a in 0..k {
                let row = &self.sigma_inverse[a * k..(a + 1) * k];
                let mut acc = 0.0;
                for (b, d) in diff.iter().enumerate() {
                    acc += row[b] * d;
                }
                total += diff[a] * acc;
            }
        }
        total
    }
}

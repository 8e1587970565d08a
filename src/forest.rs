//! Forest
//!
//! Training, prediction, and persistence for an ensemble of multivariate
//! regression trees sharing one dispersion matrix.
use crate::config::ForestConfig;
use crate::data::{Matrix, RowMajorMatrix};
use crate::dataset::Dataset;
use crate::dispersion::DispersionMatrix;
use crate::errors::ForestError;
use crate::sampler::{RandomSampler, Sampler};
use crate::splitter::DispersionSplitter;
use crate::tree::Tree;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// An ensemble of multivariate regression trees.
///
/// Trees are trained sequentially, each on its own row subsample, all
/// driven by one splitter instance sized once from the dataset's
/// per-variable cardinality bound.
#[derive(Serialize, Deserialize)]
pub struct MultiRegressionForest {
    pub config: ForestConfig,
    pub sigma: DispersionMatrix,
    pub trees: Vec<Tree>,
    pub num_outcomes: usize,
}

impl MultiRegressionForest {
    pub fn new(config: ForestConfig, sigma: DispersionMatrix) -> Self {
        let num_outcomes = sigma.dim();
        MultiRegressionForest {
            config,
            sigma,
            trees: Vec::new(),
            num_outcomes,
        }
    }

    /// Fit the forest.
    ///
    /// * `data` - Feature matrix, one row per sample.
    /// * `responses` - Outcome matrix, one row per sample, one column per
    ///   outcome; its column count must match the dispersion matrix.
    pub fn fit(&mut self, data: &Matrix<f64>, responses: &Matrix<f64>) -> Result<(), ForestError> {
        self.config.validate()?;
        if responses.cols != self.sigma.dim() {
            return Err(ForestError::DimensionMismatch(format!(
                "responses have {} outcome columns but the dispersion matrix covers {}",
                responses.cols,
                self.sigma.dim()
            )));
        }
        if responses.rows != data.rows {
            return Err(ForestError::DimensionMismatch(format!(
                "data has {} rows but responses have {}",
                data.rows, responses.rows
            )));
        }
        if data.rows == 0 {
            return Err(ForestError::DimensionMismatch("data has no rows".to_string()));
        }

        let dataset = Dataset::new(data);
        let mut splitter = DispersionSplitter::new(
            dataset.max_num_unique_values(),
            self.config.alpha,
            self.config.imbalance_penalty,
            &self.sigma,
        )?;
        let mtry = self.config.resolved_mtry(data.cols);
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut sampler = RandomSampler::new(self.config.sample_fraction);

        info!(
            "Fitting {} trees on {} samples, {} variables, {} outcomes.",
            self.config.num_trees, data.rows, data.cols, self.num_outcomes
        );

        self.trees = Vec::with_capacity(self.config.num_trees);
        for _ in 0..self.config.num_trees {
            let (in_bag, out_of_bag) = sampler.sample(&mut rng, &data.index);
            let mut tree = Tree::new();
            tree.oob_indices = out_of_bag;
            tree.fit(
                &dataset,
                responses,
                in_bag,
                &mut splitter,
                mtry,
                self.config.min_node_size,
                &mut rng,
            );
            self.trees.push(tree);
        }
        Ok(())
    }

    /// Predict outcome vectors for every row, averaged over all trees.
    pub fn predict(&self, data: &Matrix<f64>) -> RowMajorMatrix<f64> {
        let n_trees = self.trees.len() as f64;
        let rows: Vec<Vec<f64>> = data
            .index
            .par_iter()
            .map(|&row| {
                let row_values = data.get_row(row);
                let mut acc = vec![0.0; self.num_outcomes];
                for tree in &self.trees {
                    for (a, p) in acc.iter_mut().zip(tree.predict_row(&row_values)) {
                        *a += p;
                    }
                }
                for a in acc.iter_mut() {
                    *a /= n_trees;
                }
                acc
            })
            .collect();
        RowMajorMatrix::new(rows.into_iter().flatten().collect(), data.rows, self.num_outcomes)
    }

    /// Predict outcome vectors for the training rows using only trees that
    /// did not see each row. Rows that were in-bag for every tree get NaN
    /// vectors.
    pub fn predict_oob(&self, data: &Matrix<f64>) -> RowMajorMatrix<f64> {
        let mut oob_trees: Vec<Vec<usize>> = vec![Vec::new(); data.rows];
        for (t, tree) in self.trees.iter().enumerate() {
            for &row in &tree.oob_indices {
                oob_trees[row].push(t);
            }
        }
        let rows: Vec<Vec<f64>> = data
            .index
            .par_iter()
            .map(|&row| {
                let trees = &oob_trees[row];
                if trees.is_empty() {
                    return vec![f64::NAN; self.num_outcomes];
                }
                let row_values = data.get_row(row);
                let mut acc = vec![0.0; self.num_outcomes];
                for &t in trees {
                    for (a, p) in acc.iter_mut().zip(self.trees[t].predict_row(&row_values)) {
                        *a += p;
                    }
                }
                for a in acc.iter_mut() {
                    *a /= trees.len() as f64;
                }
                acc
            })
            .collect();
        RowMajorMatrix::new(rows.into_iter().flatten().collect(), data.rows, self.num_outcomes)
    }

    /// Save the forest to a file in json format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ForestError> {
        fs::write(path, self.json_dump()?).map_err(|e| ForestError::UnableToWrite(e.to_string()))
    }

    /// Dump the forest as a json string.
    pub fn json_dump(&self) -> Result<String, ForestError> {
        serde_json::to_string(self).map_err(|e| ForestError::UnableToWrite(e.to_string()))
    }

    /// Load a forest from a json string.
    pub fn from_json(json_str: &str) -> Result<Self, ForestError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| ForestError::UnableToRead(e.to_string()))
    }

    /// Load a forest from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ForestError> {
        let json_str = fs::read_to_string(path).map_err(|e| ForestError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

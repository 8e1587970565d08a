//! Tree
//!
//! Depth-wise growth of a single multivariate regression tree, driven by
//! the splitting rule, plus per-row prediction.
use crate::data::Matrix;
use crate::dataset::Dataset;
use crate::node::{FrontierNode, Node};
use crate::sampler::draw_candidate_variables;
use crate::splitter::DispersionSplitter;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt::{self, Display};

#[derive(Deserialize, Serialize, Clone)]
pub struct Tree {
    pub nodes: HashMap<usize, Node>,
    pub depth: usize,
    pub n_leaves: usize,
    /// Training samples this tree never saw, kept for out-of-bag
    /// prediction.
    pub oob_indices: Vec<usize>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Tree {
            nodes: HashMap::new(),
            depth: 0,
            n_leaves: 0,
            oob_indices: Vec::new(),
        }
    }

    /// Grow the tree over the given sample index list.
    ///
    /// Frontier nodes whose sample count is at most `min_node_size`, and
    /// nodes for which the splitter finds no admissible split, become
    /// leaves holding their samples' mean outcome vector. Otherwise the
    /// chosen split partitions the samples: values at or below the
    /// threshold go left, missing values go right.
    ///
    /// * `index` - The (bagged) sample indices this tree trains on; must be
    ///   non-empty.
    /// * `mtry` - Number of candidate variables drawn per node.
    #[allow(clippy::too_many_arguments)]
    pub fn fit(
        &mut self,
        dataset: &Dataset,
        responses: &Matrix<f64>,
        index: Vec<usize>,
        splitter: &mut DispersionSplitter,
        mtry: usize,
        min_node_size: usize,
        rng: &mut StdRng,
    ) {
        // Node-indexed sample lists and split outputs, owned here and
        // written by the splitter.
        let mut samples: Vec<Vec<usize>> = vec![index];
        let mut split_vars: Vec<usize> = vec![0];
        let mut split_values: Vec<f64> = vec![f64::NAN];
        let mut n_nodes = 1;

        let mut frontier: VecDeque<FrontierNode> = VecDeque::new();
        frontier.push_back(FrontierNode {
            num: 0,
            depth: 0,
            parent_node: 0,
        });

        while let Some(front) = frontier.pop_front() {
            let node = front.num;
            let size_node = samples[node].len();
            self.depth = self.depth.max(front.depth);

            if size_node <= min_node_size {
                self.finalize_leaf(&front, &samples[node], responses);
                continue;
            }

            let candidate_vars = draw_candidate_variables(rng, dataset.num_variables(), mtry);
            let is_leaf = splitter.find_best_split(
                dataset,
                node,
                &candidate_vars,
                responses,
                &samples,
                &mut split_vars,
                &mut split_values,
            );
            if is_leaf {
                self.finalize_leaf(&front, &samples[node], responses);
                continue;
            }

            let split_variable = split_vars[node];
            let split_value = split_values[node];
            let left_child = n_nodes;
            let right_child = n_nodes + 1;
            n_nodes += 2;

            let node_samples = std::mem::take(&mut samples[node]);
            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = node_samples
                .into_iter()
                .partition(|&s| dataset.value(s, split_variable) <= split_value);
            samples.push(left_samples);
            samples.push(right_samples);
            split_vars.extend([0, 0]);
            split_values.extend([f64::NAN, f64::NAN]);

            self.nodes.insert(
                node,
                Node::new_parent(
                    node,
                    front.depth,
                    front.parent_node,
                    split_variable,
                    split_value,
                    left_child,
                    right_child,
                    size_node,
                ),
            );
            frontier.push_back(FrontierNode {
                num: left_child,
                depth: front.depth + 1,
                parent_node: node,
            });
            frontier.push_back(FrontierNode {
                num: right_child,
                depth: front.depth + 1,
                parent_node: node,
            });
        }
    }

    fn finalize_leaf(&mut self, front: &FrontierNode, node_samples: &[usize], responses: &Matrix<f64>) {
        let num_outcomes = responses.cols;
        let mut mean = vec![0.0; num_outcomes];
        for &sample in node_samples {
            for k in 0..num_outcomes {
                mean[k] += *responses.get(sample, k);
            }
        }
        for m in mean.iter_mut() {
            *m /= node_samples.len() as f64;
        }
        self.nodes.insert(
            front.num,
            Node::new_leaf(front.num, front.depth, front.parent_node, mean, node_samples.len()),
        );
        self.n_leaves += 1;
    }

    /// Predict the outcome vector for one feature row by walking the tree
    /// to a leaf.
    pub fn predict_row(&self, row: &[f64]) -> &[f64] {
        let mut node_idx = 0;
        loop {
            let node = self.nodes.get(&node_idx).unwrap();
            if node.is_leaf {
                return &node.leaf_value;
            }
            node_idx = node.get_child_idx(row[node.split_variable]);
        }
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut print_buffer: Vec<usize> = vec![0];
        while let Some(idx) = print_buffer.pop() {
            let node = &self.nodes[&idx];
            writeln!(f, "{}{}", "      ".repeat(node.depth), node)?;
            if !node.is_leaf {
                print_buffer.push(node.right_child);
                print_buffer.push(node.left_child);
            }
        }
        Ok(())
    }
}

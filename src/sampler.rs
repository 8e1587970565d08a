//! Sampler
//!
//! Subsampling of training rows before fitting each tree, and the per-node
//! candidate variable draw.
use rand::rngs::StdRng;

// A sampler can be used to subset the data prior to fitting a new tree.
pub trait Sampler {
    /// Sample the data, returning a tuple, where the first item is the samples
    /// chosen for training, and the second are the samples excluded.
    fn sample(&mut self, rng: &mut StdRng, index: &[usize]) -> (Vec<usize>, Vec<usize>);
}

/// Draws `ceil(sample_fraction * n)` rows without replacement for each
/// tree; the complement becomes the tree's out-of-bag set.
pub struct RandomSampler {
    sample_fraction: f64,
}

impl RandomSampler {
    pub fn new(sample_fraction: f64) -> Self {
        RandomSampler { sample_fraction }
    }
}

impl Sampler for RandomSampler {
    fn sample(&mut self, rng: &mut StdRng, index: &[usize]) -> (Vec<usize>, Vec<usize>) {
        let n = index.len();
        let amount = ((n as f64 * self.sample_fraction).ceil() as usize).min(n);
        let mut in_bag = vec![false; n];
        for i in rand::seq::index::sample(rng, n, amount) {
            in_bag[i] = true;
        }
        let mut chosen = Vec::with_capacity(amount);
        let mut excluded = Vec::with_capacity(n - amount);
        for (i, &sample) in index.iter().enumerate() {
            if in_bag[i] {
                chosen.push(sample);
            } else {
                excluded.push(sample)
            }
        }
        (chosen, excluded)
    }
}

/// Draw `mtry` distinct candidate split variables for one node.
pub fn draw_candidate_variables(rng: &mut StdRng, num_variables: usize, mtry: usize) -> Vec<usize> {
    let amount = mtry.min(num_variables);
    rand::seq::index::sample(rng, num_variables, amount).into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_random_sampler() {
        let mut rng = StdRng::seed_from_u64(42);
        let index = vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        let mut sampler = RandomSampler::new(0.5);
        let (chosen, excluded) = sampler.sample(&mut rng, &index);

        assert_eq!(chosen.len(), 5);
        assert_eq!(excluded.len(), 5);

        // In-bag and out-of-bag sets are disjoint and cover the index.
        let mut all: Vec<usize> = chosen.iter().chain(excluded.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, index);

        // Test with sample_fraction 1.0 (all should be chosen)
        let mut sampler_all = RandomSampler::new(1.0);
        let (chosen_all, excluded_all) = sampler_all.sample(&mut rng, &index);
        assert_eq!(chosen_all.len(), index.len());
        assert!(excluded_all.is_empty());
    }

    #[test]
    fn test_sampler_rounds_up() {
        let mut rng = StdRng::seed_from_u64(7);
        let index = vec![0, 1, 2];
        let mut sampler = RandomSampler::new(0.5);
        let (chosen, _) = sampler.sample(&mut rng, &index);
        assert_eq!(chosen.len(), 2);
    }

    #[test]
    fn test_draw_candidate_variables() {
        let mut rng = StdRng::seed_from_u64(42);
        let vars = draw_candidate_variables(&mut rng, 10, 3);
        assert_eq!(vars.len(), 3);
        assert!(vars.iter().all(|&v| v < 10));

        // Requesting more than available caps at the variable count.
        let all = draw_candidate_variables(&mut rng, 4, 8);
        let mut sorted = all.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted, vec![0, 1, 2, 3]);
    }
}

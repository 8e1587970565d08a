use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mvforest::data::Matrix;
use mvforest::dataset::Dataset;
use mvforest::dispersion::DispersionMatrix;
use mvforest::splitter::DispersionSplitter;
use mvforest::tree::Tree;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn split_benchmarks(c: &mut Criterion) {
    let rows = 1_000;
    let cols = 10;
    let num_outcomes = 2;
    let mut rng = StdRng::seed_from_u64(0);

    let feature_data: Vec<f64> = (0..rows * cols).map(|_| rng.gen::<f64>()).collect();
    let response_data: Vec<f64> = (0..rows * num_outcomes).map(|_| rng.gen::<f64>()).collect();

    let features = Matrix::new(&feature_data, rows, cols);
    let responses = Matrix::new(&response_data, rows, num_outcomes);
    let dataset = Dataset::new(&features);
    let sigma = DispersionMatrix::new(vec![1.0, 0.5, 0.5, 1.0], num_outcomes).unwrap();

    let max_num_unique_values = dataset.max_num_unique_values();
    let candidate_vars: Vec<usize> = (0..cols).collect();

    // A mid-sized node, as produced a few levels into a tree.
    let samples: Vec<Vec<usize>> = vec![(0..500).collect()];

    c.bench_function("find_best_split 500x10", |b| {
        let mut splitter = DispersionSplitter::new(max_num_unique_values, 0.05, 0.0, &sigma).unwrap();
        let mut split_vars = vec![0_usize];
        let mut split_values = vec![0.0_f64];
        b.iter(|| {
            splitter.find_best_split(
                black_box(&dataset),
                black_box(0),
                black_box(&candidate_vars),
                black_box(&responses),
                black_box(&samples),
                black_box(&mut split_vars),
                black_box(&mut split_values),
            )
        })
    });

    c.bench_function("sorted_values_and_samples 500", |b| {
        b.iter(|| dataset.sorted_values_and_samples(black_box(&samples[0]), black_box(3)))
    });

    c.bench_function("tree fit 1k x 10", |b| {
        let mut splitter = DispersionSplitter::new(max_num_unique_values, 0.05, 0.0, &sigma).unwrap();
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(1);
            let mut tree = Tree::new();
            tree.fit(
                black_box(&dataset),
                black_box(&responses),
                black_box((0..rows).collect()),
                &mut splitter,
                4,
                100,
                &mut rng,
            );
            tree
        })
    });
}

criterion_group!(benches, split_benchmarks);
criterion_main!(benches);

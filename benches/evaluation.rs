use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrite_ml::data::Dataset;
use ferrite_ml::ensemble::MeanModel;
use ferrite_ml::loss::SquaredError;
use ferrite_ml::model::{LinearModel, ParametricModel};
use ferrite_ml::objective::ErrorFunction;
use ndarray::{Array1, Array2};
use rand::prelude::*;
use std::sync::Arc;

fn random_model(rng: &mut impl Rng, input_dim: usize, output_dim: usize) -> LinearModel {
    let mut model = LinearModel::new(input_dim, output_dim);
    let theta: Array1<f64> = (0..model.num_parameters())
        .map(|_| rng.gen::<f64>() - 0.5)
        .collect();
    model.set_parameters(&theta).unwrap();
    model
}

fn random_inputs(rng: &mut impl Rng, n_rows: usize, n_cols: usize) -> Array2<f64> {
    Array2::from_shape_fn((n_rows, n_cols), |_| rng.gen::<f64>() * 10.0)
}

fn bench_ensemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("ensemble");
    let mut rng = rand::thread_rng();

    for n_models in [4, 16, 64].iter() {
        let mut ensemble = MeanModel::new(4);
        for _ in 0..*n_models {
            ensemble
                .add_model(random_model(&mut rng, 16, 4), rng.gen::<f64>() + 0.1)
                .unwrap();
        }
        let inputs = random_inputs(&mut rng, 256, 16);

        group.bench_with_input(
            BenchmarkId::new("evaluate", n_models),
            n_models,
            |b, _| b.iter(|| ensemble.evaluate(black_box(&inputs)).unwrap()),
        );
    }

    group.finish();
}

fn bench_objective(c: &mut Criterion) {
    let mut group = c.benchmark_group("objective");
    group.sample_size(30);
    let mut rng = rand::thread_rng();

    for n_rows in [256, 1024, 4096].iter() {
        let inputs = random_inputs(&mut rng, *n_rows, 8);
        let labels = random_inputs(&mut rng, *n_rows, 1);
        let data = Arc::new(Dataset::from_arrays(&inputs, &labels, 64).unwrap());
        let mut objective =
            ErrorFunction::new(data, LinearModel::new(8, 1), SquaredError).unwrap();
        objective.init();
        let theta = objective.propose_starting_point();

        group.bench_with_input(BenchmarkId::new("eval", n_rows), n_rows, |b, _| {
            b.iter(|| objective.eval(black_box(&theta)).unwrap())
        });

        group.bench_with_input(
            BenchmarkId::new("eval_derivative", n_rows),
            n_rows,
            |b, _| b.iter(|| objective.eval_derivative(black_box(&theta)).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_ensemble, bench_objective);
criterion_main!(benches);

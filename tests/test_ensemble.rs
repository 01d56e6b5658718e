//! Integration test: weighted ensemble aggregation end-to-end

use ferrite_ml::ensemble::MeanModel;
use ferrite_ml::error::FerriteError;
use ferrite_ml::model::{EnsembleMember, LinearModel, ParametricModel};
use ndarray::{array, Array1, Array2};
use serde::{Deserialize, Serialize};

/// Classifier voting for class 0 when the first input column is negative,
/// class 1 otherwise
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SignClassifier;

impl EnsembleMember for SignClassifier {
    type Output = Array1<usize>;

    fn eval(&self, inputs: &Array2<f64>) -> ferrite_ml::Result<Self::Output> {
        Ok(inputs
            .rows()
            .into_iter()
            .map(|row| usize::from(row[0] >= 0.0))
            .collect())
    }

    fn input_dim(&self) -> usize {
        1
    }

    fn output_dim(&self) -> usize {
        2
    }
}

/// Classifier always voting for a fixed class
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FixedClassifier {
    class: usize,
}

impl EnsembleMember for FixedClassifier {
    type Output = Array1<usize>;

    fn eval(&self, inputs: &Array2<f64>) -> ferrite_ml::Result<Self::Output> {
        Ok(Array1::from_elem(inputs.nrows(), self.class))
    }

    fn input_dim(&self) -> usize {
        1
    }

    fn output_dim(&self) -> usize {
        2
    }
}

fn linear(slope: f64, intercept: f64) -> LinearModel {
    LinearModel::from_parts(array![[slope]], array![intercept]).unwrap()
}

#[test]
fn test_weighted_mean_matches_hand_computation() {
    let mut ensemble = MeanModel::new(1);
    ensemble.add_model(linear(1.0, 0.0), 1.0).unwrap();
    ensemble.add_model(linear(2.0, 1.0), 2.5).unwrap();
    ensemble.add_model(linear(-1.0, 4.0), 0.5).unwrap();

    let inputs = array![[1.0], [3.0], [-2.0]];
    let outputs = ensemble.evaluate(&inputs).unwrap();

    let weight_sum = 4.0;
    for (sample, row) in inputs.rows().into_iter().enumerate() {
        let x = row[0];
        let expected = (1.0 * x + 2.5 * (2.0 * x + 1.0) + 0.5 * (4.0 - x)) / weight_sum;
        assert!(
            (outputs[[sample, 0]] - expected).abs() < 1e-12,
            "sample {}: {} vs {}",
            sample,
            outputs[[sample, 0]],
            expected
        );
    }
}

#[test]
fn test_single_member_is_identity() {
    let model = linear(3.0, -1.0);
    let mut ensemble = MeanModel::new(1);
    ensemble.add_model(model.clone(), 1.0).unwrap();

    let inputs = array![[0.5], [2.0], [-4.0]];
    let outputs = ensemble.evaluate(&inputs).unwrap();
    assert_eq!(outputs, model.predict(&inputs).unwrap());
}

#[test]
fn test_vote_aggregation() {
    let mut ensemble = MeanModel::new(2);
    ensemble.add_model(SignClassifier, 2.0).unwrap();
    ensemble.add_model(SignClassifier, 1.0).unwrap();

    let outputs = ensemble.evaluate(&array![[-1.0], [1.0]]).unwrap();
    assert_eq!(outputs, array![[1.0, 0.0], [0.0, 1.0]]);
}

#[test]
fn test_vote_rows_sum_to_one() {
    let mut ensemble = MeanModel::new(2);
    ensemble.add_model(FixedClassifier { class: 0 }, 0.3).unwrap();
    ensemble.add_model(FixedClassifier { class: 1 }, 1.7).unwrap();
    ensemble.add_model(FixedClassifier { class: 1 }, 2.0).unwrap();

    let outputs = ensemble.evaluate(&Array2::zeros((4, 1))).unwrap();
    for row in outputs.rows() {
        assert!((row.sum() - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_weight_sum_tracks_operation_sequence() {
    let mut ensemble = MeanModel::new(1);
    ensemble.add_model(linear(1.0, 0.0), 1.0).unwrap();
    ensemble.add_model(linear(2.0, 0.0), 2.0).unwrap();
    ensemble.set_weight(0, 0.5).unwrap();
    ensemble.add_model(linear(3.0, 0.0), 4.0).unwrap();
    assert!((ensemble.weight_sum() - 6.5).abs() < 1e-12);

    // failed operations leave the sum unchanged
    assert!(ensemble.add_model(linear(0.0, 0.0), -1.0).is_err());
    assert!(ensemble.set_weight(1, 0.0).is_err());
    assert!((ensemble.weight_sum() - 6.5).abs() < 1e-12);

    ensemble.clear_models();
    assert_eq!(ensemble.num_models(), 0);
    assert_eq!(ensemble.weight_sum(), 0.0);
}

#[test]
fn test_empty_ensemble_cannot_evaluate() {
    let ensemble: MeanModel<LinearModel> = MeanModel::new(1);
    let result = ensemble.evaluate(&array![[1.0]]);
    assert!(matches!(result, Err(FerriteError::ValidationError(_))));
}

#[test]
fn test_persistence_round_trip() {
    let mut ensemble = MeanModel::new(1);
    ensemble.add_model(linear(1.0, 0.5), 1.0).unwrap();
    ensemble.add_model(linear(-2.0, 0.0), 3.0).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mean_model.json");
    ensemble.save(&path).unwrap();

    let restored: MeanModel<LinearModel> = MeanModel::load(&path).unwrap();
    assert_eq!(restored.num_models(), 2);
    assert_eq!(restored.output_size(), 1);

    let inputs = array![[1.0], [2.0]];
    assert_eq!(
        restored.evaluate(&inputs).unwrap(),
        ensemble.evaluate(&inputs).unwrap()
    );
}

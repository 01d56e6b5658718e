//! Parameter regularizers

use ndarray::Array1;

/// Auxiliary objective added to an error function to penalize parameter
/// configurations.
///
/// Regularizers are stateless and shared by reference between copies of an
/// error function.
pub trait Regularizer: Send + Sync {
    /// Penalty value at `theta`
    fn eval(&self, theta: &Array1<f64>) -> f64;

    /// Penalty value at `theta`; fills `gradient` with the penalty's own
    /// gradient (unscaled — the error function applies the strength factor)
    fn eval_derivative(&self, theta: &Array1<f64>, gradient: &mut Array1<f64>) -> f64;
}

/// Squared two-norm penalty `|theta|^2`
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoNorm;

impl Regularizer for TwoNorm {
    fn eval(&self, theta: &Array1<f64>) -> f64 {
        theta.dot(theta)
    }

    fn eval_derivative(&self, theta: &Array1<f64>, gradient: &mut Array1<f64>) -> f64 {
        gradient.assign(&(theta * 2.0));
        theta.dot(theta)
    }
}

/// One-norm penalty `sum |theta_i|`, with subgradient 0 at the kinks
#[derive(Debug, Clone, Copy, Default)]
pub struct OneNorm;

impl Regularizer for OneNorm {
    fn eval(&self, theta: &Array1<f64>) -> f64 {
        theta.iter().map(|v| v.abs()).sum()
    }

    fn eval_derivative(&self, theta: &Array1<f64>, gradient: &mut Array1<f64>) -> f64 {
        gradient.assign(&theta.mapv(f64::signum));
        for (g, &t) in gradient.iter_mut().zip(theta.iter()) {
            if t == 0.0 {
                *g = 0.0;
            }
        }
        theta.iter().map(|v| v.abs()).sum()
    }
}

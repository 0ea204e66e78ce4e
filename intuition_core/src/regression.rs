//! Ordinary least-squares regression.
//!
//! Solves `X * beta = y` through the SVD pseudo-inverse, which returns the
//! minimum-norm solution when the design matrix is rank deficient. The
//! sequence-shape features are collinear by construction (the first-trial
//! indicators sum to one, the counts sum to the sequence length), so a
//! normal-equations solve would fail on real experiment data.

use crate::error::ModelError;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Fitted linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionFit {
    /// One weight per feature column, in column order
    pub coefficients: Vec<f64>,

    /// Constant term, when fitted
    pub intercept: Option<f64>,

    /// Residual standard error: sqrt(SSE / (n - k))
    pub std_error: f64,
}

/// Least-squares estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearRegression {
    fit_intercept: bool,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self { fit_intercept: true }
    }
}

impl LinearRegression {
    pub fn new(fit_intercept: bool) -> Self {
        Self { fit_intercept }
    }

    pub fn fits_intercept(&self) -> bool {
        self.fit_intercept
    }

    /// Fits from row-major feature rows.
    pub fn fit_rows(
        &self,
        rows: &[Vec<f64>],
        response: &[f64],
    ) -> Result<RegressionFit, ModelError> {
        let n = rows.len();
        let p = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != p) {
            return Err(ModelError::regression("feature rows have different lengths"));
        }

        let x = DMatrix::from_fn(n, p, |i, j| rows[i][j]);
        let y = DVector::from_column_slice(response);
        self.fit(&x, &y)
    }

    /// Fits `y ~ x`.
    pub fn fit(&self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<RegressionFit, ModelError> {
        let (n, p) = x.shape();
        if n != y.len() {
            return Err(ModelError::regression(format!(
                "design matrix has {} rows but response has {} values",
                n,
                y.len()
            )));
        }
        if p == 0 {
            return Err(ModelError::regression("design matrix has no columns"));
        }

        let design = if self.fit_intercept {
            x.clone().insert_column(p, 1.0)
        } else {
            x.clone()
        };
        let k = design.ncols();
        if n <= k {
            return Err(ModelError::regression(format!(
                "need more than {} observations for {} fitted columns, got {}",
                k, k, n
            )));
        }

        let svd = design.clone().svd(true, true);
        let largest = svd.singular_values.max();
        let tolerance = f64::EPSILON * (n.max(k) as f64) * largest.max(f64::MIN_POSITIVE);
        let beta = svd.solve(y, tolerance).map_err(ModelError::regression)?;

        let residuals = y - &design * &beta;
        let sse = residuals.norm_squared();
        let std_error = (sse / (n - k) as f64).sqrt();

        let coefficients = beta.iter().take(p).copied().collect();
        let intercept = self.fit_intercept.then(|| beta[p]);

        Ok(RegressionFit {
            coefficients,
            intercept,
            std_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TRUE_WEIGHTS: [f64; 6] = [0.12, -0.3, 0.45, 0.05, 0.015, -0.04];

    /// Full rank with or without an intercept column.
    fn synthetic_rows() -> Vec<Vec<f64>> {
        let mut rows: Vec<Vec<f64>> = (0..6)
            .map(|i| (0..6).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();
        rows.push(vec![0.0; 6]);
        rows.push(vec![1.0, 0.0, 1.0, 2.0, 0.0, 1.0]);
        rows.push(vec![0.0, 1.0, 0.0, 1.0, 3.0, 0.0]);
        rows.push(vec![1.0, 1.0, 0.0, 0.0, 1.0, 2.0]);
        rows.push(vec![0.0, 0.0, 1.0, 3.0, 1.0, 1.0]);
        rows.push(vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        rows
    }

    fn respond(rows: &[Vec<f64>], weights: &[f64], offset: f64) -> Vec<f64> {
        rows.iter()
            .map(|r| r.iter().zip(weights).map(|(x, w)| x * w).sum::<f64>() + offset)
            .collect()
    }

    #[test]
    fn test_recovers_known_weights_without_intercept() {
        let rows = synthetic_rows();
        let y = respond(&rows, &TRUE_WEIGHTS, 0.0);

        let fit = LinearRegression::new(false).fit_rows(&rows, &y).unwrap();

        assert!(fit.intercept.is_none());
        for (got, want) in fit.coefficients.iter().zip(TRUE_WEIGHTS.iter()) {
            assert_relative_eq!(*got, *want, epsilon = 1e-9);
        }
        assert!(fit.std_error < 1e-9);
    }

    #[test]
    fn test_recovers_known_weights_with_intercept() {
        let rows = synthetic_rows();
        let y = respond(&rows, &TRUE_WEIGHTS, 0.25);

        let fit = LinearRegression::default().fit_rows(&rows, &y).unwrap();

        assert_relative_eq!(fit.intercept.unwrap(), 0.25, epsilon = 1e-9);
        for (got, want) in fit.coefficients.iter().zip(TRUE_WEIGHTS.iter()) {
            assert_relative_eq!(*got, *want, epsilon = 1e-9);
        }
        assert!(fit.std_error < 1e-9);
    }

    #[test]
    fn test_collinear_features_still_fit() {
        // Shape features of length-5 sequences: one-hot first trial plus counts
        let rows = vec![
            vec![1.0, 0.0, 0.0, 2.0, 2.0, 1.0],
            vec![0.0, 1.0, 0.0, 1.0, 3.0, 1.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 5.0],
            vec![1.0, 0.0, 0.0, 5.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0, 0.0, 4.0, 1.0],
            vec![0.0, 0.0, 1.0, 1.0, 1.0, 3.0],
            vec![1.0, 0.0, 0.0, 3.0, 1.0, 1.0],
            vec![0.0, 0.0, 1.0, 2.0, 0.0, 3.0],
            vec![0.0, 1.0, 0.0, 2.0, 2.0, 1.0],
            vec![1.0, 0.0, 0.0, 1.0, 1.0, 3.0],
        ];
        let y = respond(&rows, &TRUE_WEIGHTS, 0.1);

        let fit = LinearRegression::default().fit_rows(&rows, &y).unwrap();

        // Weights are not unique, but predictions must be exact
        let fitted = respond(&rows, &fit.coefficients, fit.intercept.unwrap_or(0.0));
        for (got, target) in fitted.iter().zip(y.iter()) {
            assert_relative_eq!(*got, *target, epsilon = 1e-9);
        }
        assert!(fit.std_error < 1e-9);
        assert!(fit.coefficients.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_std_error_of_noisy_fit() {
        // y = x + noise on a single feature, no intercept
        let rows: Vec<Vec<f64>> = (1..=4).map(|i| vec![i as f64]).collect();
        let y = vec![1.0, 2.5, 2.5, 4.0];

        let fit = LinearRegression::new(false).fit_rows(&rows, &y).unwrap();

        // beta = sum(xy) / sum(xx) = 29.5 / 30
        let beta = 29.5 / 30.0;
        assert_relative_eq!(fit.coefficients[0], beta, epsilon = 1e-12);

        let sse: f64 = rows
            .iter()
            .zip(y.iter())
            .map(|(r, t)| (t - beta * r[0]).powi(2))
            .sum();
        assert_relative_eq!(fit.std_error, (sse / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_underdetermined() {
        let rows = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let err = LinearRegression::default().fit_rows(&rows, &[0.5, 0.5]).unwrap_err();
        assert!(matches!(err, ModelError::Regression(_)));
    }

    #[test]
    fn test_rejects_mismatched_response() {
        let rows = vec![vec![1.0]; 5];
        assert!(LinearRegression::new(false).fit_rows(&rows, &[1.0; 4]).is_err());
    }
}

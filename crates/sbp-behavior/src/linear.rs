//! Linear predictors loaded from JSON coefficient files.
//!
//! # File format
//!
//! ```json
//! { "intercept": -2.1, "coefficients": [0.8, -0.02, 1.4] }
//! ```
//!
//! Coefficients are in the same order as the model's feature list.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::{BehaviorResult, Classifier, Regressor};

#[derive(Clone, Debug, Deserialize, PartialEq)]
struct LinearModel {
    intercept:    f64,
    coefficients: Vec<f64>,
}

impl LinearModel {
    #[inline]
    fn score(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

// ── LinearClassifier ──────────────────────────────────────────────────────────

/// Logistic-regression classifier: `p = 1 / (1 + e^-(b + w·x))`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearClassifier(LinearModel);

impl LinearClassifier {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self(LinearModel { intercept, coefficients })
    }

    pub fn from_reader<R: Read>(reader: R) -> BehaviorResult<Self> {
        Ok(Self(serde_json::from_reader(reader)?))
    }

    pub fn from_path(path: &Path) -> BehaviorResult<Self> {
        let file = std::fs::File::open(path).map_err(serde_json::Error::io)?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}

impl Classifier for LinearClassifier {
    fn predict_probability(&self, features: &[f64]) -> f64 {
        1.0 / (1.0 + (-self.0.score(features)).exp())
    }

    fn input_dimension(&self) -> Option<usize> {
        Some(self.0.coefficients.len())
    }
}

// ── LinearRegressor ───────────────────────────────────────────────────────────

/// Ordinary linear regressor: `f = b + w·x`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearRegressor(LinearModel);

impl LinearRegressor {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self(LinearModel { intercept, coefficients })
    }

    pub fn from_reader<R: Read>(reader: R) -> BehaviorResult<Self> {
        Ok(Self(serde_json::from_reader(reader)?))
    }

    pub fn from_path(path: &Path) -> BehaviorResult<Self> {
        let file = std::fs::File::open(path).map_err(serde_json::Error::io)?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}

impl Regressor for LinearRegressor {
    fn predict(&self, features: &[f64]) -> f64 {
        self.0.score(features)
    }

    fn input_dimension(&self) -> Option<usize> {
        Some(self.0.coefficients.len())
    }
}

//! Constant predictors and draws.
//!
//! Useful as placeholders in tests and smoke runs where the real models are
//! not at hand.

use sbp_core::UniformSource;

use crate::{Classifier, Regressor};

/// A [`Classifier`] that returns the same probability for every input.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FixedProbability(pub f64);

impl Classifier for FixedProbability {
    fn predict_probability(&self, _features: &[f64]) -> f64 {
        self.0
    }
}

/// A [`Regressor`] that returns the same fraction for every input.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FixedFraction(pub f64);

impl Regressor for FixedFraction {
    fn predict(&self, _features: &[f64]) -> f64 {
        self.0
    }
}

/// A [`UniformSource`] that always draws the same value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FixedDraw(pub f64);

impl UniformSource for FixedDraw {
    fn next_uniform(&mut self) -> f64 {
        self.0
    }
}

//! Traits for the pre-fitted adoption models.

use crate::{BehaviorError, BehaviorResult};

/// Pre-fitted binary adopt / no-adopt classifier.
///
/// # Thread safety
///
/// The compute phase may call predictors for many municipalities in
/// parallel, so implementations must be `Send + Sync` and deterministic for
/// a given input.
pub trait Classifier: Send + Sync + 'static {
    /// Probability of the positive (adopt) class for one feature vector.
    fn predict_probability(&self, features: &[f64]) -> f64;

    /// Number of features the model was fitted on, if known.
    fn input_dimension(&self) -> Option<usize> {
        None
    }
}

/// Pre-fitted regressor of the adopted area fraction.
///
/// Predictions may be negative; the decision procedure treats those as no
/// adoption.
pub trait Regressor: Send + Sync + 'static {
    fn predict(&self, features: &[f64]) -> f64;

    /// Number of features the model was fitted on, if known.
    fn input_dimension(&self) -> Option<usize> {
        None
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn predict_probability(&self, features: &[f64]) -> f64 {
        (**self).predict_probability(features)
    }

    fn input_dimension(&self) -> Option<usize> {
        (**self).input_dimension()
    }
}

impl<R: Regressor + ?Sized> Regressor for Box<R> {
    fn predict(&self, features: &[f64]) -> f64 {
        (**self).predict(features)
    }

    fn input_dimension(&self) -> Option<usize> {
        (**self).input_dimension()
    }
}

/// Both predictors together with the ordered feature names each one
/// expects.
pub struct AdoptionModels<C: Classifier, R: Regressor> {
    pub classifier:          C,
    pub classifier_features: Vec<String>,
    pub regressor:           R,
    pub regressor_features:  Vec<String>,
}

impl<C: Classifier, R: Regressor> AdoptionModels<C, R> {
    /// Bundle the predictors with their feature lists.
    ///
    /// Fails if a predictor reports an input dimension different from the
    /// length of its feature list.
    pub fn new(
        classifier:          C,
        classifier_features: Vec<String>,
        regressor:           R,
        regressor_features:  Vec<String>,
    ) -> BehaviorResult<Self> {
        check_dimension("classifier", classifier.input_dimension(), &classifier_features)?;
        check_dimension("regressor", regressor.input_dimension(), &regressor_features)?;
        Ok(Self { classifier, classifier_features, regressor, regressor_features })
    }
}

fn check_dimension(what: &str, dimension: Option<usize>, features: &[String]) -> BehaviorResult<()> {
    match dimension {
        Some(n) if n != features.len() => Err(BehaviorError::Model(format!(
            "{what} expects {n} features but its feature list names {}",
            features.len()
        ))),
        _ => Ok(()),
    }
}

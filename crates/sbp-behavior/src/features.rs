//! Feature assembly: turn municipality state into the ordered vector a
//! predictor expects.
//!
//! # Merge order
//!
//! Values are collected from the sources in [`FeatureSource::MERGE_ORDER`].
//! A later source overrides an earlier one for the same name, so for a name
//! present in both the census and the soil table the soil value wins.
//! Non-finite source values never override.
//!
//! Only requested names are collected, and the output follows the request
//! order.

use sbp_agent::Municipality;
use sbp_core::FeatureMap;
use sbp_core::features::{MUNICIPAL_CUMULATIVE_ADOPTION, NATIONAL_CUMULATIVE_ADOPTION, PAYMENT};

use crate::{BehaviorError, BehaviorResult, DecisionContext};

/// Which predictor a vector is assembled for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EstimatorKind {
    Classification,
    Regression,
}

/// One origin of feature values.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FeatureSource {
    /// National cumulative adoption fraction, previous year.
    NationalAdoption,
    /// Municipal cumulative adoption fraction, previous year.
    MunicipalAdoption,
    /// Census covariates for `year - 1`.
    Census,
    /// Effective payment for `year`.  Regression only.
    Payment,
    /// Static climate averages.
    Climate,
    /// Static soil properties.
    Soil,
}

impl FeatureSource {
    /// Application order; later entries override earlier ones.
    pub const MERGE_ORDER: [FeatureSource; 6] = [
        FeatureSource::NationalAdoption,
        FeatureSource::MunicipalAdoption,
        FeatureSource::Census,
        FeatureSource::Payment,
        FeatureSource::Climate,
        FeatureSource::Soil,
    ];

    /// `true` if this source contributes to vectors for `kind`.
    #[inline]
    pub fn applies_to(self, kind: EstimatorKind) -> bool {
        match self {
            FeatureSource::Payment => kind == EstimatorKind::Regression,
            _ => true,
        }
    }
}

/// Build the feature vector named by `names` for `municipality` in
/// `ctx.year`.
///
/// Fails with [`BehaviorError::MissingFeature`] listing every name that has
/// no finite value after all sources are merged, and propagates
/// [`BehaviorError::PaymentNotAvailable`] from the payment lookup.
pub fn assemble_features(
    municipality: &Municipality,
    ctx:          &DecisionContext<'_>,
    kind:         EstimatorKind,
    names:        &[String],
) -> BehaviorResult<Vec<f64>> {
    let mut slots: Vec<Option<f64>> = vec![None; names.len()];
    let environment = ctx.environments.get(&municipality.name);

    for source in FeatureSource::MERGE_ORDER {
        if !source.applies_to(kind) {
            continue;
        }
        match source {
            FeatureSource::NationalAdoption => {
                fill_one(names, &mut slots, NATIONAL_CUMULATIVE_ADOPTION, ctx.national_fraction);
            }
            FeatureSource::MunicipalAdoption => {
                fill_one(
                    names,
                    &mut slots,
                    MUNICIPAL_CUMULATIVE_ADOPTION,
                    municipality.cumulative_fraction,
                );
            }
            FeatureSource::Census => {
                if let Some(row) = municipality.census_for(ctx.year.previous()) {
                    fill_map(names, &mut slots, row);
                }
            }
            FeatureSource::Payment => {
                let payment = ctx.payments.get(ctx.year, &municipality.name)?;
                fill_one(names, &mut slots, PAYMENT, payment);
            }
            FeatureSource::Climate => {
                if let Some(env) = environment {
                    fill_map(names, &mut slots, &env.climate);
                }
            }
            FeatureSource::Soil => {
                if let Some(env) = environment {
                    fill_map(names, &mut slots, &env.soil);
                }
            }
        }
    }

    let missing: Vec<String> = names
        .iter()
        .zip(&slots)
        .filter(|(_, slot)| slot.is_none())
        .map(|(name, _)| name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(BehaviorError::MissingFeature {
            municipality: municipality.name.clone(),
            year:         ctx.year,
            names:        missing,
        });
    }

    Ok(slots.into_iter().flatten().collect())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn fill_one(names: &[String], slots: &mut [Option<f64>], name: &str, value: f64) {
    if !value.is_finite() {
        return;
    }
    for (slot_name, slot) in names.iter().zip(slots.iter_mut()) {
        if slot_name == name {
            *slot = Some(value);
        }
    }
}

fn fill_map(names: &[String], slots: &mut [Option<f64>], source: &FeatureMap) {
    for (name, slot) in names.iter().zip(slots.iter_mut()) {
        if let Some(&value) = source.get(name) {
            if value.is_finite() {
                *slot = Some(value);
            }
        }
    }
}

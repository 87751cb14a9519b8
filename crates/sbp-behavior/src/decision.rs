//! The per-year adoption decision of one municipality.
//!
//! ```text
//! Blocked ──────────────────────────────────────────────► staged 0
//!    ▲  no pastures this/last year, or already saturated
//!    │
//! start ─► Evaluating ─► p = classifier(x_clsf), u = draw
//!                          │ u ≥ p ──► NotAdopted ───────► staged 0
//!                          │ u < p ──► f = regressor(x_regr)
//!                          │             f < 0 ──────────► Adopted(Negative), staged 0
//!                          │             over capacity ──► Adopted(Capacity), staged = room left
//!                          │             otherwise ──────► Adopted(None), staged f
//! ```

use sbp_agent::{Municipality, StagedAdoption};
use sbp_core::UniformSource;

use crate::{
    AdoptionModels, BehaviorError, BehaviorResult, Classifier, DecisionContext, EstimatorKind,
    Regressor, assemble_features,
};

/// Why a municipality skipped evaluation this year.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockReason {
    /// No pastures area in the current year.
    NoPastures,
    /// No pastures area in the previous year.
    NoPasturesPreviousYear,
    /// Cumulative adoption already covers the available area.
    Saturated,
}

/// How a positive regression result was bounded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AdoptionClamp {
    None,
    /// Negative prediction; nothing adopted.
    Negative,
    /// Cut down to the area still available.
    Capacity,
}

/// Terminal state of the decision for one year.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Blocked(BlockReason),
    NotAdopted,
    Adopted(AdoptionClamp),
}

/// Result of [`decide`]: what to stage, plus the intermediate values for
/// logging.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Decision {
    pub outcome:     Outcome,
    pub staged:      StagedAdoption,
    /// Classifier output, if the classifier was called.
    pub probability: Option<f64>,
    /// Uniform draw, if one was taken.
    pub draw:        Option<f64>,
    /// Raw regressor output, if the regressor was called.
    pub prediction:  Option<f64>,
}

impl Decision {
    fn blocked(reason: BlockReason) -> Self {
        Self {
            outcome:     Outcome::Blocked(reason),
            staged:      StagedAdoption::NONE,
            probability: None,
            draw:        None,
            prediction:  None,
        }
    }

    /// `true` if the outcome is `Adopted` with a non-zero area.
    pub fn has_adoption(&self) -> bool {
        matches!(self.outcome, Outcome::Adopted(_)) && self.staged.hectares > 0.0
    }
}

/// Run the decision procedure for `municipality` in `ctx.year`.
///
/// Reads only committed state.  Draws at most one value from `rng`, and
/// none when the municipality is blocked.
pub fn decide<C, R, U>(
    municipality: &Municipality,
    ctx:          &DecisionContext<'_>,
    models:       &AdoptionModels<C, R>,
    rng:          &mut U,
) -> BehaviorResult<Decision>
where
    C: Classifier,
    R: Regressor,
    U: UniformSource + ?Sized,
{
    let year = ctx.year;
    let pastures = |y| {
        municipality
            .pastures_in(y)
            .ok_or_else(|| BehaviorError::PasturesUnavailable {
                municipality: municipality.name.clone(),
                year:         y,
            })
    };
    let available = pastures(year)?;
    let previous = pastures(year.previous())?;

    // ── Blocked ───────────────────────────────────────────────────────────
    if available == 0.0 {
        return Ok(Decision::blocked(BlockReason::NoPastures));
    }
    if previous == 0.0 {
        return Ok(Decision::blocked(BlockReason::NoPasturesPreviousYear));
    }
    if municipality.cumulative_hectares >= available {
        return Ok(Decision::blocked(BlockReason::Saturated));
    }

    // ── Classification ────────────────────────────────────────────────────
    let x = assemble_features(
        municipality,
        ctx,
        EstimatorKind::Classification,
        &models.classifier_features,
    )?;
    let probability = models.classifier.predict_probability(&x);
    check_finite(municipality, ctx, "classifier", probability)?;

    let draw = rng.next_uniform();
    if draw >= probability {
        return Ok(Decision {
            outcome:     Outcome::NotAdopted,
            staged:      StagedAdoption::NONE,
            probability: Some(probability),
            draw:        Some(draw),
            prediction:  None,
        });
    }

    // ── Regression ────────────────────────────────────────────────────────
    let x = assemble_features(
        municipality,
        ctx,
        EstimatorKind::Regression,
        &models.regressor_features,
    )?;
    let fraction = models.regressor.predict(&x);
    check_finite(municipality, ctx, "regressor", fraction)?;

    let hectares = fraction * municipality.reference_area;
    let (clamp, staged) = if fraction < 0.0 {
        (AdoptionClamp::Negative, StagedAdoption::NONE)
    } else if municipality.cumulative_hectares + hectares > available {
        let room = available - municipality.cumulative_hectares;
        (
            AdoptionClamp::Capacity,
            StagedAdoption {
                fraction: room / municipality.reference_area,
                hectares: room,
                capacity: Some(available),
            },
        )
    } else {
        (AdoptionClamp::None, StagedAdoption { fraction, hectares, capacity: None })
    };

    Ok(Decision {
        outcome:     Outcome::Adopted(clamp),
        staged,
        probability: Some(probability),
        draw:        Some(draw),
        prediction:  Some(fraction),
    })
}

fn check_finite(
    municipality: &Municipality,
    ctx:          &DecisionContext<'_>,
    what:         &'static str,
    value:        f64,
) -> BehaviorResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(BehaviorError::InvalidPrediction {
            municipality: municipality.name.clone(),
            year:         ctx.year,
            what,
            value,
        })
    }
}

//! The `Sim` struct and its year loop.

use sbp_agent::{EnvironmentTable, MunicipalityRngs, MunicipalityStore};
use sbp_behavior::{
    AdoptionModels, BehaviorResult, Classifier, Decision, DecisionContext, Outcome,
    PaymentSchedule, Regressor, decide,
};
use sbp_core::{RngStrategy, SimClock, SimConfig, SimRng, Year};
use tracing::{debug, info};

use crate::{NationalAggregate, SimError, SimObserver, SimResult, YearSnapshot, YearSummary};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<C, R>` holds all simulation state and drives the two-phase year
/// step:
///
/// 1. **Compute phase** (optionally parallel with the `parallel` feature and
///    [`RngStrategy::PerMunicipality`]): call [`decide`] for every
///    municipality against the committed state of previous years.
/// 2. **Commit phase** (sequential, ascending `MunicipalityId`): stage each
///    decision, commit every municipality into its ledger and the national
///    staged total, then commit the national aggregate.
///
/// If any decision fails, the step returns the error before anything is
/// staged and the clock does not advance.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<C: Classifier, R: Regressor> {
    /// Global configuration (start year, total years, seed, …).
    pub config: SimConfig,

    /// Simulation clock; `current_year` is the next year to simulate.
    pub clock: SimClock,

    /// Municipality ledgers in ID order.
    pub municipalities: MunicipalityStore,

    /// Per-municipality RNGs, separated for the split-borrow pattern.
    pub rngs: MunicipalityRngs,

    /// National totals.
    pub national: NationalAggregate,

    pub environments: EnvironmentTable,

    pub payments: PaymentSchedule,

    /// The classifier and regressor with their feature lists.
    pub models: AdoptionModels<C, R>,

    /// Stream for [`RngStrategy::Shared`].
    pub(crate) shared_rng: SimRng,

    #[cfg(feature = "parallel")]
    pub(crate) pool: Option<rayon::ThreadPool>,
}

impl<C: Classifier, R: Regressor> Sim<C, R> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current year to `config.end_year()`.
    ///
    /// When called on a fresh simulation, the observer first receives the
    /// baseline snapshot of the year before the start year.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        if self.clock.years_elapsed() == 0 {
            observer.on_sim_start(&self.snapshot());
        }
        while self.clock.current_year < self.config.end_year() {
            self.step_observed(observer)?;
        }
        observer.on_sim_end(self.clock.previous_year());
        Ok(())
    }

    /// Run exactly `n` years from the current position (ignores `end_year`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_years<O: SimObserver>(&mut self, n: u16, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step_observed(observer)?;
        }
        Ok(())
    }

    /// Simulate `clock.current_year`: compute, commit, advance.
    pub fn step(&mut self) -> SimResult<YearSummary> {
        let year = self.clock.current_year;

        // ── Compute phase ─────────────────────────────────────────────────
        let decisions = self.compute_decisions(year)?;

        // ── Commit phase ──────────────────────────────────────────────────
        //
        // Ascending MunicipalityId order, so results do not depend on how
        // the compute phase was scheduled.
        let mut summary = YearSummary { year, ..YearSummary::default() };
        for (m, decision) in self.municipalities.iter_mut().zip(&decisions) {
            m.stage(decision.staged)?;
        }
        for (m, decision) in self.municipalities.iter_mut().zip(&decisions) {
            let delta = m.commit(year).ok_or(SimError::Unstaged(m.id))?;
            self.national.stage(delta);

            match decision.outcome {
                Outcome::Blocked(_) => summary.blocked += 1,
                Outcome::NotAdopted => summary.not_adopted += 1,
                Outcome::Adopted(_) => summary.adopted += 1,
            }
            debug!(
                %year,
                municipality = %m.name,
                outcome = ?decision.outcome,
                probability = ?decision.probability,
                hectares = delta,
                "decision committed"
            );
        }
        summary.yearly_hectares = self.national.commit(year);
        summary.cumulative_hectares = self.national.cumulative_hectares;
        summary.cumulative_fraction = self.national.cumulative_fraction;

        info!(
            %year,
            adopted = summary.adopted,
            blocked = summary.blocked,
            yearly_ha = summary.yearly_hectares,
            cumulative_ha = summary.cumulative_hectares,
            "year committed"
        );

        self.clock.advance();
        Ok(summary)
    }

    /// Snapshot of the last committed year.
    pub fn snapshot(&self) -> YearSnapshot {
        YearSnapshot::capture(self.clock.previous_year(), &self.municipalities, &self.national)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn step_observed<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<YearSummary> {
        let year = self.clock.current_year;
        observer.on_year_start(year);
        let summary = self.step()?;
        observer.on_year_end(&summary);

        let interval = self.config.output_interval_years;
        if interval > 0 && year.since(self.clock.start_year).is_multiple_of(interval) {
            observer.on_snapshot(&self.snapshot());
        }
        Ok(summary)
    }

    /// Run the decision procedure for every municipality, in ID order.
    ///
    /// Reads only committed state.  With the `parallel` feature and the
    /// per-municipality strategy the calls run on Rayon.
    fn compute_decisions(&mut self, year: Year) -> BehaviorResult<Vec<Decision>> {
        // Explicit field borrows so the borrow checker sees disjoint access.
        let store  = &self.municipalities;
        let models = &self.models;
        let ctx = DecisionContext::new(
            year,
            self.national.cumulative_fraction,
            &self.environments,
            &self.payments,
        );

        match self.config.rng_strategy {
            RngStrategy::Shared => {
                let rng = &mut self.shared_rng;
                store
                    .iter()
                    .map(|m| decide(m, &ctx, models, &mut *rng))
                    .collect()
            }

            #[cfg(not(feature = "parallel"))]
            RngStrategy::PerMunicipality => store
                .iter()
                .zip(self.rngs.inner.iter_mut())
                .map(|(m, rng)| decide(m, &ctx, models, rng))
                .collect(),

            #[cfg(feature = "parallel")]
            RngStrategy::PerMunicipality => {
                use rayon::prelude::*;

                let rngs = &mut self.rngs.inner;
                let mut compute = || {
                    store
                        .as_slice()
                        .par_iter()
                        .zip(rngs.par_iter_mut())
                        .map(|(m, rng)| decide(m, &ctx, models, rng))
                        .collect::<BehaviorResult<Vec<Decision>>>()
                };
                match &self.pool {
                    Some(pool) => pool.install(compute),
                    None       => compute(),
                }
            }
        }
    }
}

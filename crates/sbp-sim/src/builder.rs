//! Fluent builder for constructing a [`Sim`].

use sbp_agent::{EnvironmentTable, MunicipalityRngs, MunicipalityStore};
use sbp_behavior::{AdoptionModels, Classifier, PaymentSchedule, Regressor};
use sbp_core::{SimConfig, SimRng};
use tracing::info;

use crate::{NationalAggregate, Sim, SimError, SimResult};

/// Fluent builder for [`Sim<C, R>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — start year, total years, seed, …
/// - [`MunicipalityStore`] + [`MunicipalityRngs`] — from
///   [`sbp_agent::MunicipalityStoreBuilder`], built with the same start
///   year and reference year as the config
/// - [`EnvironmentTable`] and [`PaymentSchedule`]
/// - [`AdoptionModels<C, R>`] — the predictors and their feature lists
///
/// # Example
///
/// ```rust,ignore
/// let (store, rngs) = MunicipalityStoreBuilder::new(config.start_year, config.seed)
///     .reference_year(config.reference_year)
///     .municipalities(dataset.records)
///     .build()?;
/// let mut sim = SimBuilder::new(config, store, rngs, models)
///     .environments(dataset.environments)
///     .payments(dataset.payments)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<C: Classifier, R: Regressor> {
    config:       SimConfig,
    store:        MunicipalityStore,
    rngs:         MunicipalityRngs,
    environments: EnvironmentTable,
    payments:     PaymentSchedule,
    models:       AdoptionModels<C, R>,
}

impl<C: Classifier, R: Regressor> SimBuilder<C, R> {
    /// Create a builder with an empty environment table and payment
    /// schedule.
    pub fn new(
        config: SimConfig,
        store:  MunicipalityStore,
        rngs:   MunicipalityRngs,
        models: AdoptionModels<C, R>,
    ) -> Self {
        Self {
            config,
            store,
            rngs,
            environments: EnvironmentTable::new(),
            payments:     PaymentSchedule::default(),
            models,
        }
    }

    /// Supply the climate and soil attributes.  Every municipality must
    /// have an entry.
    pub fn environments(mut self, environments: EnvironmentTable) -> Self {
        self.environments = environments;
        self
    }

    pub fn payments(mut self, payments: PaymentSchedule) -> Self {
        self.payments = payments;
        self
    }

    /// Validate inputs, seed the national aggregate and return a
    /// ready-to-run [`Sim`].
    ///
    /// Fails with `InvalidConfiguration` for a bad config, and with
    /// `DataIntegrity` listing every municipality that lacks environment
    /// data or a pastures area for a year the run will read.
    pub fn build(self) -> SimResult<Sim<C, R>> {
        let clock = self.config.make_clock()?;
        let start = self.config.start_year;

        if self.rngs.len() != self.store.len() {
            return Err(SimError::CountMismatch {
                expected: self.store.len(),
                got:      self.rngs.len(),
                what:     "municipality RNGs",
            });
        }
        if self.store.iter().any(|m| m.yearly_hectares.range(start..).next().is_some()) {
            return Err(SimError::Config(format!(
                "the municipality store holds adoption for {start} or later; \
                 build it with the configured start year"
            )));
        }
        if self.store.reference_year() != self.config.reference_year {
            return Err(SimError::Config(format!(
                "the municipality store uses reference year {} but the configuration \
                 names {}",
                self.store.reference_year(),
                self.config.reference_year
            )));
        }

        // ── Data coverage for every year the run reads ────────────────────
        self.environments
            .validate(self.store.iter().map(|m| m.name.as_str()))?;
        self.store
            .check_pastures_coverage(start.previous(), self.config.end_year().previous())?;

        #[cfg(feature = "parallel")]
        let pool = match self.config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SimError::Config(format!("thread pool: {e}")))?,
            ),
            None => None,
        };
        #[cfg(feature = "parallel")]
        {
            if self.config.rng_strategy == sbp_core::RngStrategy::Shared {
                tracing::warn!(
                    "the shared RNG strategy draws in municipality order; \
                     the compute phase runs sequentially"
                );
            }
        }

        let national = NationalAggregate::from_store(&self.store, start);
        info!(
            municipalities = self.store.len(),
            start = %start,
            end = %self.config.end_year(),
            strategy = ?self.config.rng_strategy,
            baseline_ha = national.cumulative_hectares,
            "simulation ready"
        );

        Ok(Sim {
            shared_rng:     SimRng::new(self.config.seed),
            clock,
            config:         self.config,
            municipalities: self.store,
            rngs:           self.rngs,
            national,
            environments:   self.environments,
            payments:       self.payments,
            models:         self.models,
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}

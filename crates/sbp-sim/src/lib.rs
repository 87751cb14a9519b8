//! `sbp-sim` — yearly step loop for the SBP adoption simulation.
//!
//! # Two-phase year step
//!
//! ```text
//! for year in start_year..config.end_year():
//!   ① Compute — decide() for every municipality against committed state
//!               (parallel with the `parallel` feature and the
//!               per-municipality RNG strategy).
//!   ② Stage   — each Decision goes into its municipality's staged slot,
//!               ascending MunicipalityId.
//!   ③ Commit  — each municipality folds its slot into its ledger and adds
//!               its hectare delta to the national staged total; then the
//!               national aggregate commits the year.
//!   ④ Advance — the clock moves on by one year.
//! ```
//!
//! A step that fails in ① returns before ② so no partial year is ever
//! visible.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Runs the compute phase on Rayon's thread pool under      |
//! |            | `RngStrategy::PerMunicipality`.                          |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use sbp_agent::MunicipalityStoreBuilder;
//! use sbp_behavior::{AdoptionModels, FixedFraction, FixedProbability};
//! use sbp_core::SimConfig;
//! use sbp_sim::{NoopObserver, SimBuilder};
//!
//! let config = SimConfig::default();
//! let (store, rngs) = MunicipalityStoreBuilder::new(config.start_year, config.seed)
//!     .municipalities(records)
//!     .build()?;
//! let models = AdoptionModels::new(FixedProbability(0.3), clsf, FixedFraction(0.01), regr)?;
//! let mut sim = SimBuilder::new(config, store, rngs, models)
//!     .environments(environments)
//!     .payments(payments)
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod national;
pub mod observer;
pub mod sim;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use national::NationalAggregate;
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
pub use snapshot::{MunicipalitySnapshot, YearSnapshot, YearSummary};

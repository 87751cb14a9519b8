//! Simulation time model.
//!
//! # Design
//!
//! One simulation step is one calendar year.  Time is represented as a
//! `Year` newtype rather than a tick counter because every dataset (census,
//! pastures, payments, historic adoption) is indexed by calendar year, and
//! keeping the calendar value avoids an offset translation at every lookup.
//!
//! The clock starts at a configured year (never before
//! [`EARLIEST_START_YEAR`]) and advances by exactly one year per step.  No
//! upper bound is enforced by the clock itself; the caller decides how many
//! steps to run.

use std::fmt;

use crate::{CoreError, CoreResult};

/// The first year the municipal datasets can drive a prediction for.
///
/// A step for year `y` reads census data for `y - 1`, and the historic series
/// start in 1995.
pub const EARLIEST_START_YEAR: Year = Year(1996);

/// Earliest year with any data at all (the year before the first step).
pub const EARLIEST_DATA_YEAR: Year = Year(1995);

// ── Year ──────────────────────────────────────────────────────────────────────

/// A calendar year.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Year(pub u16);

impl Year {
    /// Return the year `n` years after `self`.
    #[inline]
    pub fn offset(self, n: u16) -> Year {
        Year(self.0 + n)
    }

    /// The year before `self`.
    #[inline]
    pub fn previous(self) -> Year {
        Year(self.0 - 1)
    }

    /// The year after `self`.
    #[inline]
    pub fn next(self) -> Year {
        Year(self.0 + 1)
    }

    /// Years elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Year) -> u16 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u16> for Year {
    type Output = Year;
    #[inline]
    fn add(self, rhs: u16) -> Year {
        Year(self.0 + rhs)
    }
}

impl std::ops::Sub for Year {
    type Output = u16;
    #[inline]
    fn sub(self, rhs: Year) -> u16 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tracks the year currently being simulated.
///
/// `current_year` is the year the *next* call to `Sim::step` will predict.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// First simulated year.
    pub start_year: Year,
    /// The year the next step will simulate.
    pub current_year: Year,
}

impl SimClock {
    /// Create a clock positioned at `start_year`.
    ///
    /// Fails with [`CoreError::InvalidConfiguration`] if `start_year` is
    /// before [`EARLIEST_START_YEAR`].
    pub fn new(start_year: Year) -> CoreResult<Self> {
        if start_year < EARLIEST_START_YEAR {
            return Err(CoreError::InvalidConfiguration(format!(
                "the simulation cannot start in {start_year}: \
                 the earliest supported start year is {EARLIEST_START_YEAR}"
            )));
        }
        Ok(Self { start_year, current_year: start_year })
    }

    /// Advance the clock by one year.
    #[inline]
    pub fn advance(&mut self) {
        self.current_year = self.current_year.next();
    }

    /// The last year whose results are committed (`current_year - 1`).
    #[inline]
    pub fn previous_year(&self) -> Year {
        self.current_year.previous()
    }

    /// Number of completed steps.
    #[inline]
    pub fn years_elapsed(&self) -> u16 {
        self.current_year.since(self.start_year)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (step {})", self.current_year, self.years_elapsed())
    }
}

// ── RngStrategy ───────────────────────────────────────────────────────────────

/// How the adoption draws are distributed across municipalities.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RngStrategy {
    /// One stream consumed in ascending `MunicipalityId` order.  Forces a
    /// sequential compute phase.
    #[default]
    Shared,
    /// One independent stream per municipality.  Allows a parallel compute
    /// phase without changing results.
    PerMunicipality,
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically loaded from a JSON run file by the application crate and passed
/// to the simulation builder.  Every field has a default, so a run file only
/// needs to name what it changes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// First year whose adoption is predicted.  Default: 1996.
    pub start_year: Year,

    /// Years to simulate.  Default: 17 (1996‥2012, the span of the payment
    /// programme).
    pub total_years: u16,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Worker thread count for the parallel compute phase.  `None` uses
    /// Rayon's global pool.
    pub num_threads: Option<usize>,

    /// Layout of the adoption draws.
    pub rng_strategy: RngStrategy,

    /// Year whose pastures area converts adoption fractions to hectares.
    /// Default: 2009.
    pub reference_year: Year,

    /// Report a snapshot every N years.  1 = every year; 0 = never.
    pub output_interval_years: u16,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_year:            EARLIEST_START_YEAR,
            total_years:           17,
            seed:                  42,
            num_threads:           None,
            rng_strategy:          RngStrategy::Shared,
            reference_year:        Year(2009),
            output_interval_years: 1,
        }
    }
}

impl SimConfig {
    /// The year at which the simulation ends (exclusive upper bound).
    ///
    /// Saturates at `u16::MAX`; [`validate`][Self::validate] rejects
    /// configurations where that happens.
    #[inline]
    pub fn end_year(&self) -> Year {
        Year(self.start_year.0.saturating_add(self.total_years))
    }

    /// Check every field; the first problem found is reported.
    pub fn validate(&self) -> CoreResult<()> {
        if self.start_year < EARLIEST_START_YEAR {
            return Err(CoreError::InvalidConfiguration(format!(
                "start_year {} is before the earliest supported year {EARLIEST_START_YEAR}",
                self.start_year
            )));
        }
        if self.total_years == 0 {
            return Err(CoreError::InvalidConfiguration(
                "total_years must be at least 1".into(),
            ));
        }
        if self.start_year.0.checked_add(self.total_years).is_none() {
            return Err(CoreError::InvalidConfiguration(format!(
                "start_year {} plus total_years {} is past the last representable year",
                self.start_year, self.total_years
            )));
        }
        if self.reference_year < EARLIEST_DATA_YEAR {
            return Err(CoreError::InvalidConfiguration(format!(
                "reference_year {} is before the earliest data year {EARLIEST_DATA_YEAR}",
                self.reference_year
            )));
        }
        if self.num_threads == Some(0) {
            return Err(CoreError::InvalidConfiguration(
                "num_threads must be positive when set".into(),
            ));
        }
        Ok(())
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> CoreResult<SimClock> {
        self.validate()?;
        SimClock::new(self.start_year)
    }
}

//! Named numeric covariates.
//!
//! Census rows, climate averages and soil properties are all carried as a
//! `FeatureMap`: column name → value.  `BTreeMap` keeps iteration order
//! deterministic, which matters for logging and for reproducible output.

use std::collections::BTreeMap;

/// Column name → numeric value.
pub type FeatureMap = BTreeMap<String, f64>;

/// Municipal cumulative adoption fraction up to the previous year.
pub const MUNICIPAL_CUMULATIVE_ADOPTION: &str = "tot_cumul_adoption_pr_y_munic";

/// National cumulative adoption fraction up to the previous year.
pub const NATIONAL_CUMULATIVE_ADOPTION: &str = "tot_cumul_adoption_pr_y_port";

/// Payment offered in the current year, €/ha.
pub const PAYMENT: &str = "sbp_payment";

//! `sbp-behavior` — how a municipality decides how much SBP it adopts.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`payment`]   | `PaymentSchedule` — year → €/ha, optional eligibility set       |
//! | [`context`]   | `DecisionContext<'a>` — read-only year snapshot shared by all   |
//! | [`features`]  | `assemble_features`, `FeatureSource`, `EstimatorKind`           |
//! | [`predictor`] | `Classifier`, `Regressor` traits, `AdoptionModels<C, R>`        |
//! | [`linear`]    | `LinearClassifier`, `LinearRegressor` (JSON coefficients)       |
//! | [`fixed`]     | `FixedProbability`, `FixedFraction`, `FixedDraw` stubs          |
//! | [`decision`]  | `decide` — the classify-then-regress step, `Decision`, `Outcome` |
//! | [`error`]     | `BehaviorError`, `BehaviorResult<T>`                            |
//!
//! # Design notes
//!
//! The yearly step in sbp-sim works as follows:
//!
//! 1. **Compute phase** (optionally parallel): for every municipality call
//!    [`decide`].  All reads go through `&Municipality` and
//!    `&DecisionContext`; nothing is mutated except the random source.
//!
//! 2. **Commit phase** (sequential): stage each [`Decision`] into its
//!    municipality and fold the ledgers into the national total.
//!
//! This split means predictors only need to be `Send + Sync`; they never
//! hold mutable state.

pub mod context;
pub mod decision;
pub mod error;
pub mod features;
pub mod fixed;
pub mod linear;
pub mod payment;
pub mod predictor;


pub use context::DecisionContext;
pub use decision::{AdoptionClamp, BlockReason, Decision, Outcome, decide};
pub use error::{BehaviorError, BehaviorResult};
pub use features::{EstimatorKind, FeatureSource, assemble_features};
pub use fixed::{FixedDraw, FixedFraction, FixedProbability};
pub use linear::{LinearClassifier, LinearRegressor};
pub use payment::PaymentSchedule;
pub use predictor::{AdoptionModels, Classifier, Regressor};

//! `sbp-core` — foundational types for the SBP adoption simulation.
//!
//! This crate is a dependency of every other `sbp-*` crate.  It intentionally
//! has no `sbp-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `MunicipalityId`                                      |
//! | [`time`]        | `Year`, `SimClock`, `SimConfig`, `RngStrategy`        |
//! | [`rng`]         | `UniformSource`, `MunicipalityRng`, `SimRng`          |
//! | [`features`]    | `FeatureMap` and the well-known feature names         |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required to read `SimConfig` from a run file.              |

pub mod error;
pub mod features;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use features::FeatureMap;
pub use ids::MunicipalityId;
pub use rng::{MunicipalityRng, SimRng, UniformSource};
pub use time::{EARLIEST_DATA_YEAR, EARLIEST_START_YEAR, RngStrategy, SimClock, SimConfig, Year};

//! `sbp-agent` — municipality state for the SBP adoption simulation.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                  |
//! |-------------------|-----------------------------------------------------------|
//! | [`municipality`]  | `Municipality` (static data + adoption ledger), `StagedAdoption` |
//! | [`environment`]   | `Environment`, `EnvironmentTable` (climate + soil lookup) |
//! | [`store`]         | `MunicipalityStore`, `MunicipalityRngs`                   |
//! | [`builder`]       | `MunicipalityRecord`, `MunicipalityStoreBuilder`          |
//! | [`error`]         | `AgentError`, `AgentResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on the plain data types. |

pub mod builder;
pub mod environment;
pub mod error;
pub mod municipality;
pub mod store;


pub use builder::{MunicipalityRecord, MunicipalityStoreBuilder};
pub use environment::{Environment, EnvironmentTable};
pub use error::{AgentError, AgentResult};
pub use municipality::{Municipality, StagedAdoption};
pub use store::{MunicipalityRngs, MunicipalityStore};

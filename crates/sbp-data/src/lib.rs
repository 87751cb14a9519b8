//! `sbp-data` — CSV loaders for the static simulation inputs.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`loader`]  | one `read_*` function per table, `load_feature_names`         |
//! | [`filter`]  | `ColumnFilter`, the default census / climate / soil selection |
//! | [`dataset`] | `DatasetLayout`, `Dataset`, `load_dataset`                    |
//! | [`error`]   | `DataError`, `DataResult<T>`                                  |
//!
//! Readers take any `Read` source so tests can pass a `std::io::Cursor`.
//! Parsing and validation are separate: readers only reject text that is not
//! a number, and missing values travel as `NaN` to the store builder and
//! environment validation, which report every affected municipality.

pub mod dataset;
pub mod error;
pub mod filter;
pub mod loader;

#[cfg(test)]
mod tests;

pub use dataset::{Dataset, DatasetLayout, load_dataset};
pub use error::{DataError, DataResult};
pub use filter::ColumnFilter;
pub use loader::{
    load_feature_names, read_adoption, read_attributes, read_census, read_eligible,
    read_feature_names, read_municipalities, read_pastures, read_payments,
};

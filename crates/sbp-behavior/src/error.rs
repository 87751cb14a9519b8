use sbp_core::Year;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BehaviorError {
    /// One or more features requested by a predictor have no value after
    /// merging every source.  `names` lists all of them, in request order.
    #[error("{municipality} ({year}): missing model features {}", .names.join(", "))]
    MissingFeature {
        municipality: String,
        year:         Year,
        names:        Vec<String>,
    },

    #[error("payment for {year} not available: {}", describe_range(.range))]
    PaymentNotAvailable {
        year:  Year,
        /// First and last year of the loaded table, `None` if it is empty.
        range: Option<(Year, Year)>,
    },

    /// The pastures dataset has no entry for a year the step needs.
    #[error("{municipality}: no pastures area recorded for {year}")]
    PasturesUnavailable {
        municipality: String,
        year:         Year,
    },

    #[error("{municipality} ({year}): {what} returned non-finite value {value}")]
    InvalidPrediction {
        municipality: String,
        year:         Year,
        what:         &'static str,
        value:        f64,
    },

    #[error("model configuration error: {0}")]
    Model(String),

    #[error("model file error: {0}")]
    Json(#[from] serde_json::Error),
}

fn describe_range(range: &Option<(Year, Year)>) -> String {
    match *range {
        Some((first, last)) => format!("the payment table covers {first}-{last}"),
        None                => "the payment table is empty".to_owned(),
    }
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;

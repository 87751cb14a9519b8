use sbp_core::{CoreError, MunicipalityId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    /// The static dataset is missing required values.  Lists every affected
    /// municipality, not just the first.
    #[error("dataset is missing values for municipalities [{}]: {detail}", .municipalities.join(", "))]
    DataIntegrity {
        municipalities: Vec<String>,
        detail:         String,
    },

    #[error("{0} already holds a staged value for this year")]
    AlreadyStaged(MunicipalityId),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl AgentError {
    /// Build a `DataIntegrity` error from `(municipality, problem)` pairs.
    ///
    /// Municipality names are deduplicated in first-seen order.
    pub fn data_integrity(problems: Vec<(String, String)>) -> Self {
        let mut municipalities: Vec<String> = Vec::new();
        for (name, _) in &problems {
            if !municipalities.contains(name) {
                municipalities.push(name.clone());
            }
        }
        let detail = problems
            .into_iter()
            .map(|(name, problem)| format!("{name}: {problem}"))
            .collect::<Vec<_>>()
            .join("; ");
        AgentError::DataIntegrity { municipalities, detail }
    }
}

pub type AgentResult<T> = Result<T, AgentError>;

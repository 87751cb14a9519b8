use sbp_agent::AgentError;
use sbp_behavior::BehaviorError;
use sbp_core::{CoreError, MunicipalityId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match municipality count {expected}")]
    CountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    /// The commit phase reached a municipality with nothing staged.
    #[error("{0} has no staged value to commit")]
    Unstaged(MunicipalityId),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Behavior(#[from] BehaviorError),
}

pub type SimResult<T> = Result<T, SimError>;

use sbp_agent::AgentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    /// A cell or header that cannot be interpreted.  Missing values are not
    /// parse errors; they are reported later as data-integrity problems.
    #[error("{file}: {message}")]
    Parse {
        file:    String,
        message: String,
    },

    #[error("CSV error in {file}: {source}")]
    Csv {
        file:   String,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl DataError {
    pub(crate) fn parse(file: &str, message: impl Into<String>) -> Self {
        DataError::Parse { file: file.to_owned(), message: message.into() }
    }

    pub(crate) fn csv(file: &str) -> impl FnOnce(csv::Error) -> Self + '_ {
        move |source| DataError::Csv { file: file.to_owned(), source }
    }
}

pub type DataResult<T> = Result<T, DataError>;

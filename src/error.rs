use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Unsupported file format \"{0}\": upload a .csv, .xls, or .xlsx file")]
    UnsupportedFormat(String),

    #[error("Failed to parse file: {0}")]
    Decode(String),

    #[error("No file uploaded")]
    MissingFile,

    #[error("Row {row}: \"{field}\" {reason}")]
    Validation {
        row: usize,
        field: &'static str,
        reason: &'static str,
    },

    #[error("Need at least {required} agents to distribute lists, found {available}")]
    InsufficientAgents { required: usize, available: usize },

    #[error("Agent email already exists: {0}")]
    DuplicateAgent(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(Uuid),

    #[error("Persistence failure: {0}")]
    Persistence(String),
}

pub type Result<T> = std::result::Result<T, SplitError>;

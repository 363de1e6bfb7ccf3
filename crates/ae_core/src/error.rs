use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Please provide an API key!")]
    MissingCredential,

    #[error("No articles selected!")]
    EmptySelection,

    #[error("Scoring error: {0}")]
    Scorer(String),

    #[error("Generation error: {0}")]
    Generator(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// True when the request itself was incomplete, as opposed to a collaborator failing.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::MissingCredential | Error::EmptySelection)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Article already stored: {0}")]
    DuplicateArticle(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("No download trigger specified")]
    NoDownloadTrigger,

    #[error("More than one download trigger specified")]
    AmbiguousDownloadTrigger,

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Insufficient text extracted: {0} characters")]
    InsufficientText(usize),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Failures a caller may reasonably try again later. Nothing in the
    /// pipeline retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::Download(_) | Error::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

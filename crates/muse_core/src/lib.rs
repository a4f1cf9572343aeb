pub mod config;
pub mod document;
pub mod error;
pub mod inference;
pub mod paths;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use inference::InferenceModel;
pub use storage::ArticleStore;
pub use document::{DocumentReader, PdfReader};
pub use types::{
    Article, ArticleMetadata, CombinedSummary, DocumentSummary, IssueInfo, NewCombinedSummary,
    Summary, SummaryEntry,
};

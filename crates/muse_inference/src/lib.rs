pub mod chunking;
pub mod combined;
pub mod models;
pub mod pipeline;

/// Which summarization model to use and how to reach it.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// `gemini`, `ollama` or `dummy`
    pub model: String,
    pub model_name: Option<String>,
    pub model_url: Option<String>,
    pub api_key: Option<String>,
}

pub mod prelude {
    pub use super::Config;
    pub use super::chunking::RecursiveSplitter;
    pub use super::combined::{build_combined_markdown, record_combined_summary};
    pub use super::models::create_model;
    pub use super::pipeline::{write_summary_mirror, SummaryPipeline};
    pub use muse_core::{InferenceModel, Result, Error};
}

pub use models::create_model;
pub use pipeline::SummaryPipeline;

//! Chunk-and-summarize pipeline for one document.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};
use muse_core::paths::summary_mirror_path;
use muse_core::{Article, DocumentReader, DocumentSummary, Error, InferenceModel, Result};
use crate::chunking::RecursiveSplitter;

/// Documents with less extracted text than this are not summarized.
pub const MIN_TEXT_LENGTH: usize = 100;

lazy_static! {
    static ref LINK: Regex = Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap();
    static ref HEADING: Regex = Regex::new(r"(?m)^[ \t]{0,3}#{1,6}[ \t]*").unwrap();
    static ref BULLET: Regex = Regex::new(r"(?m)^([ \t]*)[-*+][ \t]+").unwrap();
    static ref EMPHASIS: Regex = Regex::new(r"(\*\*|__|\*|`)").unwrap();
}

pub fn chunk_prompt(chunk: &str) -> String {
    format!(
        "You are analyzing a chunk of a scholarly journal article. Extract the information \
that matters most for the article's overall argument.\n\n\
Please provide the following:\n\n\
Chunk Main Idea: the core concept or argument of this chunk in 1-2 concise sentences.\n\n\
Key Concepts and Evidence: significant theories, findings, data or textual evidence in this chunk.\n\n\
Key Sources and Traditions: primary texts, commentators or schools of thought referenced in this chunk.\n\n\
Connections: how the ideas in this chunk interact, conflict or are reconciled.\n\n\
Potential Sources Mentioned (if any): authors, books or articles cited that may belong to the bibliography.\n\n\
Text:\n{}",
        chunk
    )
}

pub fn review_prompt(chunk_summaries: &[String]) -> String {
    format!(
        "Given the following chunk summaries, write a single-paragraph review that synthesizes \
the main ideas and sources from the entire document. Answer with the review paragraph only.\n\n\
Chunk Summaries:\n{}",
        chunk_summaries.join("\n\n")
    )
}

/// Plain-text form of a markdown reply.
pub fn strip_markdown(markdown: &str) -> String {
    let text = LINK.replace_all(markdown, "$1");
    let text = HEADING.replace_all(&text, "");
    let text = BULLET.replace_all(&text, "$1");
    let text = EMPHASIS.replace_all(&text, "");
    text.trim().to_string()
}

pub struct SummaryPipeline {
    model: Arc<dyn InferenceModel>,
    reader: Arc<dyn DocumentReader>,
    splitter: RecursiveSplitter,
    min_text_length: usize,
}

impl SummaryPipeline {
    pub fn new(model: Arc<dyn InferenceModel>, reader: Arc<dyn DocumentReader>) -> Self {
        Self {
            model,
            reader,
            splitter: RecursiveSplitter::default(),
            min_text_length: MIN_TEXT_LENGTH,
        }
    }

    pub fn with_splitter(mut self, splitter: RecursiveSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Extract the document's text and summarize it.
    pub async fn summarize(&self, path: &Path) -> Result<DocumentSummary> {
        info!("📄 Extracting text from {}", path.display());
        let reader = self.reader.clone();
        let owned = path.to_path_buf();
        let text = tokio::task::spawn_blocking(move || reader.full_text(&owned))
            .await
            .map_err(|e| Error::External(e.into()))??;
        self.summarize_text(&text).await
    }

    /// Summarize each chunk in order, then synthesize one review paragraph
    /// from the ordered chunk summaries.
    pub async fn summarize_text(&self, text: &str) -> Result<DocumentSummary> {
        let length = text.trim().chars().count();
        if length < self.min_text_length {
            return Err(Error::InsufficientText(length));
        }

        let chunks = self.splitter.split_text(text);
        info!("✂️ Split {} characters into {} chunks", length, chunks.len());

        let mut chunk_summaries = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            debug!("🤖 Summarizing chunk {}/{}", i + 1, chunks.len());
            chunk_summaries.push(self.model.complete(&chunk_prompt(chunk)).await?);
        }

        info!("🧵 Synthesizing review from {} chunk summaries", chunk_summaries.len());
        let markdown = self.model.complete(&review_prompt(&chunk_summaries)).await?;
        let markdown = markdown.trim().to_string();

        Ok(DocumentSummary {
            summary: strip_markdown(&markdown),
            markdown,
            chunk_count: chunks.len(),
        })
    }
}

/// Write the summary to the summaries tree and return the file's path.
pub fn write_summary_mirror(root: &Path, article: &Article, summary: &str) -> Result<PathBuf> {
    let path = summary_mirror_path(root, article);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, summary)?;
    Ok(path)
}

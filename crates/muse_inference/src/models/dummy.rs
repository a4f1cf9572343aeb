use async_trait::async_trait;
use muse_core::{InferenceModel, Result};

/// Offline stand-in that echoes the tail of each prompt. Both pipeline
/// prompts end with the text being summarized.
#[derive(Debug, Default)]
pub struct DummyModel;

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let words: Vec<&str> = prompt.split_whitespace().collect();
        let start = words.len().saturating_sub(20);
        Ok(words[start..].join(" "))
    }
}

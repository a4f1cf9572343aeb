use async_trait::async_trait;
use crate::Result;

/// A text-in, text-out summarization capability.
#[async_trait]
pub trait InferenceModel: Send + Sync {
    fn name(&self) -> &str;

    /// Send one prompt and return the model's reply
    async fn complete(&self, prompt: &str) -> Result<String>;
}

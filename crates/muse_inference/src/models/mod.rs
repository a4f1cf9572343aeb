use std::sync::Arc;
use muse_core::{Error, InferenceModel, Result};
use crate::Config;

pub mod dummy;
pub mod gemini;
pub mod ollama;

pub use dummy::DummyModel;
pub use gemini::GeminiModel;
pub use ollama::OllamaModel;

/// Build the model named in `config.model`.
pub fn create_model(config: &Config) -> Result<Arc<dyn InferenceModel>> {
    let model: Arc<dyn InferenceModel> = match config.model.as_str() {
        "gemini" | "" => Arc::new(GeminiModel::new(config)?),
        "ollama" => Arc::new(OllamaModel::new(config)?),
        "dummy" => Arc::new(DummyModel::new()),
        other => {
            return Err(Error::Config(format!(
                "Unknown model: {}. Available models: gemini (default), ollama, dummy",
                other
            )))
        }
    };
    tracing::debug!("Using inference model {}", model.name());
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_model() {
        let dummy = create_model(&Config { model: "dummy".to_string(), ..Config::default() }).unwrap();
        assert_eq!(dummy.name(), "Dummy");

        let ollama = create_model(&Config { model: "ollama".to_string(), ..Config::default() }).unwrap();
        assert_eq!(ollama.name(), "Ollama");

        assert!(matches!(
            create_model(&Config { model: "gpt".to_string(), ..Config::default() }),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_gemini_requires_api_key() {
        let result = create_model(&Config { model: "gemini".to_string(), ..Config::default() });
        assert!(matches!(result, Err(Error::Config(_))));
    }
}

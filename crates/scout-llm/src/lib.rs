pub mod providers;

use std::sync::Arc;

use scout_core::config::ModelConfig;
use scout_core::error::{Result, ScoutError};
use scout_core::traits::ReasoningEngine;

pub use providers::anthropic::AnthropicEngine;
pub use providers::openai::OpenAiEngine;
pub use providers::presets::{get_preset, ProviderPreset};

/// Create a reasoning engine based on the provider name.
///
/// Named OpenAI-compatible hosts get their preset endpoint unless
/// `base_url` overrides it. Any other provider needs an explicit `base_url`.
pub fn create_engine(config: &ModelConfig) -> Result<Arc<dyn ReasoningEngine>> {
    match config.provider.as_str() {
        "anthropic" | "claude" => Ok(Arc::new(AnthropicEngine::new(config.clone()))),
        provider => {
            let mut config = config.clone();
            if config.base_url.is_none() {
                let preset = get_preset(provider)
                    .ok_or_else(|| ScoutError::UnsupportedProvider(provider.to_string()))?;
                config.base_url = Some(preset.default_base_url.to_string());
            }
            Ok(Arc::new(OpenAiEngine::new(config)))
        }
    }
}

/// Whether the provider refuses requests without an API key.
pub fn needs_api_key(provider: &str) -> bool {
    get_preset(provider).map_or(true, |p| p.needs_api_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(provider: &str, base_url: Option<&str>) -> ModelConfig {
        ModelConfig {
            provider: provider.into(),
            model_id: "m".into(),
            api_key: None,
            base_url: base_url.map(str::to_string),
            max_tokens: 1024,
            temperature: 0.0,
        }
    }

    #[test]
    fn test_known_providers_resolve() {
        assert!(create_engine(&model("anthropic", None)).is_ok());
        assert!(create_engine(&model("openai", None)).is_ok());
        assert!(create_engine(&model("ollama", None)).is_ok());
    }

    #[test]
    fn test_unknown_provider_needs_base_url() {
        let err = create_engine(&model("acme", None)).err().unwrap();
        assert!(matches!(err, ScoutError::UnsupportedProvider(ref p) if p == "acme"));
        assert!(create_engine(&model("acme", Some("http://10.0.0.2:8000/v1/chat/completions"))).is_ok());
    }

    #[test]
    fn test_key_requirements() {
        assert!(needs_api_key("anthropic"));
        assert!(!needs_api_key("ollama"));
    }
}

/// Endpoint defaults for OpenAI-compatible hosts.
pub struct ProviderPreset {
    pub default_base_url: &'static str,
    pub needs_api_key: bool,
}

pub fn get_preset(provider: &str) -> Option<ProviderPreset> {
    let (default_base_url, needs_api_key) = match provider {
        "openai" => ("https://api.openai.com/v1/chat/completions", true),
        "ollama" => ("http://localhost:11434/v1/chat/completions", false),
        "groq" => ("https://api.groq.com/openai/v1/chat/completions", true),
        "openrouter" => ("https://openrouter.ai/api/v1/chat/completions", true),
        "together" => ("https://api.together.xyz/v1/chat/completions", true),
        "mistral" => ("https://api.mistral.ai/v1/chat/completions", true),
        "deepseek" => ("https://api.deepseek.com/v1/chat/completions", true),
        _ => return None,
    };
    Some(ProviderPreset {
        default_base_url,
        needs_api_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_preset_needs_no_key() {
        let ollama = get_preset("ollama").unwrap();
        assert!(!ollama.needs_api_key);
        assert!(ollama.default_base_url.starts_with("http://localhost"));
        assert!(get_preset("groq").unwrap().needs_api_key);
        assert!(get_preset("anthropic").is_none());
    }
}

use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use scout_core::config::ModelConfig;
use scout_core::error::{Result, ScoutError};
use scout_core::traits::ReasoningEngine;
use scout_core::types::*;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI-compatible engine. Works with OpenAI, Ollama, vLLM, Groq, OpenRouter, etc.
pub struct OpenAiEngine {
    http: Client,
    config: ModelConfig,
}

impl OpenAiEngine {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }
}

// Request types
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<OaiMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct OaiMessage {
    role: &'static str,
    content: String,
}

// Response types
#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

fn convert_messages(messages: Vec<ChatMessage>) -> Vec<OaiMessage> {
    messages
        .into_iter()
        .map(|msg| OaiMessage {
            role: match msg.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: msg.content,
        })
        .collect()
}

fn json_schema_format(schema: &OutputSchema) -> serde_json::Value {
    serde_json::json!({
        "type": "json_schema",
        "json_schema": {
            "name": schema.name,
            "description": schema.description,
            "schema": schema.schema,
        }
    })
}

/// Pull a JSON payload out of model text that may wrap it in a code fence.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        if let Some(end) = after.find("```") {
            return after[..end].trim();
        }
    }
    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        if let Some(end) = after.find("```") {
            return after[..end].trim();
        }
    }
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end > start {
            return &trimmed[start..=end];
        }
    }
    trimmed
}

fn parse_structured(text: &str) -> serde_json::Value {
    match serde_json::from_str(extract_json(text)) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Structured completion was not valid JSON");
            serde_json::Value::String(text.to_string())
        }
    }
}

impl OpenAiEngine {
    async fn send(
        &self,
        messages: Vec<ChatMessage>,
        schema: Option<&OutputSchema>,
    ) -> Result<String> {
        let config = &self.config;
        let url = config.base_url.as_deref().unwrap_or(OPENAI_API_URL);

        let body = ChatRequest {
            model: config.model_id.clone(),
            messages: convert_messages(messages),
            max_tokens: config.max_tokens,
            temperature: if config.temperature > 0.0 {
                Some(config.temperature)
            } else {
                None
            },
            response_format: schema.map(json_schema_format),
        };

        let mut req = self.http.post(url).json(&body);

        if let Some(api_key) = &config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req
            .send()
            .await
            .map_err(|e| ScoutError::LlmRequest(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(ScoutError::LlmRequest(format!("HTTP {}: {}", status, body)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::LlmParse(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                input_tokens = usage.prompt_tokens,
                output_tokens = usage.completion_tokens,
                "Token usage"
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| ScoutError::LlmParse("response contained no choices".into()))
    }
}

impl ReasoningEngine for OpenAiEngine {
    fn complete(&self, messages: Vec<ChatMessage>) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move { self.send(messages, None).await })
    }

    fn complete_structured<'a>(
        &'a self,
        messages: Vec<ChatMessage>,
        schema: &'a OutputSchema,
    ) -> BoxFuture<'a, Result<serde_json::Value>> {
        Box::pin(async move {
            let text = self.send(messages, Some(schema)).await?;
            Ok(parse_structured(&text))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_fence() {
        let text = "Here you go:\n```json\n{\"selected_urls\": []}\n```";
        assert_eq!(extract_json(text), "{\"selected_urls\": []}");
    }

    #[test]
    fn test_extract_json_bare_object() {
        assert_eq!(extract_json("noise {\"a\": 1} tail"), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_json_closing_brace_first() {
        assert_eq!(extract_json("x } y {"), "x } y {");
        assert_eq!(
            parse_structured("Sorry } I cannot pick {any"),
            serde_json::Value::String("Sorry } I cannot pick {any".into())
        );
    }

    #[test]
    fn test_parse_structured_falls_back_to_string() {
        assert_eq!(
            parse_structured("no json here"),
            serde_json::Value::String("no json here".into())
        );
        assert_eq!(
            parse_structured("{\"selected_urls\": [\"u\"]}"),
            serde_json::json!({"selected_urls": ["u"]})
        );
    }

    #[test]
    fn test_schema_format_shape() {
        let schema = OutputSchema {
            name: "url_selection".into(),
            description: "d".into(),
            schema: serde_json::json!({"type": "object"}),
        };
        let format = json_schema_format(&schema);
        assert_eq!(format["type"], "json_schema");
        assert_eq!(format["json_schema"]["name"], "url_selection");
    }

    #[test]
    fn test_roles_mapped() {
        let msgs = convert_messages(vec![ChatMessage::system("s"), ChatMessage::user("u")]);
        assert_eq!(msgs[0].role, "system");
        assert_eq!(msgs[1].role, "user");
    }
}

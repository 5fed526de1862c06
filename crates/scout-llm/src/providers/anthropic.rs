use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use scout_core::config::ModelConfig;
use scout_core::error::{Result, ScoutError};
use scout_core::traits::ReasoningEngine;
use scout_core::types::*;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API engine.
///
/// Structured completions force a single tool call whose input schema is the
/// requested schema, and return that tool call's input.
pub struct AnthropicEngine {
    http: Client,
    config: ModelConfig,
}

impl AnthropicEngine {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }
}

// Anthropic API request types
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<serde_json::Value>,
}

#[derive(Serialize, Debug, PartialEq)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ApiTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

// Anthropic API response types
#[derive(Deserialize, Debug)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
enum ResponseBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        name: String,
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug)]
struct UsageInfo {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// Split system messages out of the conversation; Anthropic takes them as a
/// top-level field.
fn convert_messages(messages: Vec<ChatMessage>) -> (Option<String>, Vec<ApiMessage>) {
    let mut system: Vec<String> = Vec::new();
    let mut api_msgs = Vec::new();

    for msg in messages {
        match msg.role {
            Role::System => system.push(msg.content),
            Role::User => api_msgs.push(ApiMessage {
                role: "user".to_string(),
                content: msg.content,
            }),
            Role::Assistant => api_msgs.push(ApiMessage {
                role: "assistant".to_string(),
                content: msg.content,
            }),
        }
    }

    let system = if system.is_empty() {
        None
    } else {
        Some(system.join("\n\n"))
    };
    (system, api_msgs)
}

fn response_text(response: &AnthropicResponse) -> String {
    response
        .content
        .iter()
        .filter_map(|b| match b {
            ResponseBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("")
}

fn response_tool_input(response: &AnthropicResponse, tool: &str) -> Option<serde_json::Value> {
    response.content.iter().find_map(|b| match b {
        ResponseBlock::ToolUse { name, input } if name == tool => Some(input.clone()),
        _ => None,
    })
}

impl AnthropicEngine {
    async fn send(
        &self,
        messages: Vec<ChatMessage>,
        schema: Option<&OutputSchema>,
    ) -> Result<AnthropicResponse> {
        let config = &self.config;
        let url = config.base_url.as_deref().unwrap_or(ANTHROPIC_API_URL);
        let (system, api_messages) = convert_messages(messages);

        let (tools, tool_choice) = match schema {
            Some(schema) => (
                vec![ApiTool {
                    name: schema.name.clone(),
                    description: schema.description.clone(),
                    input_schema: schema.schema.clone(),
                }],
                Some(serde_json::json!({ "type": "tool", "name": schema.name })),
            ),
            None => (vec![], None),
        };

        let body = AnthropicRequest {
            model: config.model_id.clone(),
            max_tokens: config.max_tokens,
            temperature: Some(config.temperature),
            messages: api_messages,
            system,
            tools,
            tool_choice,
        };

        let mut req = self
            .http
            .post(url)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        if let Some(api_key) = &config.api_key {
            req = req.header("x-api-key", api_key);
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

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::LlmParse(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                stop_reason = parsed.stop_reason.as_deref().unwrap_or("unknown"),
                "Token usage"
            );
        }

        Ok(parsed)
    }
}

impl ReasoningEngine for AnthropicEngine {
    fn complete(&self, messages: Vec<ChatMessage>) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            let response = self.send(messages, None).await?;
            Ok(response_text(&response))
        })
    }

    fn complete_structured<'a>(
        &'a self,
        messages: Vec<ChatMessage>,
        schema: &'a OutputSchema,
    ) -> BoxFuture<'a, Result<serde_json::Value>> {
        Box::pin(async move {
            let response = self.send(messages, Some(schema)).await?;
            // Without the forced tool call, hand back whatever text came out.
            Ok(response_tool_input(&response, &schema.name)
                .unwrap_or_else(|| serde_json::Value::String(response_text(&response))))
        })
    }
}

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, ScoutError};

/// Top-level Scout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub model: ModelConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub social: SocialConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    pub model_id: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_provider() -> String { "anthropic".to_string() }
fn default_model_id() -> String { "claude-sonnet-4-20250514".to_string() }
fn default_max_tokens() -> u32 { 4096 }
fn default_temperature() -> f32 { 0.0 }

/// SERP API configuration (Google, Bing, Yandex).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// SERP request endpoint.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Proxy zone the SERP request is billed against.
    #[serde(default = "default_serp_zone")]
    pub zone: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            zone: default_serp_zone(),
        }
    }
}

fn default_serp_zone() -> String { "google_bing_serp_api_ai_agent".to_string() }

/// Social dataset API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_dataset_base_url")]
    pub base_url: String,
    /// Dataset that discovers posts by keyword.
    #[serde(default = "default_posts_dataset")]
    pub posts_dataset_id: String,
    /// Dataset that collects comments for post URLs.
    #[serde(default = "default_comments_dataset")]
    pub comments_dataset_id: String,
    #[serde(default = "default_num_of_posts")]
    pub num_of_posts: u32,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_date_range")]
    pub date: String,
    #[serde(default = "default_days_back")]
    pub days_back: u32,
    #[serde(default = "default_comment_limit")]
    pub comment_limit: u32,
    #[serde(default)]
    pub load_all_replies: bool,
    #[serde(default)]
    pub polling: PollingConfig,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_dataset_base_url(),
            posts_dataset_id: default_posts_dataset(),
            comments_dataset_id: default_comments_dataset(),
            num_of_posts: default_num_of_posts(),
            sort_by: default_sort_by(),
            date: default_date_range(),
            days_back: default_days_back(),
            comment_limit: default_comment_limit(),
            load_all_replies: false,
            polling: PollingConfig::default(),
        }
    }
}

fn default_dataset_base_url() -> String { "https://api.brightdata.com/datasets/v3".to_string() }
fn default_posts_dataset() -> String { "gd_lvz8ah06191smkebj4".to_string() }
fn default_comments_dataset() -> String { "gd_lvzdpsdlw09j6t702".to_string() }
fn default_num_of_posts() -> u32 { 100 }
fn default_sort_by() -> String { "Hot".to_string() }
fn default_date_range() -> String { "All time".to_string() }
fn default_days_back() -> u32 { 365 }
fn default_comment_limit() -> u32 { 20 }

/// Snapshot job polling. The attempt ceiling is the only timeout a job has.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_secs: default_interval_secs(),
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

fn default_max_attempts() -> u32 { 50 }
fn default_interval_secs() -> u64 { 10 }

impl AppConfig {
    /// Load config from a TOML file, with env var expansion.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| ScoutError::ConfigNotFound(path.display().to_string()))?;

        Self::from_toml(&content)
    }

    /// Parse config from TOML text, expanding `${ENV_VAR}` references first.
    pub fn from_toml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content);

        toml::from_str(&expanded).map_err(|e| ScoutError::Config(e.to_string()))
    }

    /// Build a config purely from environment variables.
    ///
    /// Reads `ANTHROPIC_API_KEY`, `SCOUT_MODEL`, `BRIGHT_DATA_API_KEY` and
    /// `BRIGHT_DATA_API_URL`. Everything else takes its default.
    pub fn from_env() -> Self {
        let env = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let bright_data_key = env("BRIGHT_DATA_API_KEY");

        Self {
            model: ModelConfig {
                provider: default_provider(),
                model_id: env("SCOUT_MODEL").unwrap_or_else(default_model_id),
                api_key: env("ANTHROPIC_API_KEY"),
                base_url: None,
                max_tokens: default_max_tokens(),
                temperature: default_temperature(),
            },
            search: SearchConfig {
                api_url: env("BRIGHT_DATA_API_URL"),
                api_key: bright_data_key.clone(),
                zone: default_serp_zone(),
            },
            social: SocialConfig {
                api_key: bright_data_key,
                ..SocialConfig::default()
            },
        }
    }

    /// A copy with every credential replaced by a placeholder, for display.
    pub fn redacted(&self) -> Self {
        let mask = |key: &Option<String>| key.as_ref().map(|_| "********".to_string());
        let mut copy = self.clone();
        copy.model.api_key = mask(&self.model.api_key);
        copy.search.api_key = mask(&self.search.api_key);
        copy.social.api_key = mask(&self.social.api_key);
        copy
    }
}

/// Whether a credential is present and not an unexpanded `${VAR}` reference.
pub fn is_configured(value: &Option<String>) -> bool {
    value
        .as_deref()
        .is_some_and(|v| !v.is_empty() && !v.starts_with("${"))
}

/// Expand `${ENV_VAR}` patterns in a string.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_name.push(c);
            }
            match std::env::var(&var_name) {
                Ok(val) => result.push_str(&val),
                Err(_) => {
                    warn!(var = %var_name, "Config references an unset environment variable");
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

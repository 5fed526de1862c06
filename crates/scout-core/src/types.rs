use serde::{Deserialize, Serialize};

/// Role in a conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message sent to the reasoning engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
        }
    }
}

/// JSON schema a structured completion must conform to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSchema {
    /// Schema name (used as the tool / response-format name by providers).
    pub name: String,
    pub description: String,
    pub schema: serde_json::Value,
}

/// Web search engines reachable through the SERP provider.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    Google,
    Bing,
    Yandex,
}

impl SearchEngine {
    pub const ALL: [SearchEngine; 3] = [Self::Google, Self::Bing, Self::Yandex];

    /// Search page URL prefix; the url-encoded query is appended to it.
    pub fn search_url_prefix(&self) -> &'static str {
        match self {
            Self::Google => "https://www.google.com/search?q=",
            Self::Bing => "https://www.bing.com/search?q=",
            Self::Yandex => "https://yandex.com/search?text=",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Bing => "bing",
            Self::Yandex => "yandex",
        }
    }
}

impl std::fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed SERP response: knowledge panel plus organic results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SerpResults {
    #[serde(default)]
    pub knowledge: serde_json::Value,
    #[serde(default)]
    pub organic: serde_json::Value,
}

/// A social post surfaced by a keyword search.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SocialPost {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SocialPosts {
    pub parsed_posts: Vec<SocialPost>,
    pub total_found: usize,
}

/// A single comment retrieved from a post's detail page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PostComment {
    #[serde(default)]
    pub comment_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub parent_comment_id: Option<String>,
    #[serde(default)]
    pub post_title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PostDetails {
    pub parsed_comments: Vec<PostComment>,
    pub total_found: usize,
}

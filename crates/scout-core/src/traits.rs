use futures::future::BoxFuture;

use crate::error::Result;
use crate::types::*;

/// Web search over a SERP provider.
pub trait WebSearchProvider: Send + Sync + 'static {
    /// Run `query` against `engine`. `Ok(None)` means the provider answered
    /// without usable data.
    fn search<'a>(
        &'a self,
        query: &'a str,
        engine: SearchEngine,
    ) -> BoxFuture<'a, Result<Option<SerpResults>>>;
}

/// Social platform scraping. Both operations are long-running jobs on the
/// provider side; implementations poll until the job settles.
pub trait SocialScrapeProvider: Send + Sync + 'static {
    /// Keyword search for posts.
    fn search_posts<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<Option<SocialPosts>>>;

    /// Fetch comment trees for the given post URLs.
    fn fetch_post_details<'a>(
        &'a self,
        urls: &'a [String],
    ) -> BoxFuture<'a, Result<Option<PostDetails>>>;
}

/// Reasoning engine (LLM).
pub trait ReasoningEngine: Send + Sync + 'static {
    /// Free-text completion.
    fn complete(&self, messages: Vec<ChatMessage>) -> BoxFuture<'_, Result<String>>;

    /// Completion constrained to `schema`. The returned value is whatever the
    /// engine produced; callers decode it and must tolerate other shapes.
    fn complete_structured<'a>(
        &'a self,
        messages: Vec<ChatMessage>,
        schema: &'a OutputSchema,
    ) -> BoxFuture<'a, Result<serde_json::Value>>;
}

//! Test doubles for the Scout capability traits.
//!
//! Every double counts its calls so tests can assert that a short-circuiting
//! node never reached its collaborator.

pub mod fixtures;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use futures::future::BoxFuture;
use serde_json::Value;

use scout_core::error::{Result, ScoutError};
use scout_core::traits::{ReasoningEngine, SocialScrapeProvider, WebSearchProvider};
use scout_core::types::*;

/// What a scripted call hands back.
#[derive(Debug, Clone)]
pub enum Scripted<T> {
    Value(T),
    /// The provider answered without data (`Ok(None)`).
    Missing,
    Fail(String),
}

impl<T: Clone> Scripted<T> {
    fn provider_result(&self, provider: &str) -> Result<Option<T>> {
        match self {
            Self::Value(v) => Ok(Some(v.clone())),
            Self::Missing => Ok(None),
            Self::Fail(msg) => Err(ScoutError::ProviderRequest {
                provider: provider.to_string(),
                message: msg.clone(),
            }),
        }
    }
}

/// SERP double. Each engine answers with its fixture unless scripted otherwise.
pub struct MockSearch {
    replies: Mutex<HashMap<SearchEngine, Scripted<SerpResults>>>,
    queries: Mutex<Vec<(SearchEngine, String)>>,
    calls: AtomicUsize,
}

impl MockSearch {
    pub fn new() -> Self {
        let replies = SearchEngine::ALL
            .into_iter()
            .map(|e| (e, Scripted::Value(fixtures::serp_results(e))))
            .collect();
        Self {
            replies: Mutex::new(replies),
            queries: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn script(self, engine: SearchEngine, reply: Scripted<SerpResults>) -> Self {
        self.replies.lock().unwrap().insert(engine, reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<(SearchEngine, String)> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl WebSearchProvider for MockSearch {
    fn search<'a>(
        &'a self,
        query: &'a str,
        engine: SearchEngine,
    ) -> BoxFuture<'a, Result<Option<SerpResults>>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries
                .lock()
                .unwrap()
                .push((engine, query.to_string()));
            let reply = self.replies.lock().unwrap().get(&engine).cloned();
            reply
                .unwrap_or(Scripted::Missing)
                .provider_result("mock-serp")
        })
    }
}

/// Social scraping double.
pub struct MockSocial {
    posts: Mutex<Scripted<SocialPosts>>,
    details: Mutex<Scripted<PostDetails>>,
    requested_urls: Mutex<Vec<Vec<String>>>,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl MockSocial {
    pub fn new() -> Self {
        Self {
            posts: Mutex::new(Scripted::Value(fixtures::social_posts())),
            details: Mutex::new(Scripted::Value(fixtures::post_details(3))),
            requested_urls: Mutex::new(Vec::new()),
            search_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_posts(self, reply: Scripted<SocialPosts>) -> Self {
        *self.posts.lock().unwrap() = reply;
        self
    }

    pub fn with_details(self, reply: Scripted<PostDetails>) -> Self {
        *self.details.lock().unwrap() = reply;
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.search_calls() + self.detail_calls()
    }

    /// URL lists passed to `fetch_post_details`, one entry per call.
    pub fn requested_urls(&self) -> Vec<Vec<String>> {
        self.requested_urls.lock().unwrap().clone()
    }
}

impl Default for MockSocial {
    fn default() -> Self {
        Self::new()
    }
}

impl SocialScrapeProvider for MockSocial {
    fn search_posts<'a>(&'a self, _query: &'a str) -> BoxFuture<'a, Result<Option<SocialPosts>>> {
        Box::pin(async move {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            let reply = self.posts.lock().unwrap().clone();
            reply.provider_result("mock-social")
        })
    }

    fn fetch_post_details<'a>(
        &'a self,
        urls: &'a [String],
    ) -> BoxFuture<'a, Result<Option<PostDetails>>> {
        Box::pin(async move {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            self.requested_urls.lock().unwrap().push(urls.to_vec());
            let reply = self.details.lock().unwrap().clone();
            reply.provider_result("mock-social")
        })
    }
}

/// Reasoning engine double.
///
/// Free-text calls pop queued replies, then fall back to the default reply.
/// Structured calls do the same with their own queue.
pub struct MockReasoner {
    default_reply: Mutex<std::result::Result<String, String>>,
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    default_structured: Mutex<std::result::Result<Value, String>>,
    structured: Mutex<VecDeque<std::result::Result<Value, String>>>,
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
    complete_calls: AtomicUsize,
    structured_calls: AtomicUsize,
}

impl MockReasoner {
    pub fn new() -> Self {
        Self::with_reply("mock answer")
    }

    /// Every free-text call returns `text`.
    pub fn with_reply(text: &str) -> Self {
        Self {
            default_reply: Mutex::new(Ok(text.to_string())),
            replies: Mutex::new(VecDeque::new()),
            default_structured: Mutex::new(Ok(serde_json::json!({"selected_urls": []}))),
            structured: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            complete_calls: AtomicUsize::new(0),
            structured_calls: AtomicUsize::new(0),
        }
    }

    /// Every free-text call fails.
    pub fn failing(message: &str) -> Self {
        let reasoner = Self::new();
        *reasoner.default_reply.lock().unwrap() = Err(message.to_string());
        reasoner
    }

    pub fn queue_reply(&self, text: &str) {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
    }

    pub fn queue_failure(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// Every structured call returns `value`.
    pub fn with_structured(self, value: Value) -> Self {
        *self.default_structured.lock().unwrap() = Ok(value);
        self
    }

    /// Every structured call fails.
    pub fn with_structured_failure(self, message: &str) -> Self {
        *self.default_structured.lock().unwrap() = Err(message.to_string());
        self
    }

    pub fn queue_structured(&self, value: Value) {
        self.structured.lock().unwrap().push_back(Ok(value));
    }

    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    pub fn structured_calls(&self) -> usize {
        self.structured_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.complete_calls() + self.structured_calls()
    }

    /// Every prompt received, free-text and structured, in call order.
    pub fn prompts(&self) -> Vec<Vec<ChatMessage>> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockReasoner {
    fn default() -> Self {
        Self::new()
    }
}

impl ReasoningEngine for MockReasoner {
    fn complete(&self, messages: Vec<ChatMessage>) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            self.complete_calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(messages);
            let queued = self.replies.lock().unwrap().pop_front();
            let reply = queued.unwrap_or_else(|| self.default_reply.lock().unwrap().clone());
            reply.map_err(ScoutError::LlmRequest)
        })
    }

    fn complete_structured<'a>(
        &'a self,
        messages: Vec<ChatMessage>,
        _schema: &'a OutputSchema,
    ) -> BoxFuture<'a, Result<Value>> {
        Box::pin(async move {
            self.structured_calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(messages);
            let queued = self.structured.lock().unwrap().pop_front();
            let reply = queued.unwrap_or_else(|| self.default_structured.lock().unwrap().clone());
            reply.map_err(ScoutError::LlmRequest)
        })
    }
}

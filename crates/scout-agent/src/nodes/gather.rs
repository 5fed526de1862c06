use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use scout_core::error::Result;
use scout_core::traits::{SocialScrapeProvider, WebSearchProvider};
use scout_core::types::SearchEngine;

use super::{BING_SEARCH, GOOGLE_SEARCH, REDDIT_SEARCH, YANDEX_SEARCH};
use crate::graph::Node;
use crate::state::{StateField, StateUpdate, WorkflowState};

/// Runs the user's question against one web search engine.
///
/// The owned field holds the provider's record as JSON text, or `""` when
/// the question is empty or the provider had nothing.
pub struct SearchNode {
    engine: SearchEngine,
    provider: Arc<dyn WebSearchProvider>,
}

impl SearchNode {
    pub fn new(engine: SearchEngine, provider: Arc<dyn WebSearchProvider>) -> Self {
        Self { engine, provider }
    }

    pub fn field(&self) -> StateField {
        match self.engine {
            SearchEngine::Google => StateField::GoogleResults,
            SearchEngine::Bing => StateField::BingResults,
            SearchEngine::Yandex => StateField::YandexResults,
        }
    }

    async fn gather(&self, query: &str) -> Result<String> {
        match self.provider.search(query, self.engine).await? {
            Some(results) => Ok(serde_json::to_string(&results)?),
            None => Ok(String::new()),
        }
    }
}

impl Node<WorkflowState> for SearchNode {
    fn name(&self) -> &str {
        match self.engine {
            SearchEngine::Google => GOOGLE_SEARCH,
            SearchEngine::Bing => BING_SEARCH,
            SearchEngine::Yandex => YANDEX_SEARCH,
        }
    }

    fn reads(&self) -> Vec<StateField> {
        vec![StateField::UserInput]
    }

    fn writes(&self) -> Vec<StateField> {
        vec![self.field()]
    }

    fn run<'a>(&'a self, state: &'a WorkflowState) -> BoxFuture<'a, Result<StateUpdate>> {
        Box::pin(async move {
            let query = state.text(StateField::UserInput);
            if query.is_empty() {
                return Ok(StateUpdate::text(self.field(), ""));
            }

            let text = self.gather(query).await?;
            debug!(engine = %self.engine, results = %text, "Search results");
            Ok(StateUpdate::text(self.field(), text))
        })
    }

    fn degraded(&self) -> StateUpdate {
        StateUpdate::text(self.field(), "")
    }
}

/// Keyword search on the social platform.
pub struct SocialSearchNode {
    provider: Arc<dyn SocialScrapeProvider>,
}

impl SocialSearchNode {
    pub fn new(provider: Arc<dyn SocialScrapeProvider>) -> Self {
        Self { provider }
    }

    async fn gather(&self, query: &str) -> Result<String> {
        match self.provider.search_posts(query).await? {
            Some(posts) => Ok(serde_json::to_string(&posts)?),
            None => Ok(String::new()),
        }
    }
}

impl Node<WorkflowState> for SocialSearchNode {
    fn name(&self) -> &str {
        REDDIT_SEARCH
    }

    fn reads(&self) -> Vec<StateField> {
        vec![StateField::UserInput]
    }

    fn writes(&self) -> Vec<StateField> {
        vec![StateField::RedditResults]
    }

    fn run<'a>(&'a self, state: &'a WorkflowState) -> BoxFuture<'a, Result<StateUpdate>> {
        Box::pin(async move {
            let query = state.text(StateField::UserInput);
            if query.is_empty() {
                return Ok(StateUpdate::text(StateField::RedditResults, ""));
            }

            let text = self.gather(query).await?;
            debug!(results = %text, "Reddit results");
            Ok(StateUpdate::text(StateField::RedditResults, text))
        })
    }

    fn degraded(&self) -> StateUpdate {
        StateUpdate::text(StateField::RedditResults, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphState;
    use scout_test_utils::{fixtures, MockSearch, MockSocial, Scripted};

    async fn run_node(node: &dyn Node<WorkflowState>, state: WorkflowState) -> WorkflowState {
        let update = node.run(&state).await.unwrap();
        let mut state = state;
        state.apply(update).unwrap();
        state
    }

    #[tokio::test]
    async fn empty_question_skips_every_provider() {
        let search = Arc::new(MockSearch::new());
        let social = Arc::new(MockSocial::new());

        for engine in SearchEngine::ALL {
            let node = SearchNode::new(engine, search.clone());
            let state = run_node(&node, WorkflowState::new("")).await;
            assert_eq!(state.text(node.field()), "");
            assert!(state.selected_urls.is_none());
        }
        let state = run_node(&SocialSearchNode::new(social.clone()), WorkflowState::default()).await;
        assert_eq!(state.reddit_results.as_deref(), Some(""));

        assert_eq!(search.calls(), 0);
        assert_eq!(social.calls(), 0);
    }

    #[tokio::test]
    async fn missing_question_writes_empty() {
        let search = Arc::new(MockSearch::new());
        let node = SearchNode::new(SearchEngine::Yandex, search.clone());
        let state = run_node(&node, WorkflowState::default()).await;
        assert_eq!(state.yandex_results.as_deref(), Some(""));
        assert_eq!(search.calls(), 0);
    }

    #[tokio::test]
    async fn results_are_written_verbatim() {
        let search = Arc::new(MockSearch::new());
        for engine in SearchEngine::ALL {
            let node = SearchNode::new(engine, search.clone());
            let state = run_node(&node, WorkflowState::new("rust")).await;
            let expected = serde_json::to_string(&fixtures::serp_results(engine)).unwrap();
            assert_eq!(state.text(node.field()), expected);
        }
        assert_eq!(search.calls(), 3);
        assert!(search.queries().iter().all(|(_, q)| q == "rust"));

        let social = Arc::new(MockSocial::new());
        let state = run_node(&SocialSearchNode::new(social), WorkflowState::new("rust")).await;
        assert_eq!(
            state.text(StateField::RedditResults),
            serde_json::to_string(&fixtures::social_posts()).unwrap()
        );
    }

    #[tokio::test]
    async fn no_data_writes_empty() {
        let search = Arc::new(MockSearch::new().script(SearchEngine::Bing, Scripted::Missing));
        let bing = SearchNode::new(SearchEngine::Bing, search.clone());
        assert_eq!(run_node(&bing, WorkflowState::new("q")).await.text(StateField::BingResults), "");

        let social = Arc::new(MockSocial::new().with_posts(Scripted::Missing));
        let state = run_node(&SocialSearchNode::new(social), WorkflowState::new("q")).await;
        assert_eq!(state.reddit_results.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn provider_failure_is_returned() {
        let search = Arc::new(
            MockSearch::new().script(SearchEngine::Google, Scripted::Fail("HTTP 503".into())),
        );
        let google = SearchNode::new(SearchEngine::Google, search.clone());
        let err = google.run(&WorkflowState::new("q")).await.unwrap_err();
        assert!(err.to_string().contains("HTTP 503"));
        assert_eq!(google.degraded(), StateUpdate::text(StateField::GoogleResults, ""));

        let social = Arc::new(MockSocial::new().with_posts(Scripted::Fail("timeout".into())));
        let node = SocialSearchNode::new(social.clone());
        assert!(node.run(&WorkflowState::new("q")).await.is_err());
        assert_eq!(node.degraded(), StateUpdate::text(StateField::RedditResults, ""));
        assert_eq!(social.search_calls(), 1);
    }

    #[test]
    fn names_and_fields() {
        let search = Arc::new(MockSearch::new());
        let node = SearchNode::new(SearchEngine::Bing, search);
        assert_eq!(node.name(), "bing_search");
        assert_eq!(node.writes(), vec![StateField::BingResults]);
        assert_eq!(node.degraded(), StateUpdate::text(StateField::BingResults, ""));

        let social = SocialSearchNode::new(Arc::new(MockSocial::new()));
        assert_eq!(social.name(), "reddit_search");
        assert_eq!(social.writes(), vec![StateField::RedditResults]);
    }
}

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::info;

use scout_core::error::Result;
use scout_core::traits::ReasoningEngine;
use scout_core::types::OutputSchema;

use super::SELECT_REDDIT_URLS;
use crate::graph::Node;
use crate::prompts;
use crate::state::{StateField, StateUpdate, WorkflowState};
use crate::structured::{StructuredReply, UrlSelection};

/// Asks the reasoning engine which social posts are worth reading in full.
pub struct UrlSelectionNode {
    reasoner: Arc<dyn ReasoningEngine>,
    schema: OutputSchema,
}

impl UrlSelectionNode {
    pub fn new(reasoner: Arc<dyn ReasoningEngine>) -> Self {
        Self {
            reasoner,
            schema: UrlSelection::schema(),
        }
    }
}

impl Node<WorkflowState> for UrlSelectionNode {
    fn name(&self) -> &str {
        SELECT_REDDIT_URLS
    }

    fn reads(&self) -> Vec<StateField> {
        vec![StateField::UserInput, StateField::RedditResults]
    }

    fn writes(&self) -> Vec<StateField> {
        vec![StateField::SelectedUrls]
    }

    fn run<'a>(&'a self, state: &'a WorkflowState) -> BoxFuture<'a, Result<StateUpdate>> {
        Box::pin(async move {
            let question = state.text(StateField::UserInput);
            let reddit_results = state.text(StateField::RedditResults);
            if question.is_empty() || reddit_results.is_empty() {
                return Ok(StateUpdate::urls(Vec::new()));
            }

            let messages = prompts::url_selection(question, reddit_results);
            let reply = self.reasoner.complete_structured(messages, &self.schema).await?;
            let urls = StructuredReply::<UrlSelection>::decode(reply).into_urls();

            info!(count = urls.len(), "Selected Reddit URLs");
            for (i, url) in urls.iter().enumerate() {
                info!("{}. {}", i + 1, url);
            }
            Ok(StateUpdate::urls(urls))
        })
    }

    fn degraded(&self) -> StateUpdate {
        StateUpdate::urls(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_test_utils::MockReasoner;
    use serde_json::json;

    fn state(question: &str, reddit_results: &str) -> WorkflowState {
        WorkflowState {
            reddit_results: Some(reddit_results.to_string()),
            ..WorkflowState::new(question)
        }
    }

    async fn select(reasoner: MockReasoner, state: WorkflowState) -> (Vec<String>, Arc<MockReasoner>) {
        let reasoner = Arc::new(reasoner);
        let node = UrlSelectionNode::new(reasoner.clone());
        let update = node.run(&state).await.unwrap();
        let urls = match update.0.as_slice() {
            [(StateField::SelectedUrls, crate::state::StateValue::Urls(urls))] => urls.clone(),
            other => panic!("unexpected update {:?}", other),
        };
        (urls, reasoner)
    }

    #[tokio::test]
    async fn empty_inputs_skip_the_engine() {
        let (urls, reasoner) = select(MockReasoner::new(), state("q", "")).await;
        assert!(urls.is_empty());
        assert_eq!(reasoner.calls(), 0);

        let (urls, reasoner) = select(MockReasoner::new(), state("", "{\"parsed_posts\":[]}")).await;
        assert!(urls.is_empty());
        assert_eq!(reasoner.calls(), 0);
    }

    #[tokio::test]
    async fn schema_reply() {
        let reasoner = MockReasoner::new().with_structured(json!({"selected_urls": ["u1", "u2"]}));
        let (urls, reasoner) = select(reasoner, state("q", "posts")).await;
        assert_eq!(urls, vec!["u1", "u2"]);
        assert_eq!(reasoner.structured_calls(), 1);
        assert_eq!(reasoner.complete_calls(), 0);
    }

    #[tokio::test]
    async fn loose_mapping_reply() {
        let reasoner = MockReasoner::new().with_structured(json!({"selected_urls": ["u1", 3], "why": "x"}));
        let (urls, _) = select(reasoner, state("q", "posts")).await;
        assert_eq!(urls, vec!["u1"]);
    }

    #[tokio::test]
    async fn unexpected_reply_shape() {
        let reasoner = MockReasoner::new().with_structured(json!("I picked u1 and u2"));
        let (urls, _) = select(reasoner, state("q", "posts")).await;
        assert!(urls.is_empty());
    }

    #[tokio::test]
    async fn engine_error_is_returned() {
        let reasoner = Arc::new(MockReasoner::new().with_structured_failure("rate limited"));
        let node = UrlSelectionNode::new(reasoner.clone());
        let err = node.run(&state("q", "posts")).await.unwrap_err();
        assert!(err.to_string().contains("rate limited"));
        assert_eq!(node.degraded(), StateUpdate::urls(Vec::new()));
        assert_eq!(reasoner.structured_calls(), 1);
    }

    #[tokio::test]
    async fn each_run_asks_again() {
        let reasoner = Arc::new(MockReasoner::new().with_structured_failure("overloaded"));
        reasoner.queue_structured(json!({"selected_urls": ["u1"]}));
        let node = UrlSelectionNode::new(reasoner.clone());

        let first = node.run(&state("q", "posts")).await.unwrap();
        assert_eq!(first, StateUpdate::urls(vec!["u1".to_string()]));
        assert!(node.run(&state("q", "posts")).await.is_err());
        assert_eq!(reasoner.structured_calls(), 2);
    }

    #[tokio::test]
    async fn prompt_carries_question_and_posts() {
        let (_, reasoner) = select(MockReasoner::new(), state("best editor?", "POSTS_JSON")).await;
        let prompt = &reasoner.prompts()[0];
        assert!(prompt[1].content.contains("best editor?"));
        assert!(prompt[1].content.contains("POSTS_JSON"));
    }
}

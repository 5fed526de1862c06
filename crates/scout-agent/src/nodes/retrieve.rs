use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{info, warn};

use scout_core::error::Result;
use scout_core::traits::{ReasoningEngine, SocialScrapeProvider};

use super::RETRIEVE_REDDIT_POSTS;
use crate::graph::Node;
use crate::prompts;
use crate::state::{StateField, StateUpdate, WorkflowState};

/// Fetches comments for the selected posts and has the reasoning engine
/// digest them into `post_detail_data`.
pub struct PostRetrievalNode {
    social: Arc<dyn SocialScrapeProvider>,
    reasoner: Arc<dyn ReasoningEngine>,
}

impl PostRetrievalNode {
    pub fn new(social: Arc<dyn SocialScrapeProvider>, reasoner: Arc<dyn ReasoningEngine>) -> Self {
        Self { social, reasoner }
    }

    async fn digest(&self, state: &WorkflowState) -> Result<String> {
        let Some(details) = self.social.fetch_post_details(state.urls()).await? else {
            warn!("Post detail job returned no data");
            return Ok(String::new());
        };

        info!(comments = details.parsed_comments.len(), "Retrieved Reddit comments");
        if details.parsed_comments.is_empty() {
            return Ok(String::new());
        }

        let messages = prompts::reddit_digest(
            state.text(StateField::UserInput),
            state.text(StateField::RedditResults),
            &details.parsed_comments,
        );
        self.reasoner.complete(messages).await
    }
}

impl Node<WorkflowState> for PostRetrievalNode {
    fn name(&self) -> &str {
        RETRIEVE_REDDIT_POSTS
    }

    fn reads(&self) -> Vec<StateField> {
        vec![
            StateField::UserInput,
            StateField::RedditResults,
            StateField::SelectedUrls,
        ]
    }

    fn writes(&self) -> Vec<StateField> {
        vec![StateField::PostDetailData]
    }

    fn run<'a>(&'a self, state: &'a WorkflowState) -> BoxFuture<'a, Result<StateUpdate>> {
        Box::pin(async move {
            if state.urls().is_empty() {
                return Ok(StateUpdate::text(StateField::PostDetailData, ""));
            }
            let text = self.digest(state).await?;
            Ok(StateUpdate::text(StateField::PostDetailData, text))
        })
    }

    fn degraded(&self) -> StateUpdate {
        StateUpdate::text(StateField::PostDetailData, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphState;
    use scout_core::types::PostDetails;
    use scout_test_utils::{MockReasoner, MockSocial, Scripted};

    fn state(urls: &[&str]) -> WorkflowState {
        WorkflowState {
            reddit_results: Some("POSTS".into()),
            selected_urls: Some(urls.iter().map(|u| u.to_string()).collect()),
            ..WorkflowState::new("which runtime?")
        }
    }

    async fn retrieve(social: &Arc<MockSocial>, reasoner: &Arc<MockReasoner>, state: WorkflowState) -> String {
        let node = PostRetrievalNode::new(social.clone(), reasoner.clone());
        let mut state = state;
        let update = node.run(&state).await.unwrap();
        state.apply(update).unwrap();
        state.text(StateField::PostDetailData).to_string()
    }

    #[tokio::test]
    async fn no_urls_no_calls() {
        let social = Arc::new(MockSocial::new());
        let reasoner = Arc::new(MockReasoner::new());
        assert_eq!(retrieve(&social, &reasoner, state(&[])).await, "");

        let unset = WorkflowState::new("q");
        assert_eq!(retrieve(&social, &reasoner, unset).await, "");

        assert_eq!(social.calls(), 0);
        assert_eq!(reasoner.calls(), 0);
    }

    #[tokio::test]
    async fn comments_are_digested_once() {
        let social = Arc::new(MockSocial::new());
        let reasoner = Arc::new(MockReasoner::with_reply("digest of 3 comments"));

        let text = retrieve(&social, &reasoner, state(&["u1", "u2"])).await;

        assert_eq!(text, "digest of 3 comments");
        assert_eq!(social.requested_urls(), vec![vec!["u1".to_string(), "u2".to_string()]]);
        assert_eq!(reasoner.complete_calls(), 1);
        let prompt = &reasoner.prompts()[0][1].content;
        assert!(prompt.contains("which runtime?"));
        assert!(prompt.contains("POSTS"));
        assert!(prompt.contains("Comment number 2"));
    }

    #[tokio::test]
    async fn provider_error_is_returned() {
        let social = Arc::new(MockSocial::new().with_details(Scripted::Fail("job failed".into())));
        let reasoner = Arc::new(MockReasoner::new());
        let node = PostRetrievalNode::new(social.clone(), reasoner.clone());
        assert!(node.run(&state(&["u1"])).await.is_err());
        assert_eq!(node.degraded(), StateUpdate::text(StateField::PostDetailData, ""));
        assert_eq!(social.detail_calls(), 1);
        assert_eq!(reasoner.calls(), 0);
    }

    #[tokio::test]
    async fn timed_out_job_or_no_comments_skip_the_engine() {
        let reasoner = Arc::new(MockReasoner::new());

        let social = Arc::new(MockSocial::new().with_details(Scripted::Missing));
        assert_eq!(retrieve(&social, &reasoner, state(&["u1"])).await, "");

        let social = Arc::new(MockSocial::new().with_details(Scripted::Value(PostDetails::default())));
        assert_eq!(retrieve(&social, &reasoner, state(&["u1"])).await, "");

        assert_eq!(reasoner.calls(), 0);
    }

    #[tokio::test]
    async fn engine_error_is_returned() {
        let social = Arc::new(MockSocial::new());
        let reasoner = Arc::new(MockReasoner::failing("overloaded"));
        let node = PostRetrievalNode::new(social, reasoner.clone());
        let err = node.run(&state(&["u1"])).await.unwrap_err();
        assert!(err.to_string().contains("overloaded"));
        assert_eq!(reasoner.complete_calls(), 1);
    }
}

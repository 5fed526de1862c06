use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use scout_core::error::Result;
use scout_core::traits::ReasoningEngine;
use scout_core::types::ChatMessage;

use super::{
    ANALYZE_BING_RESULTS, ANALYZE_GOOGLE_RESULTS, ANALYZE_REDDIT_RESULTS,
    ANALYZE_YANDEX_RESULTS,
};
use crate::graph::Node;
use crate::prompts;
use crate::state::{StateField, StateUpdate, WorkflowState};

/// Where an analysis node's material comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Google,
    Bing,
    Yandex,
    Reddit,
}

impl Source {
    pub const ALL: [Source; 4] = [Self::Google, Self::Bing, Self::Yandex, Self::Reddit];

    /// The field that must be non-empty for the analysis to run.
    pub fn material(&self) -> StateField {
        match self {
            Self::Google => StateField::GoogleResults,
            Self::Bing => StateField::BingResults,
            Self::Yandex => StateField::YandexResults,
            Self::Reddit => StateField::PostDetailData,
        }
    }

    pub fn output(&self) -> StateField {
        match self {
            Self::Google => StateField::GoogleAnalysis,
            Self::Bing => StateField::BingAnalysis,
            Self::Yandex => StateField::YandexAnalysis,
            Self::Reddit => StateField::RedditAnalysis,
        }
    }

    fn prompt(&self, state: &WorkflowState) -> Vec<ChatMessage> {
        let question = state.text(StateField::UserInput);
        let material = state.text(self.material());
        match self {
            Self::Google => prompts::google_analysis(question, material),
            Self::Bing => prompts::bing_analysis(question, material),
            Self::Yandex => prompts::yandex_analysis(question, material),
            Self::Reddit => prompts::reddit_analysis(
                question,
                state.text(StateField::RedditResults),
                material,
            ),
        }
    }
}

/// One reasoning call over a single source's material.
pub struct AnalysisNode {
    source: Source,
    reasoner: Arc<dyn ReasoningEngine>,
}

impl AnalysisNode {
    pub fn new(source: Source, reasoner: Arc<dyn ReasoningEngine>) -> Self {
        Self { source, reasoner }
    }

    pub fn source(&self) -> Source {
        self.source
    }
}

impl Node<WorkflowState> for AnalysisNode {
    fn name(&self) -> &str {
        match self.source {
            Source::Google => ANALYZE_GOOGLE_RESULTS,
            Source::Bing => ANALYZE_BING_RESULTS,
            Source::Yandex => ANALYZE_YANDEX_RESULTS,
            Source::Reddit => ANALYZE_REDDIT_RESULTS,
        }
    }

    fn reads(&self) -> Vec<StateField> {
        let mut fields = vec![StateField::UserInput, self.source.material()];
        if self.source == Source::Reddit {
            fields.push(StateField::RedditResults);
        }
        fields
    }

    fn writes(&self) -> Vec<StateField> {
        vec![self.source.output()]
    }

    fn run<'a>(&'a self, state: &'a WorkflowState) -> BoxFuture<'a, Result<StateUpdate>> {
        Box::pin(async move {
            let output = self.source.output();
            if state.text(self.source.material()).is_empty() {
                debug!(node = self.name(), "No material, skipping analysis");
                return Ok(StateUpdate::text(output, ""));
            }

            let reply = self.reasoner.complete(self.source.prompt(state)).await?;
            Ok(StateUpdate::text(output, reply))
        })
    }

    fn degraded(&self) -> StateUpdate {
        StateUpdate::text(self.source.output(), "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphState;
    use scout_test_utils::MockReasoner;

    fn full_state() -> WorkflowState {
        WorkflowState {
            google_results: Some("G".into()),
            bing_results: Some("B".into()),
            yandex_results: Some("Y".into()),
            reddit_results: Some("R".into()),
            post_detail_data: Some("D".into()),
            ..WorkflowState::new("q")
        }
    }

    async fn analyze(source: Source, reasoner: &Arc<MockReasoner>, state: &WorkflowState) -> String {
        let node = AnalysisNode::new(source, reasoner.clone());
        let mut merged = state.clone();
        merged.apply(node.run(state).await.unwrap()).unwrap();
        merged.text(source.output()).to_string()
    }

    #[tokio::test]
    async fn empty_material_skips_the_engine() {
        let reasoner = Arc::new(MockReasoner::new());
        let state = WorkflowState {
            reddit_results: Some("R".into()),
            post_detail_data: Some(String::new()),
            ..WorkflowState::new("q")
        };
        for source in Source::ALL {
            assert_eq!(analyze(source, &reasoner, &state).await, "");
        }
        assert_eq!(reasoner.calls(), 0);
    }

    #[tokio::test]
    async fn reply_is_written_verbatim() {
        let reasoner = Arc::new(MockReasoner::with_reply("  analysis text\n"));
        let state = full_state();
        for source in Source::ALL {
            assert_eq!(analyze(source, &reasoner, &state).await, "  analysis text\n");
        }
        assert_eq!(reasoner.complete_calls(), 4);
    }

    #[tokio::test]
    async fn reddit_prompt_uses_digest_and_posts() {
        let reasoner = Arc::new(MockReasoner::new());
        analyze(Source::Reddit, &reasoner, &full_state()).await;
        let prompt = &reasoner.prompts()[0][1].content;
        assert!(prompt.contains("Posts found (JSON):\nR"));
        assert!(prompt.contains("Comment digest:\nD"));
    }

    #[tokio::test]
    async fn engine_error_is_returned_for_every_source() {
        let reasoner = Arc::new(MockReasoner::failing("500"));
        let state = full_state();
        for source in Source::ALL {
            let node = AnalysisNode::new(source, reasoner.clone());
            assert!(node.run(&state).await.is_err());
            assert_eq!(node.degraded(), StateUpdate::text(source.output(), ""));
        }
        assert_eq!(reasoner.complete_calls(), 4);
    }

    #[test]
    fn declarations() {
        let reasoner: Arc<dyn ReasoningEngine> = Arc::new(MockReasoner::new());
        let node = AnalysisNode::new(Source::Reddit, reasoner.clone());
        assert_eq!(node.name(), "analyze_reddit_results");
        assert!(node.reads().contains(&StateField::PostDetailData));
        assert_eq!(node.writes(), vec![StateField::RedditAnalysis]);

        let node = AnalysisNode::new(Source::Yandex, reasoner);
        assert_eq!(node.reads(), vec![StateField::UserInput, StateField::YandexResults]);
    }
}

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::info;

use scout_core::error::Result;
use scout_core::traits::ReasoningEngine;

use super::{Source, SYNTHESIZE_FINAL_ANSWER};
use crate::graph::Node;
use crate::prompts;
use crate::state::{StateField, StateUpdate, WorkflowState};

/// Terminal node: merges the four analyses into `final_answer`.
pub struct SynthesisNode {
    reasoner: Arc<dyn ReasoningEngine>,
}

impl SynthesisNode {
    pub fn new(reasoner: Arc<dyn ReasoningEngine>) -> Self {
        Self { reasoner }
    }
}

impl Node<WorkflowState> for SynthesisNode {
    fn name(&self) -> &str {
        SYNTHESIZE_FINAL_ANSWER
    }

    fn reads(&self) -> Vec<StateField> {
        let mut fields = vec![StateField::UserInput];
        fields.extend(Source::ALL.iter().map(Source::output));
        fields
    }

    fn writes(&self) -> Vec<StateField> {
        vec![StateField::FinalAnswer]
    }

    fn run<'a>(&'a self, state: &'a WorkflowState) -> BoxFuture<'a, Result<StateUpdate>> {
        Box::pin(async move {
            let [google, bing, yandex, reddit] = Source::ALL.map(|s| state.text(s.output()));
            if [google, bing, yandex, reddit].iter().all(|a| a.is_empty()) {
                return Ok(StateUpdate::text(StateField::FinalAnswer, ""));
            }

            let messages = prompts::synthesis(
                state.text(StateField::UserInput),
                google,
                bing,
                yandex,
                reddit,
            );
            let answer = self.reasoner.complete(messages).await?;
            info!(chars = answer.len(), "Final answer synthesized");
            Ok(StateUpdate::text(StateField::FinalAnswer, answer))
        })
    }

    fn degraded(&self) -> StateUpdate {
        StateUpdate::text(StateField::FinalAnswer, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphState;
    use scout_test_utils::MockReasoner;

    async fn synthesize(reasoner: &Arc<MockReasoner>, state: WorkflowState) -> String {
        let node = SynthesisNode::new(reasoner.clone());
        let mut state = state;
        let update = node.run(&state).await.unwrap();
        state.apply(update).unwrap();
        state.text(StateField::FinalAnswer).to_string()
    }

    #[tokio::test]
    async fn all_empty_skips_the_engine() {
        let reasoner = Arc::new(MockReasoner::new());

        // Unset analyses count as empty.
        assert_eq!(synthesize(&reasoner, WorkflowState::new("q")).await, "");

        let blank = WorkflowState {
            google_analysis: Some(String::new()),
            bing_analysis: Some(String::new()),
            yandex_analysis: Some(String::new()),
            reddit_analysis: None,
            ..WorkflowState::new("q")
        };
        assert_eq!(synthesize(&reasoner, blank).await, "");
        assert_eq!(reasoner.calls(), 0);
    }

    #[tokio::test]
    async fn one_analysis_is_enough() {
        let reasoner = Arc::new(MockReasoner::with_reply("the answer"));
        let state = WorkflowState {
            yandex_analysis: Some("yandex found something".into()),
            ..WorkflowState::new("q")
        };

        assert_eq!(synthesize(&reasoner, state).await, "the answer");
        assert_eq!(reasoner.complete_calls(), 1);
        let prompt = &reasoner.prompts()[0][1].content;
        assert!(prompt.contains("Yandex analysis:\nyandex found something"));
        assert!(prompt.contains("Google analysis: (no data)"));
    }

    #[tokio::test]
    async fn engine_error_is_returned() {
        let reasoner = Arc::new(MockReasoner::failing("down"));
        let node = SynthesisNode::new(reasoner.clone());
        let state = WorkflowState {
            google_analysis: Some("g".into()),
            ..WorkflowState::new("q")
        };
        assert!(node.run(&state).await.is_err());
        assert_eq!(node.degraded(), StateUpdate::text(StateField::FinalAnswer, ""));
        assert_eq!(reasoner.complete_calls(), 1);
    }
}

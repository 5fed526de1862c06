use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::info;

use scout_core::error::{Result, ScoutError};
use scout_core::traits::{ReasoningEngine, SocialScrapeProvider, WebSearchProvider};
use scout_core::types::{ChatMessage, OutputSchema, PostDetails, SearchEngine, SerpResults, SocialPosts};

use crate::graph::{CompiledGraph, ExecutionResult, GraphStructure, StateGraph, END, START};
use crate::nodes::*;
use crate::state::WorkflowState;

const GATHERING: [&str; 4] = [GOOGLE_SEARCH, BING_SEARCH, YANDEX_SEARCH, REDDIT_SEARCH];
const ANALYSES: [&str; 4] = [
    ANALYZE_GOOGLE_RESULTS,
    ANALYZE_BING_RESULTS,
    ANALYZE_YANDEX_RESULTS,
    ANALYZE_REDDIT_RESULTS,
];

/// The multi-source research pipeline:
///
/// ```text
/// START → {google, bing, yandex, reddit}_search → select_reddit_urls
///       → retrieve_reddit_posts → analyze_{google, bing, yandex, reddit}_results
///       → synthesize_final_answer → END
/// ```
pub struct ResearchWorkflow {
    graph: CompiledGraph<WorkflowState>,
}

impl ResearchWorkflow {
    pub fn new(
        search: Arc<dyn WebSearchProvider>,
        social: Arc<dyn SocialScrapeProvider>,
        reasoner: Arc<dyn ReasoningEngine>,
    ) -> Result<Self> {
        let mut graph: StateGraph<WorkflowState> = StateGraph::new();

        for engine in SearchEngine::ALL {
            graph.add_node(Arc::new(SearchNode::new(engine, search.clone())))?;
        }
        graph.add_node(Arc::new(SocialSearchNode::new(social.clone())))?;
        graph.add_node(Arc::new(UrlSelectionNode::new(reasoner.clone())))?;
        graph.add_node(Arc::new(PostRetrievalNode::new(social, reasoner.clone())))?;
        for source in Source::ALL {
            graph.add_node(Arc::new(AnalysisNode::new(source, reasoner.clone())))?;
        }
        graph.add_node(Arc::new(SynthesisNode::new(reasoner)))?;

        for node in GATHERING {
            graph.add_edge(START, node)?;
            graph.add_edge(node, SELECT_REDDIT_URLS)?;
        }
        graph.add_edge(SELECT_REDDIT_URLS, RETRIEVE_REDDIT_POSTS)?;
        for node in ANALYSES {
            graph.add_edge(RETRIEVE_REDDIT_POSTS, node)?;
            graph.add_edge(node, SYNTHESIZE_FINAL_ANSWER)?;
        }
        graph.add_edge(SYNTHESIZE_FINAL_ANSWER, END)?;

        Ok(Self {
            graph: graph.compile()?,
        })
    }

    pub fn graph(&self) -> &CompiledGraph<WorkflowState> {
        &self.graph
    }

    /// The validated topology, wired without any external capabilities.
    pub fn topology() -> Result<GraphStructure> {
        let offline = Arc::new(Offline);
        let workflow = Self::new(offline.clone(), offline.clone(), offline)?;
        Ok(workflow.graph.structure())
    }

    /// Run one question and return the full final state with per-node results.
    pub async fn run(&self, user_input: &str) -> Result<ExecutionResult<WorkflowState>> {
        let result = self.graph.invoke(WorkflowState::new(user_input)).await?;
        let degraded = result.degraded_nodes();
        if !degraded.is_empty() {
            info!(nodes = ?degraded, "Run finished with degraded nodes");
        }
        Ok(result)
    }

    /// Run one question and return only the final answer. An empty answer
    /// means no source produced anything usable.
    pub async fn run_query(&self, user_input: &str) -> Result<String> {
        let result = self.run(user_input).await?;
        Ok(result.state.final_answer.unwrap_or_default())
    }
}

/// Stands in for every capability when only the graph shape is needed.
struct Offline;

impl WebSearchProvider for Offline {
    fn search<'a>(
        &'a self,
        _query: &'a str,
        _engine: SearchEngine,
    ) -> BoxFuture<'a, Result<Option<SerpResults>>> {
        Box::pin(async { Ok(None) })
    }
}

impl SocialScrapeProvider for Offline {
    fn search_posts<'a>(&'a self, _query: &'a str) -> BoxFuture<'a, Result<Option<SocialPosts>>> {
        Box::pin(async { Ok(None) })
    }

    fn fetch_post_details<'a>(
        &'a self,
        _urls: &'a [String],
    ) -> BoxFuture<'a, Result<Option<PostDetails>>> {
        Box::pin(async { Ok(None) })
    }
}

impl ReasoningEngine for Offline {
    fn complete(&self, _messages: Vec<ChatMessage>) -> BoxFuture<'_, Result<String>> {
        Box::pin(async { Err(ScoutError::LlmRequest("no reasoning engine configured".into())) })
    }

    fn complete_structured<'a>(
        &'a self,
        _messages: Vec<ChatMessage>,
        _schema: &'a OutputSchema,
    ) -> BoxFuture<'a, Result<serde_json::Value>> {
        Box::pin(async { Err(ScoutError::LlmRequest("no reasoning engine configured".into())) })
    }
}

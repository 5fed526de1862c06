use std::any::Any;
use std::collections::{HashMap, HashSet, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tracing::{debug, error, info, info_span, warn, Instrument};

use scout_core::error::{Result, ScoutError};

use super::edge::{Edge, GraphStructure};
use super::{GraphState, Node, END, START};

/// How a node's run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeStatus {
    Completed,
    /// The node errored or panicked; its degraded update was merged.
    Degraded { reason: String },
}

/// Result of executing a single node.
#[derive(Debug, Clone)]
pub struct NodeResult {
    pub node_id: String,
    pub status: NodeStatus,
    /// Execution time in milliseconds.
    pub elapsed_ms: u64,
}

/// Result of executing an entire graph.
#[derive(Debug, Clone)]
pub struct ExecutionResult<S> {
    /// The final merged state.
    pub state: S,
    /// Per-node results in completion order.
    pub node_results: Vec<NodeResult>,
    pub total_elapsed_ms: u64,
}

impl<S> ExecutionResult<S> {
    /// Whether every node completed without degrading.
    pub fn succeeded(&self) -> bool {
        self.node_results
            .iter()
            .all(|r| r.status == NodeStatus::Completed)
    }

    pub fn degraded_nodes(&self) -> Vec<&str> {
        self.node_results
            .iter()
            .filter(|r| r.status != NodeStatus::Completed)
            .map(|r| r.node_id.as_str())
            .collect()
    }
}

/// Graph builder. Nodes and edges are collected here and validated by
/// [`StateGraph::compile`].
pub struct StateGraph<S: GraphState> {
    nodes: Vec<Arc<dyn Node<S>>>,
    index: HashMap<String, usize>,
    edges: Vec<Edge>,
}

impl<S: GraphState> Default for StateGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GraphState> StateGraph<S> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
        }
    }

    /// Register a node under its own name.
    pub fn add_node(&mut self, node: Arc<dyn Node<S>>) -> Result<&mut Self> {
        let name = node.name().to_string();
        if name == START || name == END {
            return Err(ScoutError::GraphValidation(format!(
                "'{}' is a reserved node name",
                name
            )));
        }
        if self.index.contains_key(&name) {
            return Err(ScoutError::GraphValidation(format!(
                "node '{}' is already present",
                name
            )));
        }
        self.index.insert(name, self.nodes.len());
        self.nodes.push(node);
        Ok(self)
    }

    /// Declare that `to` depends on `from`. Endpoints are checked at compile time.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> Result<&mut Self> {
        let edge = Edge::new(from, to);
        if edge.from == END {
            return Err(ScoutError::GraphValidation("END cannot be a start node".into()));
        }
        if edge.to == START {
            return Err(ScoutError::GraphValidation("START cannot be an end node".into()));
        }
        if edge.from == START && edge.to == END {
            return Err(ScoutError::GraphValidation(
                "START cannot connect directly to END".into(),
            ));
        }
        self.edges.push(edge);
        Ok(self)
    }

    /// Validate the graph and build an executable plan.
    pub fn compile(self) -> Result<CompiledGraph<S>> {
        let n = self.nodes.len();
        let invalid = |msg: String| Err(ScoutError::GraphValidation(msg));

        if !self.edges.iter().any(Edge::is_entry) {
            return invalid("graph must have an entry edge from START".into());
        }
        if !self.edges.iter().any(Edge::is_exit) {
            return invalid("graph must have at least one edge into END".into());
        }

        let mut seen = HashSet::new();
        for edge in &self.edges {
            for endpoint in [&edge.from, &edge.to] {
                if endpoint != START && endpoint != END && !self.index.contains_key(endpoint) {
                    return invalid(format!("edge {} references unknown node '{}'", edge, endpoint));
                }
            }
            if !seen.insert(edge) {
                return invalid(format!("duplicate edge {}", edge));
            }
        }

        let mut entry = Vec::new();
        let mut exits = vec![false; n];
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];

        for edge in &self.edges {
            match (edge.from.as_str(), edge.to.as_str()) {
                (START, to) => entry.push(self.index[to]),
                (from, END) => exits[self.index[from]] = true,
                (from, to) => {
                    let (from, to) = (self.index[from], self.index[to]);
                    successors[from].push(to);
                    predecessors[to].push(from);
                }
            }
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if predecessors[i].is_empty() && !entry.contains(&i) {
                return invalid(format!("node '{}' has no incoming edge", node.name()));
            }
            if successors[i].is_empty() && !exits[i] {
                return invalid(format!("node '{}' has no outgoing edge", node.name()));
            }
        }

        let in_degree: Vec<usize> = predecessors.iter().map(Vec::len).collect();
        let order = topological_sort(&successors, &in_degree).map_err(|stuck| {
            ScoutError::CyclicGraph(
                stuck
                    .into_iter()
                    .map(|i| self.nodes[i].name().to_string())
                    .collect(),
            )
        })?;

        validate_fields(&self.nodes, &predecessors, &order)?;

        Ok(CompiledGraph {
            nodes: self.nodes,
            edges: self.edges,
            entry,
            successors,
            in_degree,
            order,
        })
    }
}

/// Kahn's algorithm. On a cycle, returns the nodes that never reached
/// in-degree zero, in registration order.
fn topological_sort(
    successors: &[Vec<usize>],
    in_degree: &[usize],
) -> std::result::Result<Vec<usize>, Vec<usize>> {
    let mut remaining = in_degree.to_vec();
    let mut queue: VecDeque<usize> = (0..remaining.len()).filter(|&i| remaining[i] == 0).collect();
    let mut order = Vec::with_capacity(remaining.len());

    while let Some(i) = queue.pop_front() {
        order.push(i);
        for &next in &successors[i] {
            remaining[next] -= 1;
            if remaining[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    if order.len() == remaining.len() {
        Ok(order)
    } else {
        Err((0..remaining.len()).filter(|&i| remaining[i] > 0).collect())
    }
}

/// Single-writer discipline: owned fields are disjoint and never inputs, and
/// every field a node reads is an input or is owned by one of its ancestors.
fn validate_fields<S: GraphState>(
    nodes: &[Arc<dyn Node<S>>],
    predecessors: &[Vec<usize>],
    order: &[usize],
) -> Result<()> {
    let inputs = S::input_fields();
    let mut owner: HashMap<S::Field, usize> = HashMap::new();

    for (i, node) in nodes.iter().enumerate() {
        for field in node.writes() {
            if inputs.contains(&field) {
                return Err(ScoutError::GraphValidation(format!(
                    "node '{}' writes input field '{}'",
                    node.name(),
                    field
                )));
            }
            if let Some(&other) = owner.get(&field) {
                return Err(ScoutError::GraphValidation(format!(
                    "field '{}' is written by both '{}' and '{}'",
                    field,
                    nodes[other].name(),
                    node.name()
                )));
            }
            owner.insert(field, i);
        }
    }

    let mut ancestors: Vec<HashSet<usize>> = vec![HashSet::new(); nodes.len()];
    for &i in order {
        let mut set = HashSet::new();
        for &p in &predecessors[i] {
            set.insert(p);
            set.extend(ancestors[p].iter().copied());
        }
        ancestors[i] = set;
    }

    for (i, node) in nodes.iter().enumerate() {
        for field in node.reads() {
            if inputs.contains(&field) {
                continue;
            }
            match owner.get(&field) {
                None => {
                    return Err(ScoutError::GraphValidation(format!(
                        "node '{}' reads '{}' which no node writes",
                        node.name(),
                        field
                    )))
                }
                Some(w) if !ancestors[i].contains(w) => {
                    return Err(ScoutError::GraphValidation(format!(
                        "node '{}' reads '{}' before its writer '{}' has run",
                        node.name(),
                        field,
                        nodes[*w].name()
                    )))
                }
                Some(_) => {}
            }
        }
    }

    Ok(())
}

/// A node run that has settled, successfully or not.
struct Finished<S: GraphState> {
    index: usize,
    outcome: std::result::Result<Result<S::Update>, Box<dyn Any + Send>>,
    elapsed_ms: u64,
}

/// A validated graph, ready to run.
pub struct CompiledGraph<S: GraphState> {
    nodes: Vec<Arc<dyn Node<S>>>,
    edges: Vec<Edge>,
    entry: Vec<usize>,
    successors: Vec<Vec<usize>>,
    /// Number of node predecessors each node waits on.
    in_degree: Vec<usize>,
    order: Vec<usize>,
}

impl<S: GraphState> CompiledGraph<S> {
    /// Node names in a valid execution order.
    pub fn topological_order(&self) -> Vec<&str> {
        self.order.iter().map(|&i| self.nodes[i].name()).collect()
    }

    pub fn structure(&self) -> GraphStructure {
        GraphStructure {
            nodes: self
                .topological_order()
                .into_iter()
                .map(str::to_string)
                .collect(),
            edges: self.edges.clone(),
        }
    }

    /// Run the graph to completion from `initial`.
    ///
    /// Only orchestration errors are returned: an update touching a field the
    /// node did not declare, one the state refuses to merge, or an
    /// orchestration error raised by the node itself. Other node failures
    /// degrade instead.
    pub async fn invoke(&self, initial: S) -> Result<ExecutionResult<S>> {
        let run_id = uuid::Uuid::new_v4();
        self.execute(initial)
            .instrument(info_span!("workflow_run", run_id = %run_id))
            .await
    }

    async fn execute(&self, initial: S) -> Result<ExecutionResult<S>> {
        let start = Instant::now();
        let mut state = initial;
        let mut pending = self.in_degree.clone();
        let mut node_results = Vec::with_capacity(self.nodes.len());
        let mut running = FuturesUnordered::new();

        info!(nodes = self.nodes.len(), "Starting graph run");

        for &i in &self.entry {
            if pending[i] == 0 {
                running.push(self.launch(i, &state));
            }
        }

        while let Some(finished) = running.next().await {
            let node = &self.nodes[finished.index];
            let (update, status) = match finished.outcome {
                Ok(Ok(update)) => (update, NodeStatus::Completed),
                Ok(Err(e)) if e.is_orchestration() => {
                    error!(node = node.name(), error = %e, "Node hit an orchestration error, aborting run");
                    return Err(e);
                }
                Ok(Err(e)) => {
                    warn!(node = node.name(), error = %e, "Node failed, using degraded output");
                    (node.degraded(), NodeStatus::Degraded { reason: e.to_string() })
                }
                Err(panic) => {
                    let reason = format!("panicked: {}", panic_message(panic.as_ref()));
                    error!(node = node.name(), reason = %reason, "Node panicked, using degraded output");
                    (node.degraded(), NodeStatus::Degraded { reason })
                }
            };

            let declared = node.writes();
            if let Some(field) = S::update_fields(&update)
                .into_iter()
                .find(|f| !declared.contains(f))
            {
                return Err(ScoutError::UndeclaredWrite {
                    node: node.name().to_string(),
                    field: field.to_string(),
                });
            }
            state.apply(update)?;

            debug!(
                node = node.name(),
                elapsed_ms = finished.elapsed_ms,
                degraded = status != NodeStatus::Completed,
                "Node merged"
            );
            node_results.push(NodeResult {
                node_id: node.name().to_string(),
                status,
                elapsed_ms: finished.elapsed_ms,
            });

            for &next in &self.successors[finished.index] {
                pending[next] -= 1;
                if pending[next] == 0 {
                    running.push(self.launch(next, &state));
                }
            }
        }

        let total_elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            nodes_run = node_results.len(),
            total_elapsed_ms, "Graph run complete"
        );

        Ok(ExecutionResult {
            state,
            node_results,
            total_elapsed_ms,
        })
    }

    fn launch(&self, index: usize, state: &S) -> BoxFuture<'static, Finished<S>> {
        let node = Arc::clone(&self.nodes[index]);
        let snapshot = state.clone();
        debug!(node = node.name(), "Launching node");

        Box::pin(async move {
            let started = Instant::now();
            let outcome = AssertUnwindSafe(async { node.run(&snapshot).await })
                .catch_unwind()
                .await;
            Finished {
                index,
                outcome,
                elapsed_ms: started.elapsed().as_millis() as u64,
            }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

//! Graph execution engine: fan-out/fan-in dataflow over a shared state.
//!
//! A workflow is a DAG of [`Node`]s connected by [`Edge`]s, with the virtual
//! endpoints [`START`] and [`END`]. Each node declares the state fields it
//! reads and the fields it owns. `StateGraph::compile` rejects graphs where
//! two nodes own the same field, where a node reads a field no ancestor
//! writes, or where the edges form a cycle.
//!
//! Execution has AND-join semantics: a node is launched once every
//! predecessor has finished and its update has been merged. Nodes that
//! become eligible together run concurrently, each on its own snapshot of
//! the merged state. A node that errors or panics does not abort the run;
//! its declared degraded update is merged instead. Orchestration errors
//! (see `ScoutError::is_orchestration`) are the exception.

pub mod edge;
pub mod executor;

use std::fmt::{Debug, Display};
use std::hash::Hash;

use futures::future::BoxFuture;

use scout_core::error::Result;

pub use edge::{Edge, GraphStructure};
pub use executor::{CompiledGraph, ExecutionResult, NodeResult, NodeStatus, StateGraph};

/// Virtual entry point. Edges from `START` mark a node as an entry node.
pub const START: &str = "__start__";
/// Virtual exit point. Edges into `END` mark a node as terminal.
pub const END: &str = "__end__";

/// State threaded through a graph run.
///
/// Updates are explicit values so the executor can check, before merging,
/// that a node only touched the fields it declared.
pub trait GraphState: Clone + Send + Sync + 'static {
    type Field: Copy + Eq + Hash + Debug + Display + Send + Sync + 'static;
    type Update: Send + 'static;

    /// Fields set before the run starts. No node may write them.
    fn input_fields() -> Vec<Self::Field>;

    /// Fields an update would write.
    fn update_fields(update: &Self::Update) -> Vec<Self::Field>;

    /// Merge an update. Fields not named in the update are left untouched.
    fn apply(&mut self, update: Self::Update) -> Result<()>;
}

/// A unit of work in the graph.
pub trait Node<S: GraphState>: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn reads(&self) -> Vec<S::Field>;

    /// Fields this node owns. Write sets are disjoint across a graph.
    fn writes(&self) -> Vec<S::Field>;

    fn run<'a>(&'a self, state: &'a S) -> BoxFuture<'a, Result<S::Update>>;

    /// The update merged in place of a failed run: empty values for every
    /// owned field.
    fn degraded(&self) -> S::Update;
}

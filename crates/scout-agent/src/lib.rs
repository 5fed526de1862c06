pub mod graph;
pub mod nodes;
pub mod prompts;
pub mod state;
pub mod structured;
pub mod workflow;

pub use graph::{CompiledGraph, Edge, ExecutionResult, GraphStructure, NodeResult, NodeStatus, StateGraph};
pub use state::{StateField, StateUpdate, StateValue, WorkflowState};
pub use workflow::ResearchWorkflow;

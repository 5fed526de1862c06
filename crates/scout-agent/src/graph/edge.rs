use serde::{Deserialize, Serialize};

use super::{END, START};

/// A dependency between two nodes: `to` may not start before `from` finished.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Source node id, or [`START`].
    pub from: String,
    /// Target node id, or [`END`].
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn is_entry(&self) -> bool {
        self.from == START
    }

    pub fn is_exit(&self) -> bool {
        self.to == END
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Serializable view of a compiled graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStructure {
    /// Node names in topological order.
    pub nodes: Vec<String>,
    /// Edges in declaration order, including the START and END edges.
    pub edges: Vec<Edge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_and_exit() {
        assert!(Edge::new(START, "a").is_entry());
        assert!(Edge::new("a", END).is_exit());
        assert!(!Edge::new("a", "b").is_entry());
    }

    #[test]
    fn test_display() {
        assert_eq!(Edge::new("a", "b").to_string(), "a -> b");
    }

    #[test]
    fn test_structure_serializes() {
        let structure = GraphStructure {
            nodes: vec!["a".into()],
            edges: vec![Edge::new(START, "a"), Edge::new("a", END)],
        };
        let json = serde_json::to_value(&structure).unwrap();
        assert_eq!(json["edges"][0]["from"], START);
        assert_eq!(json["edges"][1]["to"], END);
    }
}

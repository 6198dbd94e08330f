use crate::Diagnostic;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    WorkflowInput,
    WorkflowOutput,
    CommandStep,
    ExpressionStep,
    /// Stands in for a `default` or a source-less `valueFrom`.
    Literal,
    /// Sits between the sources of an input and the input it computes.
    ValueFrom,
}

impl NodeKind {
    pub fn is_synthetic(self) -> bool {
        matches!(self, Self::Literal | Self::ValueFrom)
    }
}

/// A node statement as written to the output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderNode {
    /// Identifier from the workflow tree, or the generated name of a
    /// synthetic node.
    pub key: String,
    /// Quoted identifier used in the DOT text.
    pub dot_id: String,
    pub label: String,
    pub kind: NodeKind,
    pub peripheries: u32,
    pub fillcolor: Option<String>,
    /// Number of the workflow cluster the node was drawn in.
    pub cluster: usize,
}

/// An edge statement as flushed after all clusters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderEdge {
    pub source: String,
    pub target: String,
    pub label: Option<String>,
    pub double_arrow: bool,
}

/// Result of rendering one workflow tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendering {
    pub dot: String,
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Rendering {
    pub fn node(&self, key: &str) -> Option<&RenderNode> {
        self.nodes.iter().find(|node| node.key == key)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &RenderNode> {
        self.nodes.iter().filter(move |node| node.kind == kind)
    }

    pub fn incoming_edges<'a>(&'a self, dot_id: &'a str) -> impl Iterator<Item = &'a RenderEdge> + 'a {
        self.edges.iter().filter(move |edge| edge.target == dot_id)
    }

    pub fn outgoing_edges<'a>(&'a self, dot_id: &'a str) -> impl Iterator<Item = &'a RenderEdge> + 'a {
        self.edges.iter().filter(move |edge| edge.source == dot_id)
    }
}

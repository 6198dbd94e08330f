//! Mutable state of one rendering call.

use crate::emit::{DOUBLE_ARROWHEAD, Props, edge_statement, escape_quoted, node_statement};
use crate::{
    Diagnostic, NodeKind, RenderEdge, RenderNode, RenderOptions, Rendering, Repetition,
    apply_rewrites, before_hash, owning_process_id,
};
use std::collections::{HashMap, HashSet};

const INDENT_STEP: usize = 2;

/// What to draw for one node; the session decides its final identifier.
#[derive(Clone, Debug)]
pub struct NodeSpec<'a> {
    pub key: &'a str,
    pub label: String,
    pub kind: NodeKind,
    pub repetition: Repetition,
    pub fillcolor: Option<&'static str>,
}

/// One end of a buffered edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeEnd {
    id: String,
    step_hint: Option<String>,
    synthetic: bool,
}

impl EdgeEnd {
    pub fn port(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            step_hint: None,
            synthetic: false,
        }
    }

    /// A port reached through `step_id`; the step's own cluster wins when it
    /// embeds a workflow.
    pub fn via_step(id: impl Into<String>, step_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            step_hint: Some(step_id.into()),
            synthetic: false,
        }
    }

    pub fn synthetic(name: impl Into<String>) -> Self {
        Self {
            id: name.into(),
            step_hint: None,
            synthetic: true,
        }
    }

    fn lookup_keys(&self) -> Vec<&str> {
        if self.synthetic {
            return Vec::new();
        }
        let mut keys: Vec<&str> = Vec::with_capacity(3);
        let candidates = [
            self.step_hint.as_deref(),
            Some(owning_process_id(&self.id)),
            Some(before_hash(&self.id)),
        ];
        for key in candidates.into_iter().flatten() {
            if !key.is_empty() && !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

#[derive(Clone, Debug)]
struct PendingEnd {
    end: EdgeEnd,
    cluster: Option<usize>,
}

#[derive(Clone, Debug)]
struct PendingEdge {
    source: PendingEnd,
    target: PendingEnd,
    label: Option<String>,
    double_arrow: bool,
}

/// Counter, cluster registry, tool-step set and edge log for a single
/// rendering. Nothing here outlives the call that created it.
#[derive(Debug)]
pub struct RenderSession<'o> {
    options: &'o RenderOptions,
    out: String,
    indent: usize,
    next_uid: usize,
    clusters: HashMap<String, usize>,
    tool_steps: HashSet<String>,
    pending_edges: Vec<PendingEdge>,
    nodes: Vec<RenderNode>,
    edges: Vec<RenderEdge>,
    diagnostics: Vec<Diagnostic>,
}

impl<'o> RenderSession<'o> {
    pub fn new(options: &'o RenderOptions) -> Self {
        Self {
            options,
            out: String::new(),
            indent: 0,
            next_uid: 0,
            clusters: HashMap::new(),
            tool_steps: HashSet::new(),
            pending_edges: Vec::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        self.options
    }

    pub fn next_uid(&mut self) -> usize {
        self.next_uid += 1;
        self.next_uid
    }

    pub fn write_raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push(' ');
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent += INDENT_STEP;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(INDENT_STEP);
    }

    pub fn open_block(&mut self, header: &str) {
        self.line(&format!("{header} {{"));
        self.indent();
    }

    pub fn close_block(&mut self) {
        self.dedent();
        self.line("}");
    }

    pub fn register_cluster(&mut self, key: &str, cluster: usize) {
        tracing::debug!(key, cluster, "registering cluster");
        self.clusters.insert(key.to_string(), cluster);
    }

    pub fn cluster_of(&self, key: &str) -> Option<usize> {
        self.clusters.get(key).copied()
    }

    pub fn mark_tool_step(&mut self, step_id: &str) {
        self.tool_steps.insert(step_id.to_string());
    }

    pub fn is_tool_step(&self, id: &str) -> bool {
        self.tool_steps.contains(id)
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(rule = %diagnostic.rule, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    /// Writes a node statement inside the current block and returns its
    /// DOT identifier.
    pub fn emit_node(&mut self, cluster: usize, spec: NodeSpec<'_>) -> String {
        let rewritten = apply_rewrites(spec.key, &self.options.rewrites);
        let dot_id = if spec.kind.is_synthetic() {
            rewritten
        } else {
            format!("{rewritten}#{cluster}")
        };

        let mut props = Props::new().with("label", spec.label.as_str());
        props.set("peripheries", spec.repetition.count().to_string());
        if let Some(fill) = spec.fillcolor {
            props.set("fillcolor", fill);
        }
        self.line(&node_statement(&dot_id, &props));

        self.nodes.push(RenderNode {
            key: spec.key.to_string(),
            dot_id: dot_id.clone(),
            label: spec.label,
            kind: spec.kind,
            peripheries: spec.repetition.count(),
            fillcolor: spec.fillcolor.map(str::to_string),
            cluster,
        });
        dot_id
    }

    /// Buffers an edge; it is written by [`RenderSession::flush_edges`].
    pub fn emit_edge(
        &mut self,
        source: EdgeEnd,
        target: EdgeEnd,
        label: Option<&str>,
        double_arrow: bool,
    ) {
        let source = self.pending_end(source);
        let target = self.pending_end(target);
        self.pending_edges.push(PendingEdge {
            source,
            target,
            label: label.map(str::to_string),
            double_arrow,
        });
    }

    fn pending_end(&self, end: EdgeEnd) -> PendingEnd {
        let cluster = self.resolve_cluster(&end);
        PendingEnd { end, cluster }
    }

    fn resolve_cluster(&self, end: &EdgeEnd) -> Option<usize> {
        end.lookup_keys()
            .into_iter()
            .find_map(|key| self.cluster_of(key))
    }

    fn dot_id_for(&self, pending: &PendingEnd) -> String {
        let rewritten = apply_rewrites(&pending.end.id, &self.options.rewrites);
        // Clusters registered after the edge was buffered are picked up here.
        match pending.cluster.or_else(|| self.resolve_cluster(&pending.end)) {
            Some(cluster) => format!("{rewritten}#{cluster}"),
            None => rewritten,
        }
    }

    /// Writes every buffered edge, in the order it was buffered.
    pub fn flush_edges(&mut self) {
        let pending = std::mem::take(&mut self.pending_edges);
        for edge in pending {
            let source = self.dot_id_for(&edge.source);
            let target = self.dot_id_for(&edge.target);

            let mut props = Props::new();
            if let Some(label) = &edge.label {
                props.set("label", format!("  {}  ", escape_quoted(label)));
            }
            if edge.double_arrow {
                props.set("arrowhead", DOUBLE_ARROWHEAD);
            }
            self.line(&edge_statement(&source, &target, &props));

            self.edges.push(RenderEdge {
                source,
                target,
                label: edge.label,
                double_arrow: edge.double_arrow,
            });
        }
    }

    pub fn into_rendering(self) -> Rendering {
        Rendering {
            dot: self.out,
            nodes: self.nodes,
            edges: self.edges,
            diagnostics: self.diagnostics,
        }
    }
}

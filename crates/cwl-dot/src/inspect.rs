//! Re-reads rendered DOT text so callers can check it is well formed.

use crate::CwlDotError;
use graphviz_rust::dot_structures::{
    Attribute, Edge as DotEdge, EdgeTy, Graph as DotGraph, Id, Node as DotNode, NodeId, Stmt,
    Subgraph, Vertex,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type DotAttrs = BTreeMap<String, String>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DotCluster {
    pub name: String,
    pub label: Option<String>,
    /// Path of enclosing cluster names, outermost first.
    pub parents: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DotNodeSummary {
    pub id: String,
    pub attrs: DotAttrs,
    /// Innermost cluster the node statement appeared in.
    pub cluster: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DotEdgeSummary {
    pub from: String,
    pub to: String,
    pub attrs: DotAttrs,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DotSummary {
    pub id: String,
    pub clusters: Vec<DotCluster>,
    pub nodes: BTreeMap<String, DotNodeSummary>,
    pub edges: Vec<DotEdgeSummary>,
}

impl DotSummary {
    pub fn dangling_edges(&self) -> impl Iterator<Item = &DotEdgeSummary> {
        self.edges.iter().filter(|edge| {
            !self.nodes.contains_key(&edge.from) || !self.nodes.contains_key(&edge.to)
        })
    }
}

/// Parses `source` and summarizes its clusters, node statements and edges.
pub fn inspect_dot(source: &str) -> Result<DotSummary, CwlDotError> {
    let graph = graphviz_rust::parse(source).map_err(CwlDotError::DotParse)?;
    let (id, stmts) = match graph {
        DotGraph::DiGraph { id, stmts, .. } => (id, stmts),
        DotGraph::Graph { .. } => {
            return Err(CwlDotError::DotParse("expected a digraph".to_string()));
        }
    };

    let mut summary = DotSummary {
        id: id_to_string(&id),
        ..DotSummary::default()
    };
    let mut path = Vec::new();
    collect_statements(&mut summary, &stmts, &mut path)?;
    Ok(summary)
}

fn collect_statements(
    summary: &mut DotSummary,
    stmts: &[Stmt],
    path: &mut Vec<String>,
) -> Result<(), CwlDotError> {
    for stmt in stmts {
        match stmt {
            Stmt::Node(node) => collect_node(summary, node, path)?,
            Stmt::Edge(edge) => collect_edge(summary, edge)?,
            Stmt::Subgraph(subgraph) => collect_subgraph(summary, subgraph, path)?,
            Stmt::Attribute(_) | Stmt::GAttribute(_) => {}
        }
    }
    Ok(())
}

fn collect_subgraph(
    summary: &mut DotSummary,
    subgraph: &Subgraph,
    path: &mut Vec<String>,
) -> Result<(), CwlDotError> {
    let name = id_to_string(&subgraph.id);
    let label = subgraph.stmts.iter().find_map(|stmt| match stmt {
        Stmt::Attribute(Attribute(key, value)) if id_to_string(key) == "label" => {
            Some(id_to_string(value))
        }
        _ => None,
    });

    summary.clusters.push(DotCluster {
        name: name.clone(),
        label,
        parents: path.clone(),
    });

    path.push(name);
    let result = collect_statements(summary, &subgraph.stmts, path);
    path.pop();
    result
}

fn collect_node(
    summary: &mut DotSummary,
    node: &DotNode,
    path: &[String],
) -> Result<(), CwlDotError> {
    let id = node_id_to_string(&node.id)?;
    let attrs = collect_attrs(&node.attributes);
    if summary.nodes.contains_key(&id) {
        return Err(CwlDotError::DotParse(format!(
            "node '{id}' is declared more than once"
        )));
    }
    summary.nodes.insert(
        id.clone(),
        DotNodeSummary {
            id,
            attrs,
            cluster: path.last().cloned(),
        },
    );
    Ok(())
}

fn collect_edge(summary: &mut DotSummary, edge: &DotEdge) -> Result<(), CwlDotError> {
    let vertices = match &edge.ty {
        EdgeTy::Pair(from, to) => vec![vertex_to_string(from)?, vertex_to_string(to)?],
        EdgeTy::Chain(chain) => chain
            .iter()
            .map(vertex_to_string)
            .collect::<Result<Vec<_>, _>>()?,
    };

    let attrs = collect_attrs(&edge.attributes);
    for pair in vertices.windows(2) {
        summary.edges.push(DotEdgeSummary {
            from: pair[0].clone(),
            to: pair[1].clone(),
            attrs: attrs.clone(),
        });
    }
    Ok(())
}

fn vertex_to_string(vertex: &Vertex) -> Result<String, CwlDotError> {
    match vertex {
        Vertex::N(node_id) => node_id_to_string(node_id),
        Vertex::S(_) => Err(CwlDotError::DotParse(
            "subgraph vertices in edge statements are not expected".to_string(),
        )),
    }
}

fn node_id_to_string(node_id: &NodeId) -> Result<String, CwlDotError> {
    if node_id.1.is_some() {
        return Err(CwlDotError::DotParse(
            "ports in node identifiers are not expected".to_string(),
        ));
    }
    Ok(id_to_string(&node_id.0))
}

fn collect_attrs(attrs: &[Attribute]) -> DotAttrs {
    attrs
        .iter()
        .map(|Attribute(key, value)| (id_to_string(key), id_to_string(value)))
        .collect()
}

fn id_to_string(id: &Id) -> String {
    match id {
        Id::Escaped(value) => {
            let unquoted = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            unescape_dot_string(unquoted)
        }
        Id::Html(value) | Id::Plain(value) | Id::Anonymous(value) => value.clone(),
    }
}

fn unescape_dot_string(input: &str) -> String {
    let mut output = String::new();
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('"') => output.push('"'),
                Some('\\') => output.push('\\'),
                Some(other) => {
                    output.push('\\');
                    output.push(other);
                }
                None => output.push('\\'),
            }
        } else {
            output.push(ch);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspect_dot_nested_clusters_expected_parent_path() {
        let summary = inspect_dot(
            r#"
            digraph workflow {
                subgraph "cluster_wf1" {
                    label="wf";
                    subgraph cluster_inputs2 {
                        "a#1" [label="a", peripheries="1"];
                    }
                    "s#1" [label="s", peripheries="2"];
                }
                "a#1" -> "s#1" [arrowhead="normalnormal"];
            }
            "#,
        )
        .expect("dot should parse");

        assert_eq!(summary.id, "workflow");
        assert_eq!(summary.clusters.len(), 2);
        assert_eq!(summary.clusters[0].label.as_deref(), Some("wf"));
        assert_eq!(summary.clusters[1].parents, vec!["cluster_wf1".to_string()]);
        assert_eq!(
            summary.nodes["a#1"].cluster.as_deref(),
            Some("cluster_inputs2")
        );
        assert_eq!(summary.nodes["s#1"].attrs.get("peripheries").map(String::as_str), Some("2"));
        assert_eq!(summary.edges.len(), 1);
        assert_eq!(summary.dangling_edges().count(), 0);
    }

    #[test]
    fn inspect_dot_undirected_graph_expected_error() {
        let error = inspect_dot("graph G { a -- b }").expect_err("must fail");
        assert!(error.to_string().contains("digraph"));
    }

    #[test]
    fn inspect_dot_edge_to_undeclared_node_expected_dangling() {
        let summary = inspect_dot(r#"digraph G { "a" [label="a"]; "a" -> "b"; }"#)
            .expect("dot should parse");
        assert_eq!(summary.dangling_edges().count(), 1);
    }
}

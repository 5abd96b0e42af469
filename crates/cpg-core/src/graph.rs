//! Graph data model for the Course Planning Graph (CPG).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Separator between code and title in a display label.
pub const LABEL_SEPARATOR: &str = " — ";

/// A course as seen by the planner: identity plus display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseNode {
    /// Opaque identifier. The only field that carries identity.
    pub id: String,
    /// Short mnemonic, e.g. "CS101".
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A prerequisite edge: `from` must be completed before `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl CourseNode {
    pub fn new(id: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Display label: `"CS101 — Intro"`, or just the code when untitled.
    pub fn label(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => {
                format!("{}{}{}", self.code, LABEL_SEPARATOR, title)
            }
            _ => self.code.clone(),
        }
    }

    /// Reverse of [`CourseNode::label`]. Everything after the first separator is the title.
    ///
    /// A dangling separator (`"CS101 —"`) means an untitled course.
    pub fn from_label(id: impl Into<String>, label: &str) -> Self {
        let label = label.trim();
        let label = label
            .strip_suffix(LABEL_SEPARATOR.trim_end())
            .map_or(label, str::trim_end);
        match label.split_once(LABEL_SEPARATOR) {
            Some((code, title)) if !code.is_empty() => Self {
                id: id.into(),
                code: code.to_string(),
                title: Some(title.to_string()).filter(|t| !t.is_empty()),
            },
            _ => Self::new(id, label),
        }
    }
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Read-only prerequisite graph built from one catalog snapshot.
///
/// `prereqs_of` and `dependents_of` are exact inverses and only mention ids
/// present in `nodes`. Any change to the underlying data means building a new graph.
#[derive(Debug, Clone, Default)]
pub struct CourseGraph {
    nodes: BTreeMap<String, CourseNode>,
    /// node <- prerequisites
    prereqs_of: BTreeMap<String, BTreeSet<String>>,
    /// node -> dependents
    dependents_of: BTreeMap<String, BTreeSet<String>>,
}

/// Build a graph from course nodes and prerequisite edges.
pub fn build_graph(nodes: &[CourseNode], edges: &[Edge]) -> CourseGraph {
    CourseGraph::build(nodes, edges)
}

impl CourseGraph {
    /// Build the adjacency structure. Never fails.
    ///
    /// Self-edges and edges with an endpoint missing from `nodes` are dropped;
    /// duplicate edges collapse. A later node with an already-seen id replaces the earlier one.
    pub fn build(nodes: &[CourseNode], edges: &[Edge]) -> Self {
        let mut graph = Self::default();
        for node in nodes {
            graph.nodes.insert(node.id.clone(), node.clone());
        }
        for id in graph.nodes.keys() {
            graph.prereqs_of.insert(id.clone(), BTreeSet::new());
            graph.dependents_of.insert(id.clone(), BTreeSet::new());
        }

        let mut dropped = 0usize;
        for edge in edges {
            if edge.from == edge.to
                || !graph.nodes.contains_key(&edge.from)
                || !graph.nodes.contains_key(&edge.to)
            {
                dropped += 1;
                continue;
            }
            if let Some(prereqs) = graph.prereqs_of.get_mut(&edge.to) {
                prereqs.insert(edge.from.clone());
            }
            if let Some(dependents) = graph.dependents_of.get_mut(&edge.from) {
                dependents.insert(edge.to.clone());
            }
        }

        if dropped > 0 {
            tracing::debug!(
                dropped,
                "ignored self-referencing or dangling prerequisite edges"
            );
        }
        graph
    }

    pub fn node(&self, id: &str) -> Option<&CourseNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// All course nodes, ascending by id.
    pub fn nodes(&self) -> impl Iterator<Item = &CourseNode> {
        self.nodes.values()
    }

    /// All course ids, ascending.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Direct prerequisites of `id` (empty for unknown ids).
    pub fn prereqs_of(&self, id: &str) -> impl Iterator<Item = &str> {
        self.prereqs_of
            .get(id)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Direct dependents of `id` (empty for unknown ids).
    pub fn dependents_of(&self, id: &str) -> impl Iterator<Item = &str> {
        self.dependents_of
            .get(id)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.prereqs_of.get(id).map_or(0, BTreeSet::len)
    }

    /// Distinct edges that survived construction, ascending by (from, to).
    pub fn edges(&self) -> Vec<Edge> {
        self.dependents_of
            .iter()
            .flat_map(|(from, tos)| {
                tos.iter()
                    .map(move |to| Edge::new(from.clone(), to.clone()))
            })
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.prereqs_of.values().map(BTreeSet::len).sum()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_nodes() -> Vec<CourseNode> {
        vec![
            CourseNode::new("a", "CS101").with_title("Intro"),
            CourseNode::new("b", "CS201").with_title("Data Structures"),
            CourseNode::new("c", "CS301").with_title("Algorithms"),
        ]
    }

    #[test]
    fn test_build_links_both_directions() {
        let g = build_graph(
            &sample_nodes(),
            &[Edge::new("a", "b"), Edge::new("b", "c")],
        );
        assert_eq!(g.prereqs_of("b").collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(g.dependents_of("a").collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(g.prereqs_of("a").count(), 0);
        assert_eq!(g.dependents_of("c").count(), 0);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_adjacency_maps_are_inverse() {
        let edges = vec![
            Edge::new("a", "b"),
            Edge::new("a", "c"),
            Edge::new("b", "c"),
        ];
        let g = build_graph(&sample_nodes(), &edges);
        for id in g.ids() {
            for p in g.prereqs_of(id) {
                assert!(g.dependents_of(p).any(|d| d == id));
            }
            for d in g.dependents_of(id) {
                assert!(g.prereqs_of(d).any(|p| p == id));
            }
        }
    }

    #[test]
    fn test_dangling_edge_is_dropped() {
        let g = build_graph(
            &sample_nodes(),
            &[Edge::new("a", "zzz"), Edge::new("zzz", "b")],
        );
        assert_eq!(g.len(), 3);
        assert_eq!(g.edge_count(), 0);
        assert!(!g.contains("zzz"));
        assert_eq!(g.prereqs_of("zzz").count(), 0);
    }

    #[test]
    fn test_self_edge_is_dropped() {
        let g = build_graph(&sample_nodes(), &[Edge::new("a", "a")]);
        assert_eq!(g.in_degree("a"), 0);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let g = build_graph(
            &sample_nodes(),
            &[Edge::new("a", "b"), Edge::new("a", "b")],
        );
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edges(), vec![Edge::new("a", "b")]);
    }

    #[test]
    fn test_empty_input() {
        let g = build_graph(&[], &[Edge::new("a", "b")]);
        assert!(g.is_empty());
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_label_roundtrip() {
        let node = CourseNode::new("1", "CS101").with_title("Intro — to CS");
        assert_eq!(node.label(), "CS101 — Intro — to CS");
        assert_eq!(CourseNode::from_label("1", &node.label()), node);

        let bare = CourseNode::new("2", "MATH200");
        assert_eq!(bare.label(), "MATH200");
        assert_eq!(CourseNode::from_label("2", "MATH200"), bare);
    }

    #[test]
    fn test_from_label_with_dangling_separator() {
        let node = CourseNode::from_label("1", "CS101 —");
        assert_eq!(node, CourseNode::new("1", "CS101"));
        assert_eq!(CourseNode::from_label("1", " CS101 — "), node);
    }
}

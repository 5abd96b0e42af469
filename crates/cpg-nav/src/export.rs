//! Export the prerequisite graph as DOT (Graphviz), Mermaid flowchart, or JSON.

use anyhow::{Context, Result};
use cpg_core::graph::{CourseGraph, CourseNode, Edge};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Export format for graph visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Dot,
    Mermaid,
    Json,
}

impl ExportFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dot" | "graphviz" => Some(Self::Dot),
            "mermaid" | "md" => Some(Self::Mermaid),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Layout direction for DOT and Mermaid output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankDir {
    #[default]
    LeftRight,
    TopBottom,
}

impl RankDir {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_uppercase().as_str() {
            "LR" => Some(Self::LeftRight),
            "TB" | "TD" => Some(Self::TopBottom),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::LeftRight => "LR",
            Self::TopBottom => "TB",
        }
    }
}

/// A node as served to graph viewers: id plus a combined display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadNode {
    pub id: String,
    pub label: String,
}

/// Viewer payload: `{ nodes: [{id, label}], edges: [{from, to}] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphPayload {
    pub nodes: Vec<PayloadNode>,
    pub edges: Vec<Edge>,
}

impl GraphPayload {
    pub fn from_graph(graph: &CourseGraph) -> Self {
        Self {
            nodes: graph
                .nodes()
                .map(|n| PayloadNode {
                    id: n.id.clone(),
                    label: n.label(),
                })
                .collect(),
            edges: graph.edges(),
        }
    }

    /// Recover course nodes by splitting labels back into code and title.
    pub fn course_nodes(&self) -> Vec<CourseNode> {
        self.nodes
            .iter()
            .map(|n| CourseNode::from_label(n.id.clone(), &n.label))
            .collect()
    }

    pub fn to_graph(&self) -> CourseGraph {
        CourseGraph::build(&self.course_nodes(), &self.edges)
    }
}

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Export the graph as a DOT (Graphviz) string.
///
/// Entry-level courses (no prerequisites) are filled green.
pub fn export_dot(graph: &CourseGraph, rankdir: RankDir) -> String {
    let mut out = String::new();
    writeln!(out, "digraph CPG {{").unwrap();
    writeln!(out, "  rankdir={};", rankdir.as_str()).unwrap();
    writeln!(out, "  node [shape=box, fontsize=10];").unwrap();
    writeln!(out).unwrap();

    for node in graph.nodes() {
        let color = if graph.in_degree(&node.id) == 0 {
            "#e0ffe0"
        } else {
            "#ffffff"
        };
        writeln!(
            out,
            "  \"{}\" [style=filled, fillcolor=\"{}\", label=\"{}\"];",
            dot_escape(&node.id),
            color,
            dot_escape(&node.label())
        )
        .unwrap();
    }

    writeln!(out).unwrap();

    for edge in graph.edges() {
        writeln!(
            out,
            "  \"{}\" -> \"{}\";",
            dot_escape(&edge.from),
            dot_escape(&edge.to)
        )
        .unwrap();
    }

    writeln!(out, "}}").unwrap();
    out
}

/// Export the graph as a Mermaid flowchart string.
pub fn export_mermaid(graph: &CourseGraph, rankdir: RankDir) -> String {
    let mut out = String::new();
    writeln!(out, "flowchart {}", rankdir.as_str()).unwrap();

    for node in graph.nodes() {
        writeln!(
            out,
            "  {}[\"{}\"]",
            mermaid_safe_id(&node.id),
            node.label().replace('"', "#quot;")
        )
        .unwrap();
    }

    if graph.edge_count() > 0 {
        writeln!(out).unwrap();
    }
    for edge in graph.edges() {
        writeln!(
            out,
            "  {} --> {}",
            mermaid_safe_id(&edge.from),
            mermaid_safe_id(&edge.to)
        )
        .unwrap();
    }

    out
}

/// Make an ID safe for Mermaid (replace special characters).
fn mermaid_safe_id(id: &str) -> String {
    let safe = id.replace([':', '/', '.', ' ', '-'], "_");
    // Mermaid reserves "end" as a keyword.
    if safe.eq_ignore_ascii_case("end") {
        format!("n_{safe}")
    } else {
        safe
    }
}

/// Export the graph as the JSON viewer payload.
pub fn export_json(graph: &CourseGraph) -> Result<String> {
    serde_json::to_string_pretty(&GraphPayload::from_graph(graph))
        .context("failed to serialize graph payload")
}

/// Export the graph in the specified format.
pub fn export(graph: &CourseGraph, format: ExportFormat, rankdir: RankDir) -> Result<String> {
    match format {
        ExportFormat::Dot => Ok(export_dot(graph, rankdir)),
        ExportFormat::Mermaid => Ok(export_mermaid(graph, rankdir)),
        ExportFormat::Json => export_json(graph),
    }
}

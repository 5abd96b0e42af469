//! Deterministic topological ordering (Kahn's algorithm).
//!
//! The frontier is an ordered set, so among all courses whose prerequisites are
//! satisfied the smallest id is always emitted first. Output is identical across
//! runs for the same graph regardless of how the graph was assembled.

use crate::graph::CourseGraph;
use std::collections::{BTreeSet, HashMap};

/// The prerequisite graph is not a DAG.
///
/// `stuck` lists every id Kahn's algorithm could not order, ascending. That is
/// the nodes on a cycle plus everything downstream of one, not a minimal cycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cycle detected among: {}", .stuck.join(", "))]
pub struct CycleError {
    pub stuck: Vec<String>,
}

/// Order every course so each appears after all of its prerequisites.
pub fn topo_order(graph: &CourseGraph) -> Result<Vec<String>, CycleError> {
    let mut in_degree: HashMap<&str, usize> = graph
        .ids()
        .map(|id| (id, graph.in_degree(id)))
        .collect();

    let mut frontier: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(id, _)| *id)
        .collect();

    let mut order: Vec<String> = Vec::with_capacity(graph.len());
    while let Some(id) = frontier.pop_first() {
        order.push(id.to_string());
        for dep in graph.dependents_of(id) {
            if let Some(deg) = in_degree.get_mut(dep) {
                *deg = deg.saturating_sub(1);
                if *deg == 0 {
                    frontier.insert(dep);
                }
            }
        }
    }

    if order.len() != graph.len() {
        let stuck: Vec<String> = graph
            .ids()
            .filter(|id| in_degree.get(id).is_some_and(|deg| *deg > 0))
            .map(str::to_string)
            .collect();
        tracing::debug!(stuck = stuck.len(), "topological order incomplete");
        return Err(CycleError { stuck });
    }
    Ok(order)
}

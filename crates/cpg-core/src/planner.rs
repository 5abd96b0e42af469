//! Greedy term planning: repeatedly take the eligible courses, up to a per-term cap.
//!
//! Planning always validates the whole graph first: a cycle anywhere blocks the
//! plan, even one that lies entirely outside the requested targets. Eligibility,
//! by contrast, only looks at prerequisites inside the target set.

use crate::graph::{CourseGraph, CourseNode};
use crate::topo::{CycleError, topo_order};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

/// Default number of courses per term.
pub const DEFAULT_MAX_PER_TERM: usize = 4;

/// Request parameters for term planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanOptions {
    /// Maximum courses per term. Zero is treated as one.
    pub max_per_term: usize,
    /// Courses to schedule. `None` means every course in the graph.
    pub target_ids: Option<Vec<String>>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            max_per_term: DEFAULT_MAX_PER_TERM,
            target_ids: None,
        }
    }
}

impl PlanOptions {
    pub fn with_max_per_term(mut self, max_per_term: usize) -> Self {
        self.max_per_term = max_per_term;
        self
    }

    pub fn with_targets<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    fn capacity(&self) -> usize {
        self.max_per_term.max(1)
    }
}

/// Result of planning, including what could not be scheduled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermPlan {
    /// Ordered terms, each an ordered list of course ids.
    pub terms: Vec<Vec<String>>,
    /// Target ids left over when planning starved, ascending.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unscheduled: Vec<String>,
}

impl TermPlan {
    pub fn is_complete(&self) -> bool {
        self.unscheduled.is_empty()
    }

    pub fn scheduled_count(&self) -> usize {
        self.terms.iter().map(Vec::len).sum()
    }

    /// Index of the term that schedules `id`.
    pub fn term_of(&self, id: &str) -> Option<usize> {
        self.terms.iter().position(|term| term.iter().any(|c| c == id))
    }
}

/// Courses not yet in `completed` whose prerequisites are all in `completed`.
///
/// Sorted by code, then title (missing title as ""), then id.
pub fn eligible_next(graph: &CourseGraph, completed: &HashSet<String>) -> Vec<String> {
    eligible_within(graph, completed, None)
}

/// Eligibility restricted to `scope`: only in-scope, unscheduled courses qualify,
/// and only in-scope prerequisites have to be completed.
fn eligible_within(
    graph: &CourseGraph,
    completed: &HashSet<String>,
    scope: Option<&HashSet<String>>,
) -> Vec<String> {
    let in_scope = |id: &str| scope.is_none_or(|s| s.contains(id));

    let mut eligible: Vec<&CourseNode> = graph
        .nodes()
        .filter(|node| in_scope(node.id.as_str()) && !completed.contains(&node.id))
        .filter(|node| {
            graph
                .prereqs_of(&node.id)
                .filter(|&p| in_scope(p))
                .all(|p| completed.contains(p))
        })
        .collect();
    eligible.sort_by(|a, b| display_order(a, b));
    eligible.into_iter().map(|node| node.id.clone()).collect()
}

fn display_order(a: &CourseNode, b: &CourseNode) -> Ordering {
    a.code
        .cmp(&b.code)
        .then_with(|| {
            a.title
                .as_deref()
                .unwrap_or("")
                .cmp(b.title.as_deref().unwrap_or(""))
        })
        .then_with(|| a.id.cmp(&b.id))
}

/// Plan terms and return just the term groupings.
///
/// An incomplete plan is not an error; compare the scheduled count against the
/// target size, or use [`plan_terms_detailed`].
pub fn plan_terms(
    graph: &CourseGraph,
    options: &PlanOptions,
) -> Result<Vec<Vec<String>>, CycleError> {
    plan_terms_detailed(graph, options).map(|plan| plan.terms)
}

/// Plan terms, reporting target ids that could not be scheduled.
pub fn plan_terms_detailed(
    graph: &CourseGraph,
    options: &PlanOptions,
) -> Result<TermPlan, CycleError> {
    topo_order(graph)?;

    let target: HashSet<String> = match &options.target_ids {
        Some(ids) => ids.iter().cloned().collect(),
        None => graph.ids().map(str::to_string).collect(),
    };
    let capacity = options.capacity();
    let mut completed: HashSet<String> = HashSet::new();
    let mut terms: Vec<Vec<String>> = Vec::new();

    loop {
        let remaining = target.iter().filter(|id| !completed.contains(*id)).count();
        if remaining == 0 {
            break;
        }
        let eligible = eligible_within(graph, &completed, Some(&target));
        if eligible.is_empty() {
            break;
        }
        let term: Vec<String> = eligible.into_iter().take(capacity).collect();
        tracing::debug!(
            term = terms.len() + 1,
            courses = term.len(),
            remaining,
            "planned term"
        );
        completed.extend(term.iter().cloned());
        terms.push(term);
    }

    let unscheduled: Vec<String> = target
        .iter()
        .filter(|id| !completed.contains(*id))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if !unscheduled.is_empty() {
        tracing::warn!(
            scheduled = completed.len(),
            target = target.len(),
            "plan is incomplete: {} course(s) never became eligible",
            unscheduled.len()
        );
    }

    Ok(TermPlan { terms, unscheduled })
}

//! Catalog integrity: records the graph builder would drop, and cycles that block planning.

use cpg_core::catalog::{Catalog, PrereqRecord};
use cpg_core::topo::topo_order;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Integrity findings for one catalog.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthReport {
    /// Prereq records with an endpoint that is not a course.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dangling: Vec<PrereqRecord>,
    /// Prereq records pointing a course at itself.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub self_edges: Vec<PrereqRecord>,
    /// Second and later records repeating an existing (from, to) pair.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duplicates: Vec<PrereqRecord>,
    /// Course codes shared by more than one course.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duplicate_codes: Vec<String>,
    /// Record ids used by more than one course or prereq record.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duplicate_ids: Vec<String>,
    /// Course ids that cannot be ordered because of a prerequisite cycle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<Vec<String>>,
}

impl HealthReport {
    pub fn issue_count(&self) -> usize {
        self.dangling.len()
            + self.self_edges.len()
            + self.duplicates.len()
            + self.duplicate_codes.len()
            + self.duplicate_ids.len()
            + usize::from(self.cycle.is_some())
    }

    pub fn is_healthy(&self) -> bool {
        self.issue_count() == 0
    }
}

/// Inspect a catalog without modifying it.
pub fn check_catalog(catalog: &Catalog) -> HealthReport {
    let course_ids: HashSet<&str> = catalog.courses.iter().map(|c| c.id.as_str()).collect();
    let mut report = HealthReport::default();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();

    for prereq in &catalog.prereqs {
        if prereq.from == prereq.to {
            report.self_edges.push(prereq.clone());
        } else if !course_ids.contains(prereq.from.as_str())
            || !course_ids.contains(prereq.to.as_str())
        {
            report.dangling.push(prereq.clone());
        } else if !seen.insert((prereq.from.as_str(), prereq.to.as_str())) {
            report.duplicates.push(prereq.clone());
        }
    }

    let mut codes: BTreeMap<&str, usize> = BTreeMap::new();
    for course in &catalog.courses {
        *codes.entry(course.code.as_str()).or_default() += 1;
    }
    report.duplicate_codes = codes
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(code, _)| code.to_string())
        .collect();

    let mut ids: BTreeMap<&str, usize> = BTreeMap::new();
    let record_ids = catalog
        .courses
        .iter()
        .map(|c| c.id.as_str())
        .chain(catalog.prereqs.iter().map(|p| p.id.as_str()));
    for id in record_ids {
        *ids.entry(id).or_default() += 1;
    }
    report.duplicate_ids = ids
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id.to_string())
        .collect();

    if let Err(err) = topo_order(&catalog.graph()) {
        report.cycle = Some(err.stuck);
    }

    report
}

//! Course catalog: the editable record set a [`CourseGraph`] snapshot is built from.

use crate::graph::{CourseGraph, CourseNode, Edge};
use crate::schema::CURRENT_VERSION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub id: String,
    /// Normalized: trimmed and upper-case. Unique within a catalog.
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub credits: u32,
}

/// A stored prerequisite: `from` must be completed before `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrereqRecord {
    pub id: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub courses: Vec<CourseRecord>,
    pub prereqs: Vec<PrereqRecord>,
    /// Next numeric suffix for allocated ids.
    #[serde(default)]
    pub next_id: u64,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim and upper-case a course code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl CourseRecord {
    pub fn to_node(&self) -> CourseNode {
        CourseNode {
            id: self.id.clone(),
            code: self.code.clone(),
            title: self.title.clone(),
        }
    }
}

impl Catalog {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            version: CURRENT_VERSION.to_string(),
            created_at: now,
            updated_at: now,
            courses: Vec::new(),
            prereqs: Vec::new(),
            next_id: 1,
        }
    }

    /// Starter catalog: CS101 is a prerequisite of CS201.
    pub fn seeded() -> Self {
        let mut catalog = Self::new();
        let intro = catalog
            .upsert_course("CS101", "Intro to CS", 4)
            .map(|c| c.id.clone());
        let ds = catalog
            .upsert_course("CS201", "Data Structures", 4)
            .map(|c| c.id.clone());
        if let (Some(intro), Some(ds)) = (intro, ds) {
            catalog.add_prereq(&intro, &ds);
        }
        catalog
    }

    /// Allocate an id no course or prereq record uses yet.
    ///
    /// The counter may lag behind the records (hand-edited file, missing `next_id`),
    /// so taken candidates are skipped.
    fn allocate_id(&mut self, prefix: &str) -> String {
        loop {
            let n = self.next_id.max(1);
            self.next_id = n + 1;
            let id = format!("{prefix}{n}");
            if !self.id_in_use(&id) {
                return id;
            }
        }
    }

    fn id_in_use(&self, id: &str) -> bool {
        self.courses.iter().any(|c| c.id == id) || self.prereqs.iter().any(|p| p.id == id)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn course(&self, id: &str) -> Option<&CourseRecord> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn find_by_code(&self, code: &str) -> Option<&CourseRecord> {
        let code = normalize_code(code);
        self.courses.iter().find(|c| c.code == code)
    }

    /// Resolve a course code or, failing that, an id to a course.
    ///
    /// Codes win: `c1` names the course coded `C1` even if another course has id `c1`.
    pub fn resolve(&self, code_or_id: &str) -> Option<&CourseRecord> {
        self.find_by_code(code_or_id)
            .or_else(|| self.course(code_or_id.trim()))
    }

    /// Create a course, or update title and credits of the course with the same code.
    ///
    /// Returns `None` (and changes nothing) when the code is blank.
    pub fn upsert_course(
        &mut self,
        code: &str,
        title: &str,
        credits: u32,
    ) -> Option<&CourseRecord> {
        let code = normalize_code(code);
        if code.is_empty() {
            return None;
        }
        let title = Some(title.trim().to_string()).filter(|t| !t.is_empty());

        let idx = if let Some(idx) = self.courses.iter().position(|c| c.code == code) {
            let course = &mut self.courses[idx];
            course.title = title;
            course.credits = credits;
            idx
        } else {
            let id = self.allocate_id("c");
            self.courses.push(CourseRecord {
                id,
                code,
                title,
                credits,
            });
            self.courses.len() - 1
        };
        self.touch();
        self.courses.get(idx)
    }

    /// Remove a course together with every prerequisite record that touches it.
    pub fn remove_course(&mut self, id: &str) -> Option<CourseRecord> {
        let idx = self.courses.iter().position(|c| c.id == id)?;
        let removed = self.courses.remove(idx);
        self.prereqs.retain(|p| p.from != id && p.to != id);
        self.touch();
        Some(removed)
    }

    /// Record that `from` is a prerequisite of `to`.
    ///
    /// Blank ids, self-references and duplicate pairs are ignored.
    pub fn add_prereq(&mut self, from: &str, to: &str) -> Option<&PrereqRecord> {
        let (from, to) = (from.trim(), to.trim());
        if from.is_empty() || to.is_empty() || from == to {
            return None;
        }
        if self.prereqs.iter().any(|p| p.from == from && p.to == to) {
            return None;
        }
        let id = self.allocate_id("p");
        self.prereqs.push(PrereqRecord {
            id,
            from: from.to_string(),
            to: to.to_string(),
        });
        self.touch();
        self.prereqs.last()
    }

    pub fn remove_prereq(&mut self, id: &str) -> Option<PrereqRecord> {
        let idx = self.prereqs.iter().position(|p| p.id == id)?;
        let removed = self.prereqs.remove(idx);
        self.touch();
        Some(removed)
    }

    pub fn nodes(&self) -> Vec<CourseNode> {
        self.courses.iter().map(CourseRecord::to_node).collect()
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.prereqs
            .iter()
            .map(|p| Edge::new(p.from.clone(), p.to.clone()))
            .collect()
    }

    /// Snapshot the catalog into a planning graph.
    pub fn graph(&self) -> CourseGraph {
        CourseGraph::build(&self.nodes(), &self.edges())
    }

    pub fn total_credits<'a>(&self, ids: impl IntoIterator<Item = &'a String>) -> u32 {
        ids.into_iter()
            .filter_map(|id| self.course(id))
            .map(|c| c.credits)
            .sum()
    }
}

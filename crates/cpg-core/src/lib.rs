//! Core types for the Course Planning Graph (CPG).
//!
//! Builds a prerequisite graph ([`graph::CourseGraph`]) from course records and
//! edges, orders it topologically ([`topo::topo_order`]), and packs it into
//! capacity-bounded terms ([`planner::plan_terms`]). Also holds the editable
//! catalog, its JSON persistence, and configuration.

pub mod catalog;
pub mod config;
pub mod graph;
pub mod planner;
pub mod schema;
pub mod storage;
pub mod topo;

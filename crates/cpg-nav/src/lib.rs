//! Views over a Course Planning Graph catalog.
//!
//! Provides graph export (DOT, Mermaid, JSON payload) for visualization and an
//! integrity report that flags records the graph builder would silently drop.

pub mod export;
pub mod health;

//! Read/write catalog files from disk.

use crate::catalog::Catalog;
use crate::schema;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const CPG_DIR: &str = ".cpg";
const CATALOG_FILE: &str = "catalog.json";

/// Get the path to the CPG directory for a given project root.
pub fn cpg_dir(project_root: &Path) -> PathBuf {
    project_root.join(CPG_DIR)
}

/// Get the path to the catalog file for a given project root.
pub fn catalog_file(project_root: &Path) -> PathBuf {
    cpg_dir(project_root).join(CATALOG_FILE)
}

/// Check if a catalog exists for the given project root.
pub fn catalog_exists(project_root: &Path) -> bool {
    catalog_file(project_root).exists()
}

/// Load a catalog from disk.
pub fn load(project_root: &Path) -> Result<Catalog> {
    let path = catalog_file(project_root);
    let json = fs::read_to_string(&path)
        .with_context(|| format!("failed to read catalog from {}", path.display()))?;
    let catalog = schema::from_json(&json)?;
    tracing::debug!(
        courses = catalog.courses.len(),
        prereqs = catalog.prereqs.len(),
        "loaded catalog"
    );
    Ok(catalog)
}

/// Save a catalog to disk, creating the .cpg directory if needed.
pub fn save(project_root: &Path, catalog: &Catalog) -> Result<()> {
    let dir = cpg_dir(project_root);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create CPG directory {}", dir.display()))?;

    let path = catalog_file(project_root);
    let json = schema::to_json(catalog)?;
    fs::write(&path, json)
        .with_context(|| format!("failed to write catalog to {}", path.display()))?;

    Ok(())
}

//! JSON schema validation and version handling for catalog files.

use crate::catalog::Catalog;
use anyhow::{Context, Result};

pub const CURRENT_VERSION: &str = "1.0.0";

/// Validate a catalog's schema version.
pub fn validate_version(catalog: &Catalog) -> Result<()> {
    if catalog.version != CURRENT_VERSION {
        anyhow::bail!(
            "catalog version mismatch: expected {}, found {}",
            CURRENT_VERSION,
            catalog.version
        );
    }
    Ok(())
}

/// Serialize a catalog to a pretty-printed JSON string.
pub fn to_json(catalog: &Catalog) -> Result<String> {
    serde_json::to_string_pretty(catalog).context("failed to serialize catalog to JSON")
}

/// Deserialize a catalog from a JSON string.
pub fn from_json(json: &str) -> Result<Catalog> {
    let catalog: Catalog =
        serde_json::from_str(json).context("failed to deserialize catalog from JSON")?;
    validate_version(&catalog)?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_other_version() {
        let mut catalog = Catalog::new();
        catalog.version = "0.1.0".to_string();
        let json = serde_json::to_string(&catalog).unwrap();
        let err = from_json(&json).unwrap_err();
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(from_json("{ not json").is_err());
    }
}

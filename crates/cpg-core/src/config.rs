//! Configuration for planning and export settings.
//!
//! Load order: `.cpg/config.toml` → environment variables → defaults.

use crate::planner::{DEFAULT_MAX_PER_TERM, PlanOptions};
use crate::storage::cpg_dir;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level CPG configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CpgConfig {
    pub planning: PlanningConfig,
    pub export: ExportConfig,
}

/// Term planner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// Courses per term when `plan` is run without `--max-per-term`.
    /// Zero is accepted and planned as one per term.
    pub max_per_term: usize,
}

/// Graph export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Default output format: "dot", "mermaid" or "json".
    pub format: String,
    /// Rank direction for DOT and Mermaid output: "LR" or "TB".
    pub direction: String,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            max_per_term: DEFAULT_MAX_PER_TERM,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: "dot".to_string(),
            direction: "LR".to_string(),
        }
    }
}

impl PlanningConfig {
    /// Planner options for the whole catalog at the configured capacity.
    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions::default().with_max_per_term(self.max_per_term)
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl CpgConfig {
    /// Load config from `.cpg/config.toml` in the project root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = cpg_dir(project_root).join("config.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        env_override("CPG_MAX_PER_TERM", &mut config.planning.max_per_term);
        env_override("CPG_EXPORT_FORMAT", &mut config.export.format);

        config.export.format = config.export.format.to_lowercase();
        config.export.direction = config.export.direction.to_uppercase();
        if !matches!(config.export.direction.as_str(), "LR" | "TB") {
            anyhow::bail!(
                "export.direction must be \"LR\" or \"TB\", found \"{}\"",
                config.export.direction
            );
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CpgConfig::default();
        assert_eq!(config.planning.max_per_term, 4);
        assert_eq!(config.export.format, "dot");
        assert_eq!(config.export.direction, "LR");
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
[planning]
max_per_term = 6

[export]
format = "mermaid"
"#;
        let config: CpgConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.planning.max_per_term, 6);
        assert_eq!(config.export.format, "mermaid");
        // Defaults for unspecified fields
        assert_eq!(config.export.direction, "LR");
    }

    #[test]
    fn test_config_load_nonexistent() {
        let config = CpgConfig::load(Path::new("/nonexistent/path")).unwrap();
        assert_eq!(config.export.direction, "LR");
    }

    #[test]
    fn test_load_normalizes_direction_case() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".cpg");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[export]\ndirection = \"tb\"\n").unwrap();

        let config = CpgConfig::load(tmp.path()).unwrap();
        assert_eq!(config.export.direction, "TB");
    }

    #[test]
    fn test_load_rejects_unknown_direction() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".cpg");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[export]\ndirection = \"diagonal\"\n").unwrap();

        assert!(CpgConfig::load(tmp.path()).is_err());
    }

    #[test]
    fn test_plan_options_from_config() {
        let planning = PlanningConfig { max_per_term: 2 };
        let opts = planning.plan_options();
        assert_eq!(opts.max_per_term, 2);
        assert!(opts.target_ids.is_none());
    }
}

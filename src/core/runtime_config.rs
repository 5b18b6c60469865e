//! Explicit runtime configuration, constructed once at the CLI boundary and
//! threaded through the engine by value. There are no ambient singletons:
//! every knob the planner and evaluation engine read comes from this struct.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::criteria::{CriterionId, CriterionRegistry, Priority, WEIGHT_TOLERANCE};
use crate::core::errors::{DodError, Result};

/// On-disk schema for `.uvmgr/exoskeleton/config.yaml` (specification §6.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnDiskConfig {
    pub version: String,
    pub template: String,
    pub criteria: indexmap::IndexMap<String, OnDiskCriterion>,
}

/// One criterion's override entry in `config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnDiskCriterion {
    pub weight: f64,
    pub priority: String,
    pub threshold: i64,
}

impl OnDiskConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DodError::io(path, "failed to read config.yaml", e))?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|e| DodError::io(path, "failed to write config.yaml", e))
    }

    /// Reading a config whose weights violate W1 is a hard error
    /// (specification §6.2).
    fn validate(&self) -> Result<()> {
        let total: f64 = self.criteria.values().map(|c| c.weight).sum();
        if !self.criteria.is_empty() && (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(DodError::input_field(
                format!("config.yaml criteria weights sum to {total}, expected 1.0"),
                "criteria",
            ));
        }
        Ok(())
    }

    /// Produce the default `config.yaml` contents for a given template id,
    /// derived from the reference registry so the file and the built-in
    /// defaults can never drift apart silently.
    pub fn defaults(template: &str) -> Self {
        let registry = CriterionRegistry::reference();
        let mut criteria = indexmap::IndexMap::new();
        for spec in registry.list() {
            criteria.insert(
                spec.id.as_str().to_string(),
                OnDiskCriterion {
                    weight: spec.weight,
                    priority: spec.priority.as_str().to_string(),
                    threshold: 70,
                },
            );
        }
        Self {
            version: "1".to_string(),
            template: template.to_string(),
            criteria,
        }
    }
}

/// Configuration threaded through the Execution Planner and Evaluation
/// Engine. Built once at the CLI boundary from defaults, an optional
/// `config.yaml`, and CLI flags (in that precedence order, later wins).
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub max_parallel_criteria: usize,
    pub run_deadline: Duration,
    pub cancellation_grace: Duration,
    pub early_termination_enabled: bool,
    pub early_success_threshold: f64,
    pub early_success_min_weight: f64,
    /// Alternative scoring policy for the open question in §9: when true,
    /// disabled/omitted optional criteria score as zero instead of being
    /// dropped from the denominator.
    pub score_disabled_as_zero: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_parallel_criteria: 8,
            run_deadline: Duration::from_secs(300),
            cancellation_grace: Duration::from_secs(5),
            early_termination_enabled: false,
            early_success_threshold: 0.80,
            early_success_min_weight: 0.70,
            score_disabled_as_zero: false,
        }
    }
}

impl RuntimeConfig {
    /// Load an on-disk config and fold its registry overrides in, returning
    /// both the runtime config (unchanged by the file, since these knobs are
    /// not part of `config.yaml`) and the overridden registry.
    pub fn registry_from_on_disk(on_disk: &OnDiskConfig) -> Result<CriterionRegistry> {
        let reference = CriterionRegistry::reference();
        let mut overrides = Vec::new();
        for (id_str, entry) in &on_disk.criteria {
            let id = CriterionId::parse(id_str)?;
            let priority = match entry.priority.as_str() {
                "critical" => Priority::Critical,
                "important" => Priority::Important,
                "optional" => Priority::Optional,
                other => {
                    return Err(DodError::input_field(
                        format!("unknown priority '{other}'"),
                        format!("criteria.{id_str}.priority"),
                    ))
                }
            };
            overrides.push((id, entry.weight, priority));
        }
        if overrides.is_empty() {
            Ok(reference)
        } else {
            reference.with_overrides(&overrides)
        }
    }

    /// Resolve the registry to use for a run: the on-disk `config.yaml`
    /// under `root/.uvmgr/exoskeleton/config.yaml` is authoritative if
    /// present, otherwise the built-in reference registry applies.
    pub fn resolve_registry(root: &Path) -> Result<CriterionRegistry> {
        let config_path = root
            .join(".uvmgr")
            .join("exoskeleton")
            .join("config.yaml");
        if config_path.exists() {
            let on_disk = OnDiskConfig::from_yaml_file(&config_path)?;
            Self::registry_from_on_disk(&on_disk)
        } else {
            Ok(CriterionRegistry::reference())
        }
    }
}

/// Absolute path to the advisory lock file the Exoskeleton Materializer
/// acquires for the duration of a create/force operation.
pub fn exoskeleton_lock_path(root: &Path) -> PathBuf {
    root.join(".uvmgr").join(".lock")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_round_trip_through_yaml() {
        let config = OnDiskConfig::defaults("standard");
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        config.to_yaml_file(&path).unwrap();

        let first = std::fs::read_to_string(&path).unwrap();
        let reloaded = OnDiskConfig::from_yaml_file(&path).unwrap();
        reloaded.to_yaml_file(&path).unwrap();
        let second = std::fs::read_to_string(&path).unwrap();

        assert_eq!(first, second, "config.yaml must be byte-identical across a load/save cycle");
    }

    #[test]
    fn bad_weights_are_rejected_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "version: '1'\ntemplate: standard\ncriteria:\n  testing:\n    weight: 0.9\n    priority: critical\n    threshold: 70\n",
        )
        .unwrap();

        let err = OnDiskConfig::from_yaml_file(&path);
        assert!(err.is_err());
    }

    #[test]
    fn resolve_registry_falls_back_to_reference_when_absent() {
        let dir = TempDir::new().unwrap();
        let registry = RuntimeConfig::resolve_registry(dir.path()).unwrap();
        assert!(registry.validate().is_ok());
    }
}

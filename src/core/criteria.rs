//! Criterion Registry: the closed, build-time enumeration of evaluable
//! Definition-of-Done dimensions and their immutable specs.
//!
//! New criteria may only be added by extending [`CriterionId`] and the
//! registry's static table at compile time — there is no runtime
//! registration path, per the specification's non-goal on arbitrary
//! user-supplied validators.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{DodError, Result};
use crate::validators::ValidatorHandle;

/// Opaque identifier for one evaluable DoD dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionId {
    Testing,
    Security,
    Devops,
    CodeQuality,
    Documentation,
    Performance,
    Compliance,
}

impl CriterionId {
    /// All registered criterion ids, in the registry's canonical
    /// (critical → important → optional, alphabetical within tier) order.
    pub const ALL: [CriterionId; 7] = [
        CriterionId::Devops,
        CriterionId::Security,
        CriterionId::Testing,
        CriterionId::CodeQuality,
        CriterionId::Documentation,
        CriterionId::Compliance,
        CriterionId::Performance,
    ];

    /// The wire/string form used in telemetry names, CLI flags, and
    /// `config.yaml` keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Testing => "testing",
            Self::Security => "security",
            Self::Devops => "devops",
            Self::CodeQuality => "code_quality",
            Self::Documentation => "documentation",
            Self::Performance => "performance",
            Self::Compliance => "compliance",
        }
    }

    /// Parse a criterion id from its wire form. Unknown ids are an
    /// `input_error`, not a panic — callers at the CLI/config boundary are
    /// expected to surface this before planning begins.
    pub fn parse(s: &str) -> Result<Self> {
        CriterionId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| DodError::input_field(format!("unknown criterion id '{s}'"), "criteria"))
    }
}

impl std::fmt::Display for CriterionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Priority tier. Governs canonical ordering and early-termination
/// eligibility, not the weight directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    Important,
    Optional,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Important => "important",
            Self::Optional => "optional",
        }
    }

    /// Rank for sort ordering: critical < important < optional.
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Important => 1,
            Self::Optional => 2,
        }
    }
}

/// Immutable, registry-owned specification for one criterion.
#[derive(Clone)]
pub struct CriterionSpec {
    pub id: CriterionId,
    /// Fraction of total score, in (0, 1].
    pub weight: f64,
    pub priority: Priority,
    /// Ordered glob patterns used for relevance fingerprinting.
    pub relevant_globs: Vec<&'static str>,
    pub validator: ValidatorHandle,
    pub default_timeout: Duration,
}

impl std::fmt::Debug for CriterionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CriterionSpec")
            .field("id", &self.id)
            .field("weight", &self.weight)
            .field("priority", &self.priority)
            .field("relevant_globs", &self.relevant_globs)
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

/// Weight tolerance for invariant W1 (sum of weights == 1.0).
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// The closed criterion registry. Lookup is O(1) (a 7-element match);
/// listing preserves the canonical stable order.
#[derive(Clone)]
pub struct CriterionRegistry {
    specs: Vec<CriterionSpec>,
}

impl CriterionRegistry {
    /// Build the reference registry with the default weights from the
    /// specification: critical = {testing, security, devops}, important =
    /// {code_quality, documentation}, optional = {performance, compliance}.
    pub fn reference() -> Self {
        use crate::validators;

        let specs = vec![
            CriterionSpec {
                id: CriterionId::Testing,
                weight: 0.25,
                priority: Priority::Critical,
                relevant_globs: vec!["tests/**", "**/*_test.*", "**/test_*.*", "**/*.spec.*"],
                validator: validators::testing::handle(),
                default_timeout: Duration::from_secs(60),
            },
            CriterionSpec {
                id: CriterionId::Security,
                weight: 0.25,
                priority: Priority::Critical,
                relevant_globs: vec![
                    "Cargo.lock",
                    "package-lock.json",
                    "poetry.lock",
                    "SECURITY.md",
                ],
                validator: validators::security::handle(),
                default_timeout: Duration::from_secs(60),
            },
            CriterionSpec {
                id: CriterionId::Devops,
                weight: 0.20,
                priority: Priority::Critical,
                relevant_globs: vec![".github/workflows/**", "Dockerfile", ".uvmgr/**"],
                validator: validators::devops::handle(),
                default_timeout: Duration::from_secs(30),
            },
            CriterionSpec {
                id: CriterionId::CodeQuality,
                weight: 0.10,
                priority: Priority::Important,
                relevant_globs: vec!["src/**/*", "lib/**/*"],
                validator: validators::code_quality::handle(),
                default_timeout: Duration::from_secs(60),
            },
            CriterionSpec {
                id: CriterionId::Documentation,
                weight: 0.10,
                priority: Priority::Important,
                relevant_globs: vec!["README*", "docs/**", "CHANGELOG*"],
                validator: validators::documentation::handle(),
                default_timeout: Duration::from_secs(30),
            },
            CriterionSpec {
                id: CriterionId::Performance,
                weight: 0.05,
                priority: Priority::Optional,
                relevant_globs: vec!["benches/**", "benchmarks/**"],
                validator: validators::performance::handle(),
                default_timeout: Duration::from_secs(30),
            },
            CriterionSpec {
                id: CriterionId::Compliance,
                weight: 0.05,
                priority: Priority::Optional,
                relevant_globs: vec!["LICENSE*", "CODEOWNERS", "CONTRIBUTING*"],
                validator: validators::compliance::handle(),
                default_timeout: Duration::from_secs(15),
            },
        ];

        let registry = Self { specs };
        registry
            .validate()
            .expect("reference registry must satisfy W1/W2 by construction");
        registry
    }

    /// O(1) lookup by id.
    pub fn get(&self, id: CriterionId) -> Option<&CriterionSpec> {
        self.specs.iter().find(|s| s.id == id)
    }

    /// All specs in canonical order (critical → important → optional,
    /// alphabetical by id within a tier).
    pub fn list(&self) -> Vec<&CriterionSpec> {
        let mut specs: Vec<&CriterionSpec> = self.specs.iter().collect();
        specs.sort_by(|a, b| {
            a.priority
                .rank()
                .cmp(&b.priority.rank())
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        specs
    }

    /// Apply `{weight, priority, threshold}` overrides loaded from an
    /// on-disk `config.yaml`. Returns a new registry; the receiver is
    /// unchanged (specs are immutable once built).
    pub fn with_overrides(&self, overrides: &[(CriterionId, f64, Priority)]) -> Result<Self> {
        let mut specs = self.specs.clone();
        for (id, weight, priority) in overrides {
            if let Some(spec) = specs.iter_mut().find(|s| s.id == *id) {
                spec.weight = *weight;
                spec.priority = *priority;
            }
        }
        let registry = Self { specs };
        registry.validate()?;
        Ok(registry)
    }

    /// Validate invariants W1 (weights sum to 1.0 ± tolerance) and W2
    /// (critical weights >= important weights >= optional weights).
    pub fn validate(&self) -> Result<()> {
        let total: f64 = self.specs.iter().map(|s| s.weight).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(DodError::internal(format!(
                "criterion weights must sum to 1.0 (±{WEIGHT_TOLERANCE}), got {total}"
            )));
        }

        let min_weight = |p: Priority| -> f64 {
            self.specs
                .iter()
                .filter(|s| s.priority == p)
                .map(|s| s.weight)
                .fold(f64::INFINITY, f64::min)
        };
        let max_weight = |p: Priority| -> f64 {
            self.specs
                .iter()
                .filter(|s| s.priority == p)
                .map(|s| s.weight)
                .fold(f64::NEG_INFINITY, f64::max)
        };

        let critical_min = min_weight(Priority::Critical);
        let important_max = max_weight(Priority::Important);
        if critical_min.is_finite() && important_max.is_finite() && critical_min < important_max {
            return Err(DodError::internal(
                "every critical criterion must weigh at least as much as every important criterion (W2)",
            ));
        }

        let important_min = min_weight(Priority::Important);
        let optional_max = max_weight(Priority::Optional);
        if important_min.is_finite() && optional_max.is_finite() && important_min < optional_max {
            return Err(DodError::internal(
                "every important criterion must weigh at least as much as every optional criterion (W2)",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_registry_satisfies_w1() {
        let registry = CriterionRegistry::reference();
        let total: f64 = registry.list().iter().map(|s| s.weight).sum();
        assert!((total - 1.0).abs() < WEIGHT_TOLERANCE);
    }

    #[test]
    fn canonical_order_is_tier_then_alphabetical() {
        let registry = CriterionRegistry::reference();
        let order: Vec<&str> = registry.list().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "devops",
                "security",
                "testing",
                "code_quality",
                "documentation",
                "compliance",
                "performance",
            ]
        );
    }

    #[test]
    fn parse_rejects_unknown_ids() {
        assert!(CriterionId::parse("nonexistent").is_err());
        assert_eq!(CriterionId::parse("testing").unwrap(), CriterionId::Testing);
    }

    #[test]
    fn overrides_breaking_w2_are_rejected() {
        let registry = CriterionRegistry::reference();
        let bad = registry.with_overrides(&[(CriterionId::Performance, 0.50, Priority::Optional)]);
        assert!(bad.is_err());
    }
}

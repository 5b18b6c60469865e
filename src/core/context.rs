//! Project Context: a read-only view of a project root, constructed once per
//! run and never mutated afterward.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::criteria::{CriterionId, CriterionRegistry};
use crate::core::errors::{DodError, Result};

/// Deployment environment. Influences validator thresholds, never weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "development" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            other => Err(DodError::input_field(
                format!("unknown environment '{other}'"),
                "environment",
            )),
        }
    }
}

/// Read-only project view threaded through the planner and every validator.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub environment: Environment,
    pub detected_language_hints: Vec<String>,
    pub run_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Content fingerprint per criterion, derived from hashing the files
    /// matched by that criterion's `relevant_globs`. Computed once here so
    /// validators never need to re-walk the tree to decide whether their
    /// inputs changed.
    fingerprint: HashMap<CriterionId, String>,
}

impl ProjectContext {
    /// Construct a context for `root`, computing the per-criterion
    /// fingerprint against the given registry. Fails with `io_error` if the
    /// root cannot be read at all (a hard, fatal condition per the
    /// specification's failure semantics).
    pub fn new(root: impl Into<PathBuf>, environment: Environment, registry: &CriterionRegistry) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            return Err(DodError::io_msg(
                root.clone(),
                "project root does not exist",
            ));
        }
        if !root.is_dir() {
            return Err(DodError::io_msg(root, "project root is not a directory"));
        }

        let detected_language_hints = detect_language_hints(&root);
        let fingerprint = registry
            .list()
            .iter()
            .map(|spec| (spec.id, fingerprint_globs(&root, &spec.relevant_globs)))
            .collect();

        Ok(Self {
            root,
            environment,
            detected_language_hints,
            run_id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            fingerprint,
        })
    }

    /// Build a context for tests without touching the registry's glob set.
    #[cfg(test)]
    pub fn for_tests(root: impl Into<PathBuf>) -> Result<Self> {
        Self::new(root, Environment::Development, &CriterionRegistry::reference())
    }

    pub fn fingerprint_of(&self, id: CriterionId) -> Option<&str> {
        self.fingerprint.get(&id).map(String::as_str)
    }

    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }
}

/// Opaque, best-effort language hints from file extensions present at the
/// root. The core treats these as opaque strings; only validators interpret
/// them.
fn detect_language_hints(root: &Path) -> Vec<String> {
    let mut hints = std::collections::BTreeSet::new();
    let walker = walkdir::WalkDir::new(root)
        .max_depth(3)
        .into_iter()
        .filter_map(std::result::Result::ok);

    for entry in walker {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) {
            let hint = match ext {
                "rs" => Some("rust"),
                "py" => Some("python"),
                "js" | "mjs" | "cjs" => Some("javascript"),
                "ts" | "tsx" => Some("typescript"),
                "go" => Some("go"),
                "java" => Some("java"),
                _ => None,
            };
            if let Some(hint) = hint {
                hints.insert(hint.to_string());
            }
        }
    }
    hints.into_iter().collect()
}

/// Hash the (sorted, for determinism) set of files matched by `globs` under
/// `root` into a single content fingerprint.
fn fingerprint_globs(root: &Path, globs: &[&str]) -> String {
    let mut matcher = globset::GlobSetBuilder::new();
    for pattern in globs {
        if let Ok(glob) = globset::Glob::new(pattern) {
            matcher.add(glob);
        }
    }
    let matcher = match matcher.build() {
        Ok(m) => m,
        Err(_) => return String::new(),
    };

    let mut matched_paths: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| {
            let relative = p.strip_prefix(root).unwrap_or(p);
            matcher.is_match(relative)
        })
        .collect();
    matched_paths.sort();

    let mut hasher = blake3::Hasher::new();
    for path in matched_paths {
        hasher.update(path.to_string_lossy().as_bytes());
        if let Ok(bytes) = std::fs::read(&path) {
            hasher.update(&bytes);
        }
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rejects_missing_root() {
        let registry = CriterionRegistry::reference();
        let err = ProjectContext::new("/does/not/exist", Environment::Development, &registry);
        assert!(err.is_err());
    }

    #[test]
    fn fingerprint_is_stable_for_unchanged_tree() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("README.md"), b"hello").unwrap();
        let registry = CriterionRegistry::reference();

        let ctx1 = ProjectContext::new(dir.path(), Environment::Development, &registry).unwrap();
        let ctx2 = ProjectContext::new(dir.path(), Environment::Development, &registry).unwrap();

        assert_eq!(
            ctx1.fingerprint_of(CriterionId::Documentation),
            ctx2.fingerprint_of(CriterionId::Documentation)
        );
    }

    #[test]
    fn environment_parses_known_values() {
        assert_eq!(Environment::parse("production").unwrap(), Environment::Production);
        assert!(Environment::parse("bogus").is_err());
    }
}

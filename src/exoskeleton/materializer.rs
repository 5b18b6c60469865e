//! Exoskeleton Materializer: provisions the fixed `.uvmgr/` file set into a
//! project directory.
//!
//! Writes are atomic (temp file + rename) and guarded by an advisory lock at
//! `.uvmgr/.lock`, so two concurrent materializations on the same root never
//! interleave. A failed materialization in `create` mode leaves the
//! filesystem exactly as it was found.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::errors::{DodError, Result};
use crate::core::runtime_config::exoskeleton_lock_path;
use crate::exoskeleton::template::{self, TemplateId};

/// How an existing file at a template's target path is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fail if any target file already exists with different content.
    Create,
    /// Overwrite any existing target file unconditionally.
    Force,
    /// Compute the result without writing anything.
    Preview,
}

/// Outcome of a materialization, reported back to the caller verbatim.
#[derive(Debug, Clone, Default)]
pub struct MaterializationResult {
    pub files_created: Vec<String>,
    pub files_overwritten: Vec<String>,
    pub files_skipped: Vec<String>,
    pub workflows_created: usize,
    pub ai_integrations_enabled: bool,
}

/// An open advisory lock on `root/.uvmgr/.lock`, held for the duration of a
/// materialization and released (file removed) on drop.
struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    fn acquire(root: &Path) -> Result<Self> {
        let path = exoskeleton_lock_path(root);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DodError::io(parent, "failed to create .uvmgr directory", e))?;
        }
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Self { path }),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(DodError::io_msg(
                &path,
                "another exoskeleton operation is already in progress (lock file exists)",
            )),
            Err(e) => Err(DodError::io(&path, "failed to acquire exoskeleton lock", e)),
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Materialize `template` into `root` under `mode`.
pub fn materialize(root: &Path, template: TemplateId, mode: Mode) -> Result<MaterializationResult> {
    let _lock = LockGuard::acquire(root)?;
    let files = template::file_set(template);

    // Dry-run the whole set before writing anything, so `Create` mode can
    // enumerate every conflicting path and fail atomically without having
    // already written earlier files in the set.
    let mut plan = Vec::with_capacity(files.len());
    let mut conflicts = Vec::new();
    for file in &files {
        let target = root.join(&file.relative_path);
        let existing = fs::read_to_string(&target).ok();
        let action = match existing {
            None => Action::Create,
            Some(ref current) if current == &file.content => Action::Skip,
            Some(_) if mode == Mode::Force => Action::Overwrite,
            Some(_) if mode == Mode::Preview => Action::Overwrite,
            Some(_) => {
                conflicts.push(target.clone());
                Action::Skip
            }
        };
        plan.push((target, file, action));
    }

    if !conflicts.is_empty() {
        return Err(DodError::exoskeleton_conflict(conflicts));
    }

    let mut result = MaterializationResult {
        workflows_created: template::workflow_file_count(template),
        ai_integrations_enabled: template::ai_integrations_enabled(template),
        ..Default::default()
    };

    for (target, file, action) in plan {
        match action {
            Action::Skip => result.files_skipped.push(file.relative_path.clone()),
            Action::Create => {
                if mode != Mode::Preview {
                    write_atomic(&target, &file.content)?;
                }
                result.files_created.push(file.relative_path.clone());
            }
            Action::Overwrite => {
                if mode != Mode::Preview {
                    write_atomic(&target, &file.content)?;
                }
                result.files_overwritten.push(file.relative_path.clone());
            }
        }
    }

    Ok(result)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Create,
    Overwrite,
    Skip,
}

fn write_atomic(target: &Path, content: &str) -> Result<()> {
    let parent = target.parent().ok_or_else(|| DodError::io_msg(target, "target path has no parent directory"))?;
    fs::create_dir_all(parent).map_err(|e| DodError::io(parent, "failed to create parent directory", e))?;

    let temp_path = parent.join(format!(
        ".{}.tmp",
        target.file_name().and_then(|n| n.to_str()).unwrap_or("exoskeleton")
    ));
    fs::write(&temp_path, content).map_err(|e| DodError::io(&temp_path, "failed to write temporary file", e))?;
    fs::rename(&temp_path, target).map_err(|e| DodError::io(target, "failed to finalize file", e))?;
    Ok(())
}

//! Fixed, versioned template file sets for the exoskeleton materializer.
//! Every template id names a closed, build-time list of `(relative path,
//! content)` pairs — there is no user-defined template.

use crate::core::errors::{DodError, Result};
use crate::core::runtime_config::OnDiskConfig;
use crate::pipeline_gen::github;

/// One of the three shipped exoskeleton templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateId {
    Standard,
    Enterprise,
    AiNative,
}

impl TemplateId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Enterprise => "enterprise",
            Self::AiNative => "ai-native",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "standard" => Ok(Self::Standard),
            "enterprise" => Ok(Self::Enterprise),
            "ai-native" => Ok(Self::AiNative),
            other => Err(DodError::input_field(
                format!("unknown exoskeleton template '{other}'"),
                "template_id",
            )),
        }
    }
}

/// One file the template wants materialized, relative to the project root.
pub struct TemplateFile {
    pub relative_path: String,
    pub content: String,
}

/// Build the fixed file set for `template`. Ordered so that reported
/// file lists (`files_created`/`files_overwritten`/`files_skipped`) have a
/// stable, canonical order (specification §8 property 6).
pub fn file_set(template: TemplateId) -> Vec<TemplateFile> {
    let mut files = vec![
        TemplateFile {
            relative_path: ".uvmgr/exoskeleton/config.yaml".to_string(),
            content: serde_yaml::to_string(&OnDiskConfig::defaults(template.as_str()))
                .expect("OnDiskConfig::defaults always serializes"),
        },
        TemplateFile {
            relative_path: ".uvmgr/exoskeleton/templates/README.md".to_string(),
            content: templates_readme(template),
        },
        TemplateFile {
            relative_path: ".uvmgr/automation/workflows/README.md".to_string(),
            content: "Workflow definitions placed here are opaque to the evaluation core.\n".to_string(),
        },
        TemplateFile {
            relative_path: ".uvmgr/telemetry/.gitkeep".to_string(),
            content: String::new(),
        },
        TemplateFile {
            relative_path: ".github/workflows/dod.yml".to_string(),
            content: github::render_default(),
        },
    ];

    if matches!(template, TemplateId::Enterprise) {
        files.push(TemplateFile {
            relative_path: "CODEOWNERS".to_string(),
            content: "* @org/platform-team\n".to_string(),
        });
    }

    if matches!(template, TemplateId::AiNative) {
        files.push(TemplateFile {
            relative_path: ".uvmgr/ai/README.md".to_string(),
            content: "Optional suggestion-provider integration point. \
                Implementations satisfy `validators::SuggestionProvider`.\n"
                .to_string(),
        });
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    files
}

/// Whether this template provisions at least one CI workflow file — feeds
/// `MaterializationResult::workflows_created`.
pub fn workflow_file_count(template: TemplateId) -> usize {
    file_set(template)
        .iter()
        .filter(|f| f.relative_path.starts_with(".github/workflows/"))
        .count()
}

/// Whether this template enables AI integrations —
/// `MaterializationResult::ai_integrations_enabled`.
pub fn ai_integrations_enabled(template: TemplateId) -> bool {
    matches!(template, TemplateId::AiNative)
}

fn templates_readme(template: TemplateId) -> String {
    format!(
        "Provider CI manifest templates for the '{}' exoskeleton.\nRegenerate with `dodctl pipeline generate`.\n",
        template.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_set_is_stably_ordered() {
        let first = file_set(TemplateId::Standard);
        let second = file_set(TemplateId::Standard);
        let first_paths: Vec<&str> = first.iter().map(|f| f.relative_path.as_str()).collect();
        let second_paths: Vec<&str> = second.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(first_paths, second_paths);
        let mut sorted = first_paths.clone();
        sorted.sort();
        assert_eq!(first_paths, sorted);
    }

    #[test]
    fn enterprise_adds_codeowners() {
        let files = file_set(TemplateId::Enterprise);
        assert!(files.iter().any(|f| f.relative_path == "CODEOWNERS"));
    }

    #[test]
    fn ai_native_is_flagged() {
        assert!(ai_integrations_enabled(TemplateId::AiNative));
        assert!(!ai_integrations_enabled(TemplateId::Standard));
    }

    #[test]
    fn parse_rejects_unknown_template() {
        assert!(TemplateId::parse("bespoke").is_err());
    }
}

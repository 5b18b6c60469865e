//! Azure Pipelines manifest rendering.

use handlebars::Handlebars;
use serde::Serialize;

use super::{criteria_csv, PipelineContext};

const TEMPLATE: &str = r#"trigger:
  - main

pool:
  vmImage: 'ubuntu-latest'

steps:
{{#each environments}}
  - script: dodctl automate-complete --criteria {{../criteria_csv}} --environment {{this}}{{#if ../auto_fix}} --auto-fix{{/if}}
    displayName: 'Run Definition-of-Done automation ({{this}})'
{{/each}}
"#;

#[derive(Serialize)]
struct TemplateContext {
    criteria_csv: String,
    environments: Vec<&'static str>,
    auto_fix: bool,
}

fn template_context(ctx: &PipelineContext) -> TemplateContext {
    TemplateContext {
        criteria_csv: criteria_csv(ctx),
        environments: ctx.environments.iter().map(|e| e.as_str()).collect(),
        auto_fix: ctx.auto_fix,
    }
}

/// Render the manifest from a resolved [`PipelineContext`].
pub fn render(ctx: &PipelineContext) -> String {
    let handlebars = Handlebars::new();
    handlebars
        .render_template(TEMPLATE, &template_context(ctx))
        .expect("azure pipeline template is a fixed, validated literal")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exoskeleton::TemplateId;

    #[test]
    fn renders_ubuntu_pool_by_default() {
        let ctx = super::super::resolve(&[], &[], TemplateId::Standard).unwrap();
        assert!(render(&ctx).contains("ubuntu-latest"));
    }

    #[test]
    fn multiple_environments_produce_one_step_each() {
        let ctx = super::super::resolve(&[], &["development".to_string(), "staging".to_string()], TemplateId::Standard).unwrap();
        assert_eq!(render(&ctx).matches("displayName:").count(), 2);
    }
}

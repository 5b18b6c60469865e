//! GitLab CI manifest rendering.

use handlebars::Handlebars;
use serde::Serialize;

use super::{criteria_csv, PipelineContext};

const TEMPLATE: &str = r#"stages:
  - dod

{{#each environments}}
dod:{{this}}:
  stage: dod
  image: rust:latest
  script:
    - dodctl automate-complete --criteria {{../criteria_csv}} --environment {{this}}{{#if ../auto_fix}} --auto-fix{{/if}}
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
        .expect("gitlab pipeline template is a fixed, validated literal")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exoskeleton::TemplateId;

    #[test]
    fn renders_a_dod_stage_per_environment() {
        let ctx = super::super::resolve(&[], &["development".to_string()], TemplateId::Standard).unwrap();
        let manifest = render(&ctx);
        assert!(manifest.contains("stage: dod"));
        assert!(manifest.contains("dod:development"));
    }
}

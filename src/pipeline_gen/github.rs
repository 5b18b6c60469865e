//! GitHub Actions manifest rendering.

use handlebars::Handlebars;
use serde::Serialize;

use super::{criteria_csv, PipelineContext};

const TEMPLATE: &str = r#"name: Definition of Done

on:
  push:
    branches: [main]
  pull_request:

jobs:
  dod:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
{{#each environments}}
      - name: Run Definition-of-Done automation ({{this}})
        run: dodctl automate-complete --criteria {{../criteria_csv}} --environment {{this}}{{#if ../auto_fix}} --auto-fix{{/if}}
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
        .expect("github workflow template is a fixed, validated literal")
}

/// The manifest used by the exoskeleton materializer when no explicit
/// pipeline has been requested: every criterion, the development
/// environment only, no auto-fix.
pub fn render_default() -> String {
    let ctx = super::resolve(&[], &[], crate::exoskeleton::TemplateId::Standard)
        .expect("the empty feature/environment set always resolves");
    render(&ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exoskeleton::TemplateId;

    #[test]
    fn default_render_has_no_auto_fix_flag() {
        let manifest = render_default();
        assert!(!manifest.contains("--auto-fix"));
        assert!(manifest.contains("actions/checkout"));
    }

    #[test]
    fn ai_native_template_adds_auto_fix_flag() {
        let ctx = super::super::resolve(&[], &[], TemplateId::AiNative).unwrap();
        assert!(render(&ctx).contains("--auto-fix"));
    }

    #[test]
    fn multiple_environments_produce_one_step_each() {
        let ctx = super::super::resolve(&[], &["development".to_string(), "production".to_string()], TemplateId::Standard).unwrap();
        let manifest = render(&ctx);
        assert_eq!(manifest.matches("Run Definition-of-Done automation").count(), 2);
    }
}

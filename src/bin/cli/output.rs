//! Report rendering for the `dodctl` terminal output.

use owo_colors::OwoColorize;
use tabled::{settings::Style as TableStyle, Table, Tabled};

use dod_engine::api::StatusReport;
use dod_engine::AutomationReport;

#[derive(Tabled)]
struct CriterionRow {
    #[tabled(rename = "criterion")]
    id: String,
    #[tabled(rename = "outcome")]
    outcome: String,
    #[tabled(rename = "score")]
    score: String,
    #[tabled(rename = "passed")]
    passed: String,
}

/// Print a human-readable rendering of an [`AutomationReport`].
pub fn print_report(report: &AutomationReport) {
    if report.no_criteria {
        println!("{}", "no criteria selected".yellow());
        return;
    }

    let mut rows: Vec<CriterionRow> = report
        .criterion_results
        .values()
        .map(|result| CriterionRow {
            id: result.id.as_str().to_string(),
            outcome: result.outcome.as_str().to_string(),
            score: format!("{:.1}", result.score),
            passed: if result.passed { "yes".to_string() } else { "no".to_string() },
        })
        .collect();
    rows.sort_by(|a, b| a.id.cmp(&b.id));

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{table}");

    println!();
    println!("overall score: {}", format!("{:.1}", report.overall_score).bold());
    if report.success {
        println!("status: {}", "success".green().bold());
    } else {
        println!("status: {}", "failed".red().bold());
    }
    if report.terminated_early {
        println!("{}", "note: optional-tier phases were skipped (early-termination threshold met)".dimmed());
    }
}

/// Print a human-readable rendering of a [`StatusReport`].
pub fn print_status(status: &StatusReport) {
    println!("environment: {}", status.environment.as_str());
    println!(
        "exoskeleton: {}",
        if status.exoskeleton_present {
            "present".green().to_string()
        } else {
            "absent".yellow().to_string()
        }
    );
    println!();
    for criterion in &status.criteria {
        println!("  {:<14} weight={:<5.2} priority={}", criterion.id.as_str(), criterion.weight, criterion.priority);
    }
}

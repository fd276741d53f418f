//! Report rendering for pass results
//!
//! Text for humans, JSON for tooling. Both include the recorded weave plan.

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::pass::PassSummary;
use crate::transformer::InjectionOutcome;
use crate::weaver::WeavePatch;

#[derive(Serialize)]
struct JsonOutput<'a> {
    summary: &'a PassSummary,
    patches: &'a [WeavePatch],
}

/// Render a summary and its weave plan in the requested format
pub fn render(
    format: OutputFormat,
    summary: &PassSummary,
    patches: &[WeavePatch],
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(to_text(summary, patches)),
        OutputFormat::Json => to_json(summary, patches),
    }
}

/// Pretty-printed JSON document with `summary` and `patches` keys
pub fn to_json(summary: &PassSummary, patches: &[WeavePatch]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonOutput { summary, patches })
}

/// Human-readable report
pub fn to_text(summary: &PassSummary, patches: &[WeavePatch]) -> String {
    let mut out = String::new();

    for report in &summary.reports {
        let categories: Vec<String> = report.categories.iter().map(|c| c.to_string()).collect();
        out.push_str(&format!(
            "{} [{}]: {} injected, {} skipped, {} failed\n",
            report.class_name,
            categories.join(", "),
            report.injected_count(),
            report.skipped_count(),
            report.failed_count()
        ));
        for method in &report.methods {
            match &method.outcome {
                InjectionOutcome::Failed { error } => {
                    out.push_str(&format!(
                        "  {:<18} {} ({})\n",
                        method.outcome.label(),
                        method.method,
                        error
                    ));
                }
                outcome => {
                    out.push_str(&format!("  {:<18} {}\n", outcome.label(), method.method));
                }
            }
        }
    }

    for failure in &summary.failures {
        out.push_str(&format!("{}: FAILED: {}\n", failure.class, failure.error));
    }

    if !patches.is_empty() {
        out.push_str(&format!("\nWeave plan ({} patches):\n", patches.len()));
        for patch in patches {
            let action = if patch.creates_override { "override" } else { "append" };
            out.push_str(&format!(
                "  {:<8} {}.{}{}\n",
                action, patch.class, patch.method, patch.signature
            ));
        }
    }

    out.push_str(&format!(
        "\n{} transformed, {} not applicable, {} failed\n",
        summary.reports.len(),
        summary.rejected.len(),
        summary.failures.len()
    ));
    out
}

//! Console and JSON rendering of loop reports

use colored::*;
use eyre::{Context, Result};
use serde::Serialize;
use std::fmt::Display;
use std::fs;
use std::path::Path;

use synthloop::refine::{LoopReport, Outcome, Termination};

/// Lines of failure detail shown per round
const DETAIL_LINES: usize = 6;

pub fn termination_label(termination: Termination) -> ColoredString {
    let text = termination.to_string();
    match termination {
        Termination::Success => text.green().bold(),
        Termination::FatalError => text.red().bold(),
        Termination::MaxRoundsExceeded => text.yellow().bold(),
    }
}

fn outcome_label<R>(outcome: &Outcome<R>) -> ColoredString {
    let label = outcome.label();
    match outcome {
        Outcome::Success(_) => label.green(),
        Outcome::RecoverableFailure(_) => label.yellow(),
        Outcome::FatalError(_) => label.red(),
        Outcome::Pending => label.dimmed(),
    }
}

/// One-line plain summary
pub fn summary_line<A, R>(report: &LoopReport<A, R>) -> String {
    let mut line = format!(
        "{} after {} of {} round(s)",
        report.termination, report.rounds, report.round_limit
    );
    if report.failed_proposals > 0 {
        line.push_str(&format!(", {} unusable proposal(s)", report.failed_proposals));
    }
    line
}

pub fn print_summary<A, R>(title: &str, report: &LoopReport<A, R>) {
    println!(
        "{} {} ({})",
        title.cyan().bold(),
        termination_label(report.termination),
        summary_line(report)
    );
    if report.termination == Termination::FatalError
        && let Some(detail) = report.final_outcome.detail()
    {
        println!("  {} {}", "Error:".red(), detail);
    }
}

/// Per-round artifact and outcome, with failure detail trimmed
pub fn print_history<A: Display, R>(report: &LoopReport<A, R>) {
    for record in &report.history {
        println!(
            "{} {}",
            format!("Round {}:", record.round).bold(),
            outcome_label(&record.outcome)
        );
        for line in record.artifact.to_string().lines() {
            println!("    {}", line.dimmed());
        }
        if let Some(detail) = record.outcome.detail() {
            for line in detail.lines().take(DETAIL_LINES) {
                println!("  {}", line);
            }
            let hidden = detail.lines().count().saturating_sub(DETAIL_LINES);
            if hidden > 0 {
                println!("  {}", format!("... {} more line(s)", hidden).dimmed());
            }
        }
    }
}

pub fn write_json<A: Serialize, R: Serialize>(report: &LoopReport<A, R>, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(path, json).context(format!("Failed to write report to {}", path.display()))?;
    Ok(())
}

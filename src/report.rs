//! Output formatting for migrascope results.
//!
//! Supports two output formats:
//! - JSON: the documents downstream tooling consumes
//! - Pretty: colored terminal summaries for humans

use colored::*;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::model::FileModel;
use crate::resolve::{LookupStrategy, ResolutionSummary, TypeResolutionReport};
use crate::score::{EquivalenceReport, Verdict};

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pretty,
    Json,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(Format::Pretty),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown format '{}' (expected pretty or json)", other)),
        }
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// Serialize `value` as pretty JSON to `output`, or stdout when `None`.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, json + "\n")?;
            eprintln!("Results saved to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

fn write_header(title: &str) {
    println!();
    print!("  ");
    print!("{}", "migrascope".cyan().bold());
    println!(" v{}  {}", env!("CARGO_PKG_VERSION"), title.dimmed());
    println!();
}

/// Counts of what was extracted from one file.
pub fn write_model_pretty(file_model: &FileModel) {
    let model = &file_model.model;
    write_header("extract");

    print!("  {}", "File: ".dimmed());
    println!("{}", file_model.current_file.blue());
    println!();

    println!("    {:<28} {:>4}", "Variables", model.variables.len());
    println!("    {:<28} {:>4}", "Methods", model.methods.len());
    println!(
        "    {:<28} {:>4}",
        "Member initializers",
        model.member_initializer_variables.len()
    );
    let calls: usize = model.method_invocations.values().map(Vec::len).sum();
    println!("    {:<28} {:>4}", "Call sites", calls);
    let locals: usize = model.method_local_variables.values().map(Vec::len).sum();
    println!("    {:<28} {:>4}", "Local variables", locals);

    if let Some(parent) = &model.parent_info {
        println!();
        print!("  {}", "Parent: ".dimmed());
        print!("{}", parent.parent_class);
        match (&parent.parent_file, &parent.error) {
            (_, Some(error)) => print!("  {}", error.red()),
            (Some(file), None) => print!("  {}", file.blue()),
            (None, None) => {}
        }
        println!();
    }
    println!();
}

/// Per-call resolution details followed by the summary statistics.
pub fn write_resolution_pretty(report: &TypeResolutionReport) {
    write_header("resolve");

    print!("  {}", "File: ".dimmed());
    println!("{}", report.file_name.blue());

    for (method, calls) in &report.type_resolutions {
        println!();
        println!("  {} {}", "Method".bold(), method);

        for call in calls {
            if call.declaration_found {
                print!("    {} ", "✓".green());
            } else {
                print!("    {} ", "✗".red());
            }
            print!("{}", format!("{:>4}", call.line).dimmed());
            println!("  {}", call.method_call);

            match (&call.resolved_type, call.lookup_strategy) {
                (Some(ty), Some(strategy)) => {
                    let at = call
                        .declaration_line
                        .map(|l| format!(" at line {}", l))
                        .unwrap_or_default();
                    println!(
                        "           {} {}  {}",
                        call.variable_name,
                        ty.green(),
                        format!("({}{})", strategy.label(), at).dimmed()
                    );
                }
                _ => println!("           {} {}", call.variable_name, "UNRESOLVED".red()),
            }
        }
    }

    println!();
    write_resolution_summary(&report.summary());
    println!();
}

fn write_resolution_summary(summary: &ResolutionSummary) {
    println!("  {}", "Resolution:".bold());
    println!("    {:<28} {:>4}", "Single-receiver calls", summary.total_calls);
    println!("    {:<28} {:>4}", "Resolved", summary.resolved);
    if summary.total_calls > 0 {
        let rate = format!("{:.1}%", summary.resolution_rate);
        let rate = if summary.unresolved == 0 {
            rate.green()
        } else {
            rate.yellow()
        };
        println!("    {:<28} {:>6}", "Rate", rate);
    }

    println!();
    println!("  {}", "By strategy:".bold());
    for strategy in LookupStrategy::ALL {
        let count = summary.by_strategy.get(&strategy).copied().unwrap_or(0);
        let share = if summary.resolved > 0 {
            count as f64 / summary.resolved as f64 * 100.0
        } else {
            0.0
        };
        println!(
            "    {:<28} {:>4} {}",
            strategy.label(),
            count,
            format!("({:.1}%)", share).dimmed()
        );
    }
}

fn colored_verdict(verdict: Verdict) -> ColoredString {
    let label = verdict.as_str().to_uppercase();
    match verdict {
        Verdict::Excellent => label.green().bold(),
        Verdict::Possible => label.yellow(),
        Verdict::NoMatch => label.red(),
    }
}

/// Counts, verdict and the top matches of one file pair.
pub fn write_equivalence_pretty(report: &EquivalenceReport) {
    let score = &report.score;
    write_header("score");

    print!("  {}", "C++:  ".dimmed());
    println!("{}", report.cpp_file.blue());
    print!("  {}", "Java: ".dimmed());
    println!("{}", report.java_file.blue());
    println!();

    println!("    {:<28} {:>4}", "C++ fields", score.cpp_fields_count);
    println!("    {:<28} {:>4}", "Java fields", score.java_fields_count);
    println!(
        "    {:<28} {:>4}",
        format!("Matches (>= {}%)", score.threshold),
        score.matches_found
    );
    println!(
        "    {:<28} {}/{}",
        "C++ fields matched", score.cpp_fields_matched, score.cpp_fields_count
    );
    println!(
        "    {:<28} {}/{} ({:.1}%)",
        "Java fields matched",
        score.java_fields_matched,
        score.cpp_fields_count,
        score.match_percentage
    );

    if !score.matches.is_empty() {
        println!();
        println!("  {}", "Top matches:".bold());
        for (i, m) in score.matches.iter().take(5).enumerate() {
            println!(
                "    {}. {} ↔ {} {}",
                i + 1,
                m.cpp_field.name,
                m.java_field.name,
                format!("({}%)", m.similarity_score).dimmed()
            );
        }
    }

    println!();
    println!("  Result: {}", colored_verdict(score.final_result));
    println!();
}

/// Ranked candidate table.
pub fn write_rank_pretty(cpp_file: &str, reports: &[EquivalenceReport]) {
    write_header("rank");

    print!("  {}", "C++: ".dimmed());
    println!("{}", cpp_file.blue());
    println!();

    if reports.is_empty() {
        println!("  {}", "No candidates scored.".dimmed());
        println!();
        return;
    }

    for (i, report) in reports.iter().enumerate() {
        println!(
            "    {:>3}. {:>7}  {:<10} {}",
            i + 1,
            format!("{:.1}%", report.score.match_percentage),
            colored_verdict(report.score.final_result),
            report.java_file
        );
    }
    println!();
}

//! Human-facing output on stdout.

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use patchport_core::PropagationOutcome;
use patchport_engine::{BumpOutcome, EngineError, ReleaseOutcome, ReleaseReport, RunSummary};

#[derive(Tabled)]
struct DestinationRow {
    #[tabled(rename = "destination")]
    destination: String,
    #[tabled(rename = "branch")]
    branch: String,
    #[tabled(rename = "outcome")]
    outcome: String,
    #[tabled(rename = "detail")]
    detail: String,
}

pub fn banner() {
    println!(
        "{} {}",
        "PatchPort".blue().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}

fn outcome_cells(outcome: &PropagationOutcome) -> (String, String) {
    match outcome {
        PropagationOutcome::Succeeded { pull_request, .. } => {
            ("OPENED".green().to_string(), pull_request.clone())
        }
        PropagationOutcome::Skipped { reason } => ("SKIPPED".yellow().to_string(), reason.clone()),
        PropagationOutcome::Failed { stage, cause } => {
            (format!("FAILED ({stage})").red().to_string(), cause.clone())
        }
    }
}

fn destination_rows(summary: &RunSummary) -> Vec<DestinationRow> {
    let mut rows: Vec<DestinationRow> = summary
        .reports
        .iter()
        .map(|report| {
            let (outcome, detail) = outcome_cells(&report.outcome);
            DestinationRow {
                destination: report.destination.clone(),
                branch: report.branch.clone().unwrap_or_else(|| "-".to_string()),
                outcome,
                detail,
            }
        })
        .collect();
    rows.extend(summary.not_attempted.iter().map(|name| DestinationRow {
        destination: name.clone(),
        branch: "-".to_string(),
        outcome: "NOT ATTEMPTED".bright_black().to_string(),
        detail: String::new(),
    }));
    rows
}

pub fn run_summary(summary: &RunSummary) {
    println!();
    println!(
        "{} {} from {}",
        summary.commit.short().bold(),
        summary.commit_title.trim(),
        summary.origin.display_name()
    );
    let mut table = Table::new(destination_rows(summary));
    table.with(Style::rounded());
    println!("{table}");

    if let Some(warning) = &summary.cleanup_error {
        println!("{}", warning.yellow());
    }
    match &summary.abort {
        None => println!(
            "{}",
            "All done! Go check your repository pull requests on GitHub.".green()
        ),
        Some(failure) => {
            println!("{}", failure.to_string().red());
            println!("Finish this step by hand, then run patchport again for the remaining destinations.");
        }
    }
}

pub fn release_report(report: &ReleaseReport) {
    let plan = &report.plan;
    match &report.bump {
        Some(BumpOutcome::Committed(change)) => println!(
            "{} {} -> {} on {}",
            "Version bumped".green(),
            change.from,
            change.to,
            plan.source.vcs_branch()
        ),
        Some(BumpOutcome::Discarded(_)) => println!("{}", "Version bump discarded.".yellow()),
        None => {}
    }

    match &report.outcome {
        ReleaseOutcome::Opened { url } => {
            println!("{} {url}", "Pull request created:".green());
        }
        ReleaseOutcome::PrFailed { cause } => {
            println!(
                "{} {} was pushed but the pull request failed: {cause}",
                "Warning:".yellow(),
                plan.release_branch
            );
        }
        ReleaseOutcome::PushDeclined => {
            println!(
                "Push cancelled by user. {} exists only locally.",
                plan.release_branch
            );
        }
        ReleaseOutcome::Aborted(failure) => println!("{}", failure.to_string().red()),
    }
}

pub fn aborted(err: &EngineError) {
    println!("{}", format!("Aborting... {err}").red());
}

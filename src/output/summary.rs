//! End of pass summary table.

use super::terminal::format_field;
use crate::processing::{Outcome, PassReport, RecordOutcome};
use colored::Colorize;

/// One printable line per record, in dispatch order.
pub fn summary_lines(report: &PassReport) -> Vec<String> {
    report.outcomes.iter().map(summary_line).collect()
}

fn summary_line(o: &RecordOutcome) -> String {
    let (status, detail) = match &o.outcome {
        Outcome::Created(handle) => ("created", handle.to_string()),
        Outcome::Deleted => ("deleted", String::new()),
        Outcome::Skipped => ("skipped", String::new()),
        Outcome::Failed(e) => ("failed", e.to_string()),
    };
    format!(
        "{row},{label},{status},{detail}",
        row = format_field(o.index, 5),
        label = format_field(&o.label, 28),
        status = format_field(status, 10),
        detail = format_field(detail, 0),
    )
}

/// Print the pass outcome to stdout.
pub fn print_summary(report: &PassReport) {
    println!(
        r#"  "row",                      "network",  "outcome", "detail""#
    );
    for (line, o) in summary_lines(report).iter().zip(&report.outcomes) {
        match o.outcome {
            Outcome::Failed(_) => println!("{}", line.red()),
            Outcome::Skipped => println!("{}", line.dimmed()),
            _ => println!("{}", line.green()),
        }
    }

    let failed = report.failed();
    if failed > 0 {
        println!(
            "#{}# {failed} of {} record(s) failed during {} pass",
            "NOTE".on_red(),
            report.outcomes.len(),
            report.direction
        );
    }
}

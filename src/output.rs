//! CLI output formatting.
//!
//! Each finished job is shown as its positional index and key, with the
//! result as an indented context line:
//!
//! ```text
//! 001 photos/IMG_0042.jpg
//!     Saved: compressed/Pictures/squishpic/IMG-20240131-235959123.jpg
//! 002 photos/broken.jpg
//!     Failed: decode failed: Processing failed: Failed to decode: ...
//!
//! Compressed 1 of 3 images (1 failed, 1 duplicate skipped)
//! ```
//!
//! `format_*` functions return lines and do no I/O; `print_*` wrappers write
//! them to stdout.

use crate::dedup::JobReport;
use crate::job::JobOutcome;

/// Tally of a CLI run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub duplicates: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &JobOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Format one job report.
pub fn format_report(index: usize, report: &JobReport) -> Vec<String> {
    let detail = match &report.outcome {
        JobOutcome::Success { saved_location } => format!("    Saved: {saved_location}"),
        JobOutcome::Failure { failure_message } => format!("    Failed: {failure_message}"),
    };
    vec![format!("{} {}", format_index(index), report.key), detail]
}

/// Format the closing summary line.
pub fn format_summary(summary: &RunSummary) -> String {
    let mut extras = Vec::new();
    if summary.failed > 0 {
        extras.push(format!("{} failed", summary.failed));
    }
    match summary.duplicates {
        0 => {}
        1 => extras.push("1 duplicate skipped".to_string()),
        n => extras.push(format!("{n} duplicates skipped")),
    }
    let head = format!(
        "Compressed {} of {} images",
        summary.succeeded, summary.submitted
    );
    if extras.is_empty() {
        head
    } else {
        format!("{head} ({})", extras.join(", "))
    }
}

pub fn print_report(index: usize, report: &JobReport) {
    for line in format_report(index, report) {
        println!("{}", line);
    }
}

pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", format_summary(summary));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Location;

    #[test]
    fn success_report() {
        let report = JobReport {
            key: "photos/a.jpg".into(),
            outcome: JobOutcome::Success {
                saved_location: Location::new("out/a.jpg"),
            },
        };
        assert_eq!(
            format_report(1, &report),
            vec!["001 photos/a.jpg", "    Saved: out/a.jpg"]
        );
    }

    #[test]
    fn failure_report() {
        let report = JobReport {
            key: "b.jpg".into(),
            outcome: JobOutcome::Failure {
                failure_message: "decode failed: bad".into(),
            },
        };
        assert_eq!(
            format_report(12, &report),
            vec!["012 b.jpg", "    Failed: decode failed: bad"]
        );
    }

    #[test]
    fn summary_all_good() {
        let summary = RunSummary {
            submitted: 2,
            succeeded: 2,
            failed: 0,
            duplicates: 0,
        };
        assert_eq!(format_summary(&summary), "Compressed 2 of 2 images");
    }

    #[test]
    fn summary_with_failures_and_duplicates() {
        let summary = RunSummary {
            submitted: 3,
            succeeded: 1,
            failed: 1,
            duplicates: 1,
        };
        assert_eq!(
            format_summary(&summary),
            "Compressed 1 of 3 images (1 failed, 1 duplicate skipped)"
        );
    }

    #[test]
    fn record_counts_outcomes() {
        let mut summary = RunSummary::default();
        summary.record(&JobOutcome::Success {
            saved_location: Location::new("x"),
        });
        summary.record(&JobOutcome::Failure {
            failure_message: "y".into(),
        });
        assert_eq!((summary.succeeded, summary.failed), (1, 1));
    }
}

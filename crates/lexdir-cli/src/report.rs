//! # Validation Report
//!
//! Collects per-document outcomes and renders them either as the
//! human-readable console report or as a single JSON object.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use lexdir_schema::ValidationResult;

/// Title printed between the banner lines of the text report.
pub const REPORT_TITLE: &str = "Legal Directory Data Model Validation";

const BANNER_WIDTH: usize = 60;

/// Output format for reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Console report with one line per violation.
    #[default]
    Text,
    /// One pretty-printed JSON object.
    Json,
}

/// Result of validating one document against one schema.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    /// Schema name as requested (file name or `$id`).
    pub schema: String,
    /// Document name as displayed.
    pub document: String,
    /// What the validator found.
    #[serde(flatten)]
    pub result: ValidationResult,
}

/// Aggregate of every check in one run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    passed: bool,
    checks: Vec<CheckOutcome>,
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

impl Report {
    /// An empty report; passes until a failing outcome is added.
    pub fn new() -> Self {
        Self {
            passed: true,
            checks: Vec::new(),
        }
    }

    /// Record one outcome.
    pub fn push(&mut self, outcome: CheckOutcome) {
        self.passed &= outcome.result.is_valid();
        self.checks.push(outcome);
    }

    /// True if every recorded document was valid.
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Recorded outcomes, in run order.
    pub fn checks(&self) -> &[CheckOutcome] {
        &self.checks
    }

    /// Number of invalid documents.
    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.result.is_valid()).count()
    }

    /// Process exit status for this report.
    pub fn exit_code(&self) -> u8 {
        if self.passed {
            0
        } else {
            1
        }
    }

    /// Render in the requested format.
    pub fn write(&self, format: OutputFormat, out: &mut impl Write) -> io::Result<()> {
        match format {
            OutputFormat::Text => self.write_text(out),
            OutputFormat::Json => self.write_json(out),
        }
    }

    /// Console report.
    pub fn write_text(&self, out: &mut impl Write) -> io::Result<()> {
        let banner = "=".repeat(BANNER_WIDTH);
        writeln!(out, "{banner}")?;
        writeln!(out, "{REPORT_TITLE}")?;
        writeln!(out, "{banner}")?;

        for check in &self.checks {
            writeln!(out)?;
            writeln!(out, "Validating {} against {}:", check.document, check.schema)?;
            if check.result.is_valid() {
                writeln!(out, "✓ Valid")?;
            } else {
                writeln!(out, "✗ Invalid")?;
                writeln!(out, "Errors:")?;
                for violation in check.result.violations() {
                    writeln!(out, "  - {violation}")?;
                }
            }
        }

        writeln!(out)?;
        writeln!(out, "{banner}")?;
        if self.passed {
            writeln!(out, "✓ All validations passed!")
        } else {
            writeln!(out, "✗ Some validations failed!")
        }
    }

    /// JSON report.
    pub fn write_json(&self, out: &mut impl Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexdir_schema::{Violation, ViolationKind};

    fn missing_license() -> CheckOutcome {
        CheckOutcome {
            schema: "lawyer.schema.json".to_string(),
            document: "lawyer-example.json".to_string(),
            result: ValidationResult::from_violations(vec![Violation {
                instance_path: String::new(),
                schema_path: "/required".to_string(),
                kind: ViolationKind::Required,
                message: r#""licenseNumber" is a required property"#.to_string(),
            }]),
        }
    }

    fn valid_firm() -> CheckOutcome {
        CheckOutcome {
            schema: "lawfirm.schema.json".to_string(),
            document: "lawfirm-example.json".to_string(),
            result: ValidationResult::from_violations(Vec::new()),
        }
    }

    fn render(report: &Report, format: OutputFormat) -> String {
        let mut buf = Vec::new();
        report.write(format, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn empty_report_passes() {
        let report = Report::new();
        assert!(report.passed());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn one_failure_fails_the_run() {
        let mut report = Report::new();
        report.push(valid_firm());
        report.push(missing_license());
        report.push(valid_firm());
        assert!(!report.passed());
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn text_report_lists_violations_under_their_document() {
        let mut report = Report::new();
        report.push(missing_license());
        report.push(valid_firm());
        let text = render(&report, OutputFormat::Text);

        let expected = "\nValidating lawyer-example.json against lawyer.schema.json:\n\
                        ✗ Invalid\n\
                        Errors:\n  - (root): \"licenseNumber\" is a required property\n\
                        \nValidating lawfirm-example.json against lawfirm.schema.json:\n\
                        ✓ Valid\n";
        assert!(text.contains(expected), "{text}");
        assert!(text.starts_with(&"=".repeat(60)));
        assert!(text.contains(REPORT_TITLE));
        assert!(text.trim_end().ends_with("✗ Some validations failed!"));
    }

    #[test]
    fn text_report_success_footer() {
        let mut report = Report::new();
        report.push(valid_firm());
        let text = render(&report, OutputFormat::Text);
        assert!(text.trim_end().ends_with("✓ All validations passed!"));
    }

    #[test]
    fn json_report_round_trips_through_serde_json() {
        let mut report = Report::new();
        report.push(missing_license());
        let json: serde_json::Value =
            serde_json::from_str(&render(&report, OutputFormat::Json)).unwrap();

        assert_eq!(json["passed"], false);
        let check = &json["checks"][0];
        assert_eq!(check["schema"], "lawyer.schema.json");
        assert_eq!(check["valid"], false);
        assert_eq!(check["violations"][0]["kind"], "required");
        assert_eq!(check["violations"][0]["instance_path"], "");
    }
}

//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::{Color, Colorize};
use explainer_domain::{Confidence, EvidenceClaim, ResultRecord};
use explainer_verifier::escape_html;
use std::fmt::Write as _;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style, Width},
};

/// Widest a table cell may grow before its text wraps
const CELL_WIDTH: usize = 48;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format an explain result.
    pub fn format_result(&self, record: &ResultRecord) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
            OutputFormat::Table => Ok(self.format_result_table(record)),
            OutputFormat::Quiet => Ok(record.answer.clone()),
        }
    }

    fn format_result_table(&self, record: &ResultRecord) -> String {
        let mut out = String::new();
        let total = record.evidence_claims.len();

        let _ = writeln!(out, "Confidence:      {}", self.confidence_badge(record.confidence));
        let _ = writeln!(out, "Evidence match:  {}/{}", record.verified_count(), total);
        let _ = writeln!(out, "Reason:          {}", record.confidence_reason);
        out.push('\n');

        self.section(&mut out, "Answer");
        let _ = writeln!(out, "{}", record.answer);
        out.push('\n');

        self.section(&mut out, "Black box explanation");
        let explanation = record.black_box_explanation.trim();
        if explanation.is_empty() {
            let _ = writeln!(
                out,
                "{}",
                self.info("The model did not provide a black-box explanation for this run.")
            );
        } else {
            let _ = writeln!(out, "{}", explanation);
        }
        out.push('\n');

        self.section(&mut out, "Evidence");
        if record.evidence_claims.is_empty() {
            let _ = writeln!(out, "{}", self.info("No supporting snippets were returned."));
        } else {
            let _ = writeln!(out, "{}", self.evidence_table(&record.evidence_claims));
        }
        out.push('\n');

        self.bullets(&mut out, "Assumptions", &record.assumptions, "None listed.");
        self.bullets(&mut out, "Uncertainty / what could be wrong", &record.uncertainty, "None listed.");
        self.bullets(&mut out, "What-if questions", &record.followups, "None.");

        out.trim_end().to_string()
    }

    fn evidence_table(&self, claims: &[EvidenceClaim]) -> String {
        let mut builder = Builder::default();
        builder.push_record(["#", "Claim", "Quote", "Found", "Relevance"]);

        for (i, claim) in claims.iter().enumerate() {
            let claim_text = if claim.claim.is_empty() { "Claim" } else { claim.claim.as_str() };
            let found = if claim.verified {
                self.paint("found", Color::Green)
            } else {
                self.paint("not found", Color::Red)
            };
            let relevance = claim
                .question_relevance
                .map(|r| r.as_str().to_string())
                .unwrap_or_default();
            builder.push_record([
                (i + 1).to_string(),
                claim_text.to_string(),
                claim.quote.clone(),
                found,
                relevance,
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Width::wrap(CELL_WIDTH)))
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    fn section(&self, out: &mut String, title: &str) {
        let _ = writeln!(out, "{}", self.heading(title));
    }

    fn bullets(&self, out: &mut String, title: &str, items: &[String], empty: &str) {
        self.section(out, title);
        if items.is_empty() {
            let _ = writeln!(out, "- {}", empty);
        } else {
            for item in items {
                let _ = writeln!(out, "- {}", item);
            }
        }
        out.push('\n');
    }

    /// Uppercase confidence label, colored by level.
    pub fn confidence_badge(&self, confidence: Confidence) -> String {
        let label = confidence.as_str().to_uppercase();
        let color = match confidence {
            Confidence::High => Color::Green,
            Confidence::Medium => Color::Yellow,
            Confidence::Low => Color::Red,
        };
        if self.color_enabled {
            label.color(color).bold().to_string()
        } else {
            label
        }
    }

    /// Format a section heading.
    pub fn heading(&self, title: &str) -> String {
        if self.color_enabled {
            title.bold().underline().to_string()
        } else {
            title.to_string()
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.paint(&format!("✓ {}", message), Color::Green)
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.paint(&format!("✗ {}", message), Color::Red)
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.paint(&format!("ℹ {}", message), Color::Blue)
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.paint(&format!("⚠ {}", message), Color::Yellow)
    }

    /// Colorize text if color is enabled.
    fn paint(&self, text: &str, color: Color) -> String {
        if self.color_enabled {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Standalone HTML page showing the question and the highlighted context
pub fn html_document(question: &str, record: &ResultRecord) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Black Box Explainer</title>
<style>
body {{ font-family: sans-serif; max-width: 52rem; margin: 2rem auto; line-height: 1.5; }}
.context {{ white-space: pre-wrap; border: 1px solid #ddd; border-radius: 8px; padding: 1rem; }}
mark {{ background: #fde68a; padding: 0 2px; }}
</style>
</head>
<body>
<h1>Context with highlights</h1>
<p><strong>Question:</strong> {question}</p>
<p><strong>Confidence:</strong> {confidence} ({verified}/{total} evidence found)</p>
<div class="context">{context}</div>
</body>
</html>
"#,
        question = escape_html(question),
        confidence = record.confidence.as_str().to_uppercase(),
        verified = record.verified_count(),
        total = record.evidence_claims.len(),
        context = record.highlighted_context,
    )
}

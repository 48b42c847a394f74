//! Report export sinks.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use quiz_core::model::{Report, ReportMetadata};
use serde::Serialize;

use crate::error::SinkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Html,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }
}

/// A file written by an export sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Destination for finished reports besides the report repository.
pub trait ExportSink: Send + Sync {
    /// # Errors
    ///
    /// Returns `SinkError` if the report cannot be rendered or written.
    fn export(
        &self,
        metadata: &ReportMetadata,
        report: &Report,
    ) -> Result<ExportArtifact, SinkError>;
}

/// Writes one file per report into a directory.
#[derive(Debug, Clone)]
pub struct FileExporter {
    dir: PathBuf,
    format: ExportFormat,
}

impl FileExporter {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, format: ExportFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    fn file_path(&self, report: &Report) -> PathBuf {
        self.dir.join(format!(
            "quiz-report-{}.{}",
            report.session_id(),
            self.format.extension()
        ))
    }
}

impl ExportSink for FileExporter {
    fn export(
        &self,
        metadata: &ReportMetadata,
        report: &Report,
    ) -> Result<ExportArtifact, SinkError> {
        let body = match self.format {
            ExportFormat::Markdown => render_markdown(metadata, report),
            ExportFormat::Html => render_html(metadata, report),
            ExportFormat::Json => render_json(metadata, report)?,
        };

        fs::create_dir_all(&self.dir)?;
        let path = self.file_path(report);
        fs::write(&path, body.as_bytes())?;

        Ok(ExportArtifact {
            format: self.format,
            path,
            bytes: body.len(),
        })
    }
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

/// Human-readable report with one section per question.
#[must_use]
pub fn render_markdown(metadata: &ReportMetadata, report: &Report) -> String {
    let mut out = String::from("# Quiz report\n\n");
    out.push_str(&format!("- **Learner:** {}\n", metadata.learner_name()));
    if let Some(email) = metadata.learner_email() {
        out.push_str(&format!("- **Email:** {email}\n"));
    }
    out.push_str(&format!("- **Topic:** {}\n", metadata.topic()));
    out.push_str(&format!("- **Difficulty:** {}\n", metadata.difficulty()));
    out.push_str(&format!(
        "- **Completed:** {}\n",
        report.completed_at().format("%Y-%m-%d %H:%M UTC")
    ));
    out.push_str(&format!(
        "- **Score:** {} / {} ({:.0}%)\n\n",
        report.score(),
        report.total(),
        report.percentage()
    ));

    out.push_str("## Answers\n");
    for (n, item) in report.items().iter().enumerate() {
        let verdict = if item.is_correct { "correct" } else { "incorrect" };
        out.push_str(&format!("\n### Question {}: {}\n\n", n + 1, item.question));
        for option in &item.options {
            out.push_str(&format!("- {}) {}\n", option.label(), option.text()));
        }
        out.push_str(&format!(
            "\nYour answer: **{}) {}** ({verdict})  \n",
            item.chosen, item.chosen_text
        ));
        out.push_str(&format!(
            "Correct answer: **{}) {}**  \n",
            item.correct, item.correct_text
        ));
        out.push_str(&format!("Explanation: {}\n", item.explanation));
    }
    out
}

/// Markdown report rendered to sanitized HTML.
#[must_use]
pub fn render_html(metadata: &ReportMetadata, report: &Report) -> String {
    let markdown = render_markdown(metadata, report);
    let parser = pulldown_cmark::Parser::new_ext(&markdown, pulldown_cmark::Options::empty());
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);

    let tags: HashSet<&str> = [
        "h1", "h2", "h3", "p", "ul", "li", "strong", "em", "code", "br",
    ]
    .into_iter()
    .collect();
    let body = ammonia::Builder::new().tags(tags).clean(&html).to_string();

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Quiz report</title></head>\n\
         <body>\n{body}</body>\n</html>\n"
    )
}

#[derive(Serialize)]
struct JsonExport<'a> {
    metadata: &'a ReportMetadata,
    report: &'a Report,
}

fn render_json(metadata: &ReportMetadata, report: &Report) -> Result<String, SinkError> {
    Ok(serde_json::to_string_pretty(&JsonExport { metadata, report })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{
        AnswerOption, AnswerRecord, Difficulty, Label, Question, ReportItem, SessionId,
    };
    use quiz_core::time::fixed_now;

    fn sample() -> (ReportMetadata, Report) {
        let question = Question::new(
            "Which protocol resolves <b>IP</b> to MAC?",
            [
                AnswerOption::new(Label::A, "DNS"),
                AnswerOption::new(Label::B, "ARP"),
                AnswerOption::new(Label::C, "DHCP"),
                AnswerOption::new(Label::D, "ICMP <script>alert(1)</script>"),
            ],
            Label::B,
            "ARP maps IPv4 addresses to MAC addresses.",
        )
        .unwrap();
        let item = ReportItem::from_answer(&question, &AnswerRecord::new(0, Label::A, Label::B));
        let report = Report::new(SessionId::generate(), fixed_now(), fixed_now(), vec![item]).unwrap();
        let metadata = ReportMetadata::new(
            "Ana",
            Some("ana@example.com".into()),
            "Communication protocols",
            Difficulty::Basic,
            fixed_now(),
        )
        .unwrap();
        (metadata, report)
    }

    #[test]
    fn markdown_lists_answers_and_score() {
        let (metadata, report) = sample();
        let md = render_markdown(&metadata, &report);
        assert!(md.contains("- **Score:** 0 / 1 (0%)"));
        assert!(md.contains("### Question 1: Which protocol resolves"));
        assert!(md.contains("Your answer: **A) DNS** (incorrect)"));
        assert!(md.contains("Correct answer: **B) ARP**"));
        assert!(md.contains("- **Email:** ana@example.com"));
    }

    #[test]
    fn html_is_sanitized() {
        let (metadata, report) = sample();
        let html = render_html(&metadata, &report);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Quiz report</h1>"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn file_exporter_writes_each_format() {
        let (metadata, report) = sample();
        let dir = std::env::temp_dir().join(format!("quiz-export-{}", SessionId::generate()));

        for format in [ExportFormat::Markdown, ExportFormat::Html, ExportFormat::Json] {
            let artifact = FileExporter::new(&dir, format)
                .export(&metadata, &report)
                .unwrap();
            assert_eq!(artifact.format, format);
            assert!(artifact.path.ends_with(format!(
                "quiz-report-{}.{}",
                report.session_id(),
                format.extension()
            )));
            let written = fs::read_to_string(&artifact.path).unwrap();
            assert_eq!(written.len(), artifact.bytes);
        }

        let json = fs::read_to_string(dir.join(format!("quiz-report-{}.json", report.session_id())))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metadata"]["learner_name"], "Ana");
        assert_eq!(value["report"]["score"], 0);

        fs::remove_dir_all(&dir).unwrap();
    }
}

// Report rendering for audit results

use crate::model::{AuditResult, Category, Severity};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str =
    "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";
const THIN_RULE: &str =
    "────────────────────────────────────────────────────────────────────────────────\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "md",
        }
    }
}

pub fn generate_report(result: &AuditResult, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(result)),
        ReportFormat::Json => generate_json_report(result),
        ReportFormat::Markdown => Ok(generate_markdown_report(result)),
    }
}

fn section(report: &mut String, title: &str) {
    report.push_str(RULE);
    report.push_str(title);
    report.push('\n');
    report.push_str(RULE);
    report.push('\n');
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "[ERROR]",
        Severity::Warning => "[WARNING]",
        Severity::Info => "[INFO]",
    }
}

pub fn generate_text_report(result: &AuditResult) -> String {
    let mut report = String::new();

    report.push_str(RULE);
    report.push_str("                            SEOSCAN SITE AUDIT REPORT\n");
    report.push_str(RULE);
    report.push('\n');

    report.push_str(&format!("Target:          {}\n", result.url));
    report.push_str(&format!(
        "Generated:       {}\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    report.push_str(&format!("Pages Analyzed:  {}\n", result.pages_analyzed));
    report.push_str(&format!("Failed Pages:    {}\n", result.failed_pages.len()));
    report.push_str(&format!("Total Issues:    {}\n", result.total_issues));
    if let Some(ref error) = result.error {
        report.push_str(&format!("Note:            {}\n", error));
    }
    report.push('\n');

    section(&mut report, "SUMMARY");
    for category in Category::ALL {
        report.push_str(&format!(
            "  {:<14} {}\n",
            category.label(),
            result.issues_by_category.get(category)
        ));
    }
    report.push('\n');
    for severity in [Severity::Error, Severity::Warning, Severity::Info] {
        let count = result.count_severity(severity);
        if count > 0 {
            report.push_str(&format!("  {:<10} {}\n", severity_label(severity), count));
        }
    }
    report.push('\n');

    if result.results.iter().any(|page| page.issues.total() > 0) {
        section(&mut report, "PAGE DETAILS");

        for page in result.results.iter().filter(|page| page.issues.total() > 0) {
            report.push_str(&format!("{}\n", page.url));
            report.push_str(&format!(
                "Status: {}   Load time: {}ms   Size: {:.1} KB\n\n",
                page.status_code,
                page.load_time_ms,
                page.content_length as f64 / 1024.0
            ));

            for (category, issues) in page.issues.iter() {
                if issues.is_empty() {
                    continue;
                }
                report.push_str(&format!("  {}\n", category.label()));
                for issue in issues {
                    report.push_str(&format!(
                        "    {:<10} {}\n",
                        severity_label(issue.severity),
                        issue.message
                    ));
                    if let Some(ref link) = issue.link {
                        report.push_str(&format!("               link: {}\n", link));
                    }
                    if let Some(ref value) = issue.value {
                        report.push_str(&format!("               {}\n", value));
                    }
                }
            }
            report.push('\n');
            report.push_str(THIN_RULE);
            report.push('\n');
        }
    }

    if !result.failed_pages.is_empty() {
        section(&mut report, "FAILED PAGES");
        for failure in &result.failed_pages {
            report.push_str(&format!("  {}\n    {}\n", failure.url, failure.error));
        }
        report.push('\n');
    }

    report.push_str(RULE);
    report.push_str("                                  End of Report\n");
    report.push_str(RULE);
    report.push_str("\nGenerated by seoscan - bounded on-page SEO auditing\n\n");

    report
}

pub fn generate_json_report(result: &AuditResult) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "seoscan",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": {
                "errors": result.count_severity(Severity::Error),
                "warnings": result.count_severity(Severity::Warning),
                "info": result.count_severity(Severity::Info)
            },
            "audit": result
        }
    });

    serde_json::to_string_pretty(&json_report)
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

pub fn generate_markdown_report(result: &AuditResult) -> String {
    let mut report = String::new();

    report.push_str(&format!("# SEO Audit: {}\n\n", result.url));
    report.push_str(&format!(
        "_Generated {}_\n\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    report.push_str("## Summary\n\n");
    report.push_str("| Metric | Value |\n|---|---|\n");
    report.push_str(&format!("| Pages analyzed | {} |\n", result.pages_analyzed));
    report.push_str(&format!("| Failed pages | {} |\n", result.failed_pages.len()));
    report.push_str(&format!("| Total issues | {} |\n", result.total_issues));
    for category in Category::ALL {
        report.push_str(&format!(
            "| {} | {} |\n",
            category.label(),
            result.issues_by_category.get(category)
        ));
    }
    report.push('\n');

    if let Some(ref error) = result.error {
        report.push_str(&format!("> {}\n\n", error));
    }

    for page in &result.results {
        if page.issues.total() == 0 {
            continue;
        }
        report.push_str(&format!("## {}\n\n", page.url));
        report.push_str("| Category | Severity | Message |\n|---|---|---|\n");
        for (category, issues) in page.issues.iter() {
            for issue in issues {
                report.push_str(&format!(
                    "| {} | {} | {} |\n",
                    category.label(),
                    issue.severity.as_str(),
                    escape_cell(&issue.message)
                ));
            }
        }
        report.push('\n');
    }

    if !result.failed_pages.is_empty() {
        report.push_str("## Failed pages\n\n");
        for failure in &result.failed_pages {
            report.push_str(&format!("- `{}`: {}\n", failure.url, failure.error));
        }
        report.push('\n');
    }

    report
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

// Tests for report generation functionality

use seoscan_core::report::{
    ReportFormat, generate_json_report, generate_markdown_report, generate_report,
    generate_text_report, save_report,
};
use seoscan_core::{AuditResult, Issue, PageFailure, PageIssues, PageResult};
use tempfile::TempDir;

fn sample_result() -> AuditResult {
    let url = "https://example.com/";
    let issues = PageIssues {
        meta_tags: vec![
            Issue::error("Missing page title", url).with_selector("head > title"),
            Issue::info("No canonical URL specified", url),
        ],
        links: vec![
            Issue::error("Broken link (HTTP 404)", url)
                .with_link("https://example.com/old")
                .with_value(r#"<a href="/old">Old | page</a>"#),
        ],
        ..Default::default()
    };

    AuditResult::from_pages(
        url,
        vec![
            PageResult {
                url: url.to_string(),
                issues,
                load_time_ms: 230,
                content_length: 4096,
                status_code: 200,
            },
            PageResult {
                url: "https://example.com/clean".to_string(),
                issues: PageIssues::default(),
                load_time_ms: 80,
                content_length: 1024,
                status_code: 200,
            },
        ],
        vec![PageFailure {
            url: "https://example.com/slow".to_string(),
            error: "Timeout fetching https://example.com/slow".to_string(),
        }],
    )
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("JSON"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("Markdown"), Some(ReportFormat::Markdown));
    assert_eq!(ReportFormat::from_str("md"), Some(ReportFormat::Markdown));
    assert_eq!(ReportFormat::from_str("csv"), None);
}

#[test]
fn test_report_format_extension() {
    assert_eq!(ReportFormat::Json.extension(), "json");
    assert_eq!(ReportFormat::Markdown.extension(), "md");
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_contents() {
    let report = generate_text_report(&sample_result());

    assert!(report.contains("SEOSCAN SITE AUDIT REPORT"));
    assert!(report.contains("Pages Analyzed:  2"));
    assert!(report.contains("Failed Pages:    1"));
    assert!(report.contains("Total Issues:    3"));
    assert!(report.contains("[ERROR]    Missing page title"));
    assert!(report.contains("link: https://example.com/old"));
    assert!(report.contains("Timeout fetching https://example.com/slow"));
    assert!(report.contains("End of Report"));
}

#[test]
fn test_text_report_skips_clean_pages() {
    let report = generate_text_report(&sample_result());
    assert!(!report.contains("https://example.com/clean\n"));
}

#[test]
fn test_text_report_for_empty_audit() {
    let report = generate_text_report(&AuditResult::empty("https://example.com/"));

    assert!(report.contains("No pages found to analyze"));
    assert!(!report.contains("PAGE DETAILS"));
    assert!(!report.contains("FAILED PAGES"));
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_structure() {
    let json = generate_json_report(&sample_result()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    let report = &parsed["report"];
    assert_eq!(report["metadata"]["generator"], "seoscan");
    assert_eq!(report["metadata"]["format"], "json");
    assert!(report["metadata"]["generated_at"].is_string());

    assert_eq!(report["summary"]["errors"], 2);
    assert_eq!(report["summary"]["info"], 1);

    let audit = &report["audit"];
    assert_eq!(audit["pages_analyzed"], 2);
    assert_eq!(audit["total_issues"], 3);
    assert_eq!(audit["issues_by_category"]["meta_tags"], 2);
    assert_eq!(audit["issues_by_category"]["links"], 1);
    assert_eq!(audit["issues_by_category"]["performance"], 0);
    assert_eq!(audit["results"][0]["issues"]["meta_tags"][0]["type"], "error");
    assert_eq!(audit["failed_pages"][0]["url"], "https://example.com/slow");
}

#[test]
fn test_json_report_round_trips_audit() {
    let result = sample_result();
    let json = generate_json_report(&result).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    let audit: AuditResult = serde_json::from_value(parsed["report"]["audit"].clone()).unwrap();
    assert_eq!(audit, result);
}

// ============================================================================
// Markdown Report Tests
// ============================================================================

#[test]
fn test_markdown_report_contents() {
    let report = generate_markdown_report(&sample_result());

    assert!(report.starts_with("# SEO Audit: https://example.com/"));
    assert!(report.contains("| Pages analyzed | 2 |"));
    assert!(report.contains("| Meta Tags | error | Missing page title |"));
    assert!(report.contains("## Failed pages"));
    assert!(report.contains("- `https://example.com/slow`: Timeout fetching"));
}

#[test]
fn test_generate_report_dispatches_on_format() {
    let result = sample_result();

    let text = generate_report(&result, ReportFormat::Text).unwrap();
    assert!(text.contains("SEOSCAN SITE AUDIT REPORT"));

    let json = generate_report(&result, ReportFormat::Json).unwrap();
    assert!(json.trim_start().starts_with('{'));
}

// ============================================================================
// Save Report Tests
// ============================================================================

#[test]
fn test_save_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("audit.md");

    let content = generate_markdown_report(&sample_result());
    save_report(&content, &path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
}

#[test]
fn test_save_report_to_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("audit.txt");

    assert!(save_report("content", &path).is_err());
}

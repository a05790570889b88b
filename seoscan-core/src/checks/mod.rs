// On-page SEO checks, one module per category

pub mod headings;
pub mod images;
pub mod links;
pub mod meta;
pub mod performance;

pub use headings::check_headings;
pub use images::check_images;
pub use links::check_links;
pub use meta::check_meta_tags;
pub use performance::check_performance;

/// Shortens `text` to at most `max_len` characters, ending in "..." when cut.
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Joins up to `shown` examples with " | ", noting how many were left out.
pub(crate) fn summarize_examples(examples: &[String], shown: usize) -> String {
    let mut summary = examples
        .iter()
        .take(shown)
        .cloned()
        .collect::<Vec<_>>()
        .join(" | ");
    if examples.len() > shown {
        summary.push_str(&format!(" (+{} more)", examples.len() - shown));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn test_truncate_counts_the_ellipsis() {
        let cut = truncate(&"a".repeat(80), 70);
        assert_eq!(cut.chars().count(), 70);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        let cut = truncate(&"é".repeat(20), 10);
        assert_eq!(cut, format!("{}...", "é".repeat(7)));
    }

    #[test]
    fn test_summarize_examples() {
        let examples: Vec<String> = (1..=5).map(|i| format!("img{}.png", i)).collect();
        assert_eq!(
            summarize_examples(&examples, 3),
            "img1.png | img2.png | img3.png (+2 more)"
        );
        assert_eq!(summarize_examples(&examples[..2], 3), "img1.png | img2.png");
    }
}

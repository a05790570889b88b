// Audit data model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MetaTags,
    Links,
    Headings,
    Images,
    Performance,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::MetaTags,
        Category::Links,
        Category::Headings,
        Category::Images,
        Category::Performance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::MetaTags => "meta_tags",
            Category::Links => "links",
            Category::Headings => "headings",
            Category::Images => "images",
            Category::Performance => "performance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::MetaTags => "Meta Tags",
            Category::Links => "Links",
            Category::Headings => "Headings",
            Category::Images => "Images",
            Category::Performance => "Performance",
        }
    }
}

/// One finding from one check on one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub message: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

impl Issue {
    pub fn new(severity: Severity, message: impl Into<String>, url: &str) -> Self {
        Self {
            severity,
            message: message.into(),
            url: url.to_string(),
            value: None,
            link: None,
            selector: None,
        }
    }

    pub fn error(message: impl Into<String>, url: &str) -> Self {
        Self::new(Severity::Error, message, url)
    }

    pub fn warning(message: impl Into<String>, url: &str) -> Self {
        Self::new(Severity::Warning, message, url)
    }

    pub fn info(message: impl Into<String>, url: &str) -> Self {
        Self::new(Severity::Info, message, url)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }
}

/// Issues of one page, one list per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageIssues {
    pub meta_tags: Vec<Issue>,
    pub links: Vec<Issue>,
    pub headings: Vec<Issue>,
    pub images: Vec<Issue>,
    pub performance: Vec<Issue>,
}

impl PageIssues {
    pub fn get(&self, category: Category) -> &[Issue] {
        match category {
            Category::MetaTags => &self.meta_tags,
            Category::Links => &self.links,
            Category::Headings => &self.headings,
            Category::Images => &self.images,
            Category::Performance => &self.performance,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Issue])> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn total(&self) -> usize {
        self.iter().map(|(_, issues)| issues.len()).sum()
    }
}

/// A successfully analyzed page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,
    pub issues: PageIssues,
    pub load_time_ms: u64,
    pub content_length: u64,
    pub status_code: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFailure {
    pub url: String,
    pub error: String,
}

/// Outcome of analyzing one URL: either checks ran, or the page failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    Analyzed(PageResult),
    Failed(PageFailure),
}

impl PageOutcome {
    pub fn url(&self) -> &str {
        match self {
            PageOutcome::Analyzed(result) => &result.url,
            PageOutcome::Failed(failure) => &failure.url,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub meta_tags: usize,
    pub links: usize,
    pub headings: usize,
    pub images: usize,
    pub performance: usize,
}

impl CategoryCounts {
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::MetaTags => self.meta_tags,
            Category::Links => self.links,
            Category::Headings => self.headings,
            Category::Images => self.images,
            Category::Performance => self.performance,
        }
    }

    fn add(&mut self, category: Category, count: usize) {
        match category {
            Category::MetaTags => self.meta_tags += count,
            Category::Links => self.links += count,
            Category::Headings => self.headings += count,
            Category::Images => self.images += count,
            Category::Performance => self.performance += count,
        }
    }

    pub fn total(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }

    pub fn tally<'a>(results: impl IntoIterator<Item = &'a PageResult>) -> Self {
        let mut counts = CategoryCounts::default();
        for result in results {
            for (category, issues) in result.issues.iter() {
                counts.add(category, issues.len());
            }
        }
        counts
    }
}

/// Final report of one audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub url: String,
    pub pages_analyzed: usize,
    pub failed_pages: Vec<PageFailure>,
    pub total_issues: usize,
    pub issues_by_category: CategoryCounts,
    pub results: Vec<PageResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditResult {
    /// Zero-valued report for a site where discovery found nothing.
    pub fn empty(url: &str) -> Self {
        Self {
            url: url.to_string(),
            pages_analyzed: 0,
            failed_pages: Vec::new(),
            total_issues: 0,
            issues_by_category: CategoryCounts::default(),
            results: Vec::new(),
            error: Some("No pages found to analyze".to_string()),
        }
    }

    pub fn from_pages(url: &str, results: Vec<PageResult>, failed_pages: Vec<PageFailure>) -> Self {
        let issues_by_category = CategoryCounts::tally(&results);
        Self {
            url: url.to_string(),
            pages_analyzed: results.len(),
            failed_pages,
            total_issues: issues_by_category.total(),
            issues_by_category,
            results,
            error: None,
        }
    }

    pub fn issues(&self) -> impl Iterator<Item = (Category, &Issue)> {
        self.results.iter().flat_map(|result| {
            result
                .issues
                .iter()
                .flat_map(|(category, issues)| issues.iter().map(move |issue| (category, issue)))
        })
    }

    pub fn count_severity(&self, severity: Severity) -> usize {
        self.issues()
            .filter(|(_, issue)| issue.severity == severity)
            .count()
    }
}

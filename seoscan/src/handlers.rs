use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use seoscan_core::report::{ReportFormat, generate_report, save_report};
use seoscan_core::{
    AuditRequest, AuditResult, Auditor, Category, PageOutcome, RetryPolicy, Severity,
};
use seoscan_scanner::{DiscoveryConfig, FetchConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// Everything an audit run needs, parsed and validated from the command line.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub request: AuditRequest,
    pub timeout: Duration,
    pub crawl_delay: Duration,
    pub user_agent: Option<String>,
    pub allow_private: bool,
    pub no_retry: bool,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
}

impl AuditOptions {
    pub fn new(request: AuditRequest) -> Self {
        Self {
            request,
            timeout: Duration::from_secs(10),
            crawl_delay: Duration::from_millis(500),
            user_agent: None,
            allow_private: false,
            no_retry: false,
            format: ReportFormat::Text,
            output: None,
        }
    }

    /// Reads the arguments shared by `audit`, `discover` and `page`.
    /// Arguments a subcommand does not define keep their defaults.
    pub fn from_matches(args: &ArgMatches) -> Result<Self> {
        let url = args
            .get_one::<String>("url")
            .ok_or_else(|| anyhow!("--url is required"))?;

        let mut request = AuditRequest::new(url.as_str());
        if let Ok(Some(max_pages)) = args.try_get_one::<usize>("max-pages") {
            request.max_pages = *max_pages;
        }
        if let Ok(Some(max_concurrency)) = args.try_get_one::<usize>("max-concurrency") {
            request.max_concurrency = *max_concurrency;
        }
        let request = request.validate()?;

        let mut options = AuditOptions::new(request);
        if let Ok(Some(timeout)) = args.try_get_one::<u64>("timeout") {
            options.timeout = Duration::from_secs(*timeout);
        }
        if let Ok(Some(delay)) = args.try_get_one::<u64>("crawl-delay") {
            options.crawl_delay = Duration::from_millis(*delay);
        }
        if let Ok(Some(agent)) = args.try_get_one::<String>("user-agent") {
            options.user_agent = Some(agent.clone());
        }
        options.allow_private = flag(args, "allow-private");
        options.no_retry = flag(args, "no-retry");
        if let Ok(Some(format)) = args.try_get_one::<String>("format") {
            options.format = ReportFormat::from_str(format)
                .ok_or_else(|| anyhow!("Unknown report format: {}", format))?;
        }
        if let Ok(Some(output)) = args.try_get_one::<String>("output") {
            options.output = Some(expand_path(output));
        }

        Ok(options)
    }

    pub fn fetch_config(&self) -> FetchConfig {
        let config = FetchConfig::default()
            .with_timeout(self.timeout)
            .with_allow_private_networks(self.allow_private);
        match self.user_agent {
            Some(ref agent) => config.with_user_agent(agent.as_str()),
            None => config,
        }
    }

    pub fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig::default().with_crawl_delay(self.crawl_delay)
    }

    pub fn build_auditor(&self) -> Result<Auditor> {
        let auditor = Auditor::new(self.fetch_config(), self.discovery_config())
            .context("Failed to build HTTP client")?;

        Ok(if self.no_retry {
            auditor
                .with_audit_retry(RetryPolicy::none())
                .with_page_retry(RetryPolicy::none())
        } else {
            auditor
        })
    }
}

fn flag(args: &ArgMatches, id: &str) -> bool {
    matches!(args.try_get_one::<bool>(id), Ok(Some(true)))
}

/// Expands a leading `~` in a user supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Installs the stderr log subscriber; DEBUG when verbose, WARN otherwise.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message);
    spinner
}

/// Runs a full audit under the coarse audit retry policy.
pub async fn run_audit(options: &AuditOptions) -> Result<AuditResult> {
    let auditor = options.build_auditor()?;
    let result = auditor.submit(options.request.clone()).wait().await?;
    Ok(result)
}

/// Renders the report and writes it to the output path, or returns it
/// for display when no path was given.
pub fn deliver_report(result: &AuditResult, options: &AuditOptions) -> Result<Option<String>> {
    let report = generate_report(result, options.format).context("Failed to render report")?;

    match &options.output {
        Some(path) => {
            save_report(&report, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            Ok(None)
        }
        None => Ok(Some(report)),
    }
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

pub fn print_summary(result: &AuditResult) {
    print_divider();
    println!("{} {}", "Audit of".bold(), result.url.bright_white().bold());
    print_divider();

    println!("  Pages analyzed:  {}", result.pages_analyzed.to_string().green());
    let failed = result.failed_pages.len().to_string();
    println!(
        "  Failed pages:    {}",
        if result.failed_pages.is_empty() {
            failed.green()
        } else {
            failed.red()
        }
    );
    println!("  Total issues:    {}", result.total_issues.to_string().yellow());

    for category in Category::ALL {
        println!(
            "    {:<14} {}",
            category.label(),
            result.issues_by_category.get(category)
        );
    }

    println!(
        "  {} errors, {} warnings, {} info",
        result.count_severity(Severity::Error).to_string().red(),
        result.count_severity(Severity::Warning).to_string().yellow(),
        result.count_severity(Severity::Info).to_string().cyan()
    );

    if let Some(ref error) = result.error {
        println!("  {}", error.yellow());
    }
}

pub async fn handle_audit(args: &ArgMatches) -> Result<()> {
    let options = AuditOptions::from_matches(args)?;

    let progress = spinner(format!(
        "Auditing {} (up to {} pages, {} at a time)",
        options.request.url, options.request.max_pages, options.request.max_concurrency
    ));
    let outcome = run_audit(&options).await;
    progress.finish_and_clear();
    let result = outcome?;

    match deliver_report(&result, &options)? {
        Some(report) => print!("{}", report),
        None => {
            print_summary(&result);
            if let Some(ref path) = options.output {
                println!("\n{} Report saved to {}", "✓".green(), path.display());
            }
        }
    }
    Ok(())
}

pub async fn handle_discover(args: &ArgMatches) -> Result<()> {
    let options = AuditOptions::from_matches(args)?;
    let auditor = options.build_auditor()?;

    let progress = spinner(format!("Discovering pages on {}", options.request.url));
    let pages = auditor
        .discover(&options.request.url, options.request.max_pages)
        .await;
    progress.finish_and_clear();

    if pages.is_empty() {
        println!("{} No pages found on {}", "✗".red(), options.request.url);
        return Ok(());
    }

    println!("{} Found {} page(s)\n", "✓".green(), pages.len());
    for page in &pages {
        println!("  {}", page);
    }
    Ok(())
}

pub async fn handle_page(args: &ArgMatches) -> Result<()> {
    let options = AuditOptions::from_matches(args)?;
    let auditor = options.build_auditor()?;
    let url = &options.request.url;

    let progress = spinner(format!("Analyzing {}", url));
    let outcome = auditor.analyze_one(url).await;
    progress.finish_and_clear();

    if options.format == ReportFormat::Json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        PageOutcome::Analyzed(page) => {
            print_divider();
            println!(
                "{} ({}, {}ms, {:.1} KB)",
                page.url.bright_white().bold(),
                page.status_code,
                page.load_time_ms,
                page.content_length as f64 / 1024.0
            );
            print_divider();

            for (category, issues) in page.issues.iter() {
                println!("{} ({})", category.label().bold(), issues.len());
                for issue in issues {
                    let marker = match issue.severity {
                        Severity::Error => "✗".red(),
                        Severity::Warning => "⚠".yellow(),
                        Severity::Info => "ℹ".cyan(),
                    };
                    println!("  {} {}", marker, issue.message);
                }
            }
            Ok(())
        }
        PageOutcome::Failed(failure) => Err(anyhow!(
            "Failed to analyze {}: {}",
            failure.url,
            failure.error
        )),
    }
}

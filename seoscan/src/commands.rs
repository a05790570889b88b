use clap::{arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

fn url_arg() -> clap::Arg {
    arg!(-u --"url" <URL>)
        .required(true)
        .help("Root URL of the site (https:// is assumed when no scheme is given)")
}

fn timeout_arg() -> clap::Arg {
    arg!(-t --"timeout" <SECONDS>)
        .required(false)
        .help("Per-request timeout in seconds")
        .value_parser(clap::value_parser!(u64).range(1..=120))
        .default_value("10")
}

fn allow_private_arg() -> clap::Arg {
    arg!(--"allow-private")
        .required(false)
        .help("Allow requests to loopback and private network addresses")
        .action(clap::ArgAction::SetTrue)
}

fn user_agent_arg() -> clap::Arg {
    arg!(--"user-agent" <AGENT>)
        .required(false)
        .help("User-Agent header sent with every request")
}

fn max_pages_arg() -> clap::Arg {
    arg!(-m --"max-pages" <NUM>)
        .required(false)
        .help("Maximum number of pages to discover (1-100)")
        .value_parser(clap::value_parser!(usize))
        .default_value("25")
}

fn crawl_delay_arg() -> clap::Arg {
    arg!(--"crawl-delay" <MS>)
        .required(false)
        .help("Delay between link-crawl requests in milliseconds")
        .value_parser(clap::value_parser!(u64))
        .default_value("500")
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("seoscan")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("seoscan")
        .about("Audits the on-page SEO of a bounded set of pages")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-v --"verbose" "Enable debug logging on stderr")
                .required(false)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            command!("audit")
                .about("Discover pages on a site and run every check on each of them")
                .arg(url_arg())
                .arg(max_pages_arg())
                .arg(
                    arg!(-c --"max-concurrency" <NUM>)
                        .required(false)
                        .help("Maximum pages analyzed in parallel (1-50)")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(timeout_arg())
                .arg(crawl_delay_arg())
                .arg(user_agent_arg())
                .arg(allow_private_arg())
                .arg(
                    arg!(--"no-retry")
                        .required(false)
                        .help("Disable retries of failed pages and of the audit itself")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown")
                        .value_parser(["text", "json", "markdown", "md"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)"),
                ),
        )
        .subcommand(
            command!("discover")
                .about("List the pages an audit of the site would analyze")
                .arg(url_arg())
                .arg(max_pages_arg())
                .arg(timeout_arg())
                .arg(crawl_delay_arg())
                .arg(user_agent_arg())
                .arg(allow_private_arg()),
        )
        .subcommand(
            command!("page")
                .about("Run every check on a single page")
                .arg(url_arg())
                .arg(timeout_arg())
                .arg(user_agent_arg())
                .arg(allow_private_arg())
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
}

use colored::Colorize;
use seoscan::commands::command_argument_builder;
use seoscan::handlers::{handle_audit, handle_discover, handle_page, init_logging};

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    init_logging(chosen_command.get_flag("verbose"));

    let outcome = match chosen_command.subcommand() {
        Some(("audit", primary_command)) => handle_audit(primary_command).await,
        Some(("discover", primary_command)) => handle_discover(primary_command).await,
        Some(("page", primary_command)) => handle_page(primary_command).await,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = outcome {
        eprintln!("{} {:#}", "✗".red(), e);
        std::process::exit(1);
    }
}

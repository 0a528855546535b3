use linkvet::commands::command_argument_builder;
use linkvet::handlers::{handle_check, handle_init, handle_probe};
use linkvet_core::print_banner;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    match chosen_command.subcommand() {
        Some(("init", primary_command)) => handle_init(primary_command),
        Some(("check", primary_command)) => handle_check(primary_command).await,
        Some(("probe", primary_command)) => handle_probe(primary_command).await,
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

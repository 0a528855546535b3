use clap::{arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("linkvet")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("linkvet")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Writes a sample .env configuration file")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Directory to write the .env file into")
                        .default_value("."),
                )
                .arg(
                    arg!(-f --"force")
                        .help("Overwrite an existing .env file")
                        .required(false),
                ),
        )
        .subcommand(
            command!("check")
                .about(
                    "Validate every address in a column of a CSV file (or a line-delimited list) \
                and write the resolved results.",
                )
                .arg(
                    arg!(-i --"input" <PATH>)
                        .required(true)
                        .help("CSV file with a header row, or a .txt/.lst file with one address per line"),
                )
                .arg(
                    arg!(-c --"column" <NAME>)
                        .required(false)
                        .help("Header of the column holding the addresses (default: REQUEST_COLUMN)"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("Number of addresses probed at the same time (default: MAX_THREADS)")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-address timeout in seconds (default: REQUEST_TIMEOUT)")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Where to save the results (default: <timestamp>_<input>_results.<ext> next to the input)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format: csv, json, text")
                        .value_parser(["csv", "json", "text"])
                        .default_value("csv"),
                )
                .arg(
                    arg!(--"env-file" <PATH>)
                        .required(false)
                        .help("Load settings from this file instead of ./.env")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"no-progress")
                        .required(false)
                        .help("Do not draw the progress bar")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("probe")
                .about("Probe a single address and print its outcome")
                .arg(arg!(<ADDRESS>).required(true).help("The address to probe"))
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Timeout in seconds")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .default_value("10"),
                ),
        )
}

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::ArgMatches;
use colored::Colorize;
use linkvet_core::Settings;
use linkvet_core::report::{ReportFormat, default_output_path, generate_report, save_report};
use linkvet_core::table::load_addresses;
use linkvet_core::validate::{ValidateOptions, execute_validation};
use linkvet_scanner::{BatchResult, Outcome, Prober, normalize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const ENV_FILE_NAME: &str = ".env";

/// Everything the `check` subcommand was asked to do, detached from clap
#[derive(Debug, Clone)]
pub struct CheckArgs {
    pub input: PathBuf,
    pub column: Option<String>,
    pub threads: Option<usize>,
    pub timeout: Option<u64>,
    pub output: Option<PathBuf>,
    pub format: ReportFormat,
    pub env_file: Option<PathBuf>,
    pub show_progress: bool,
}

impl CheckArgs {
    pub fn from_matches(args: &ArgMatches) -> Result<Self> {
        let input = args
            .get_one::<String>("input")
            .context("--input is required")?;
        let format_name = args
            .get_one::<String>("format")
            .map(String::as_str)
            .unwrap_or("csv");
        let format = ReportFormat::from_str(format_name)
            .with_context(|| format!("Unknown output format '{}'", format_name))?;

        Ok(Self {
            input: expand_path(input),
            column: args.get_one::<String>("column").cloned(),
            threads: args.get_one::<u64>("threads").map(|t| *t as usize),
            timeout: args.get_one::<u64>("timeout").copied(),
            output: args.get_one::<PathBuf>("output").cloned(),
            format,
            env_file: args.get_one::<PathBuf>("env-file").cloned(),
            show_progress: !args.get_flag("no-progress"),
        })
    }
}

/// Result of a finished `check` run
#[derive(Debug)]
pub struct CheckRun {
    pub results: BatchResult,
    pub output_path: PathBuf,
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Command-line values win over whatever the env file said
pub fn apply_overrides(settings: Settings, args: &CheckArgs) -> Settings {
    let mut settings = settings;
    if let Some(ref column) = args.column {
        settings = settings.with_request_column(column.clone());
    }
    if let Some(threads) = args.threads {
        settings = settings.with_max_threads(threads);
    }
    if let Some(timeout) = args.timeout {
        settings = settings.with_request_timeout(timeout);
    }
    settings
}

/// Load the addresses, validate them all and save the report.
///
/// Missing input files and columns fail here, before anything is probed.
pub async fn run_check(args: &CheckArgs, settings: &Settings) -> Result<CheckRun> {
    let addresses = load_addresses(&args.input, &settings.request_column)?;
    if addresses.is_empty() {
        bail!(
            "No addresses found in column '{}' of {}",
            settings.request_column,
            args.input.display()
        );
    }

    debug!(
        count = addresses.len(),
        column = %settings.request_column,
        "Loaded addresses"
    );

    let options = ValidateOptions {
        addresses,
        concurrency: settings.max_threads,
        timeout: settings.timeout(),
        show_progress_bar: args.show_progress,
    };
    let results = execute_validation(options, None).await?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input, args.format, Local::now()));
    let content = generate_report(&results, args.format).context("Failed to render report")?;
    save_report(&content, &output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    info!(path = %output_path.display(), "Report saved");

    Ok(CheckRun {
        results,
        output_path,
    })
}

/// Write a sample settings file into `dir`. Refuses to clobber unless `force`.
pub fn write_env_file(dir: &Path, settings: &Settings, force: bool) -> Result<PathBuf> {
    let path = dir.join(ENV_FILE_NAME);
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    fs::write(&path, settings.to_env_file())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

pub async fn probe_address(address: &str, timeout: Duration) -> Result<Outcome> {
    let prober = Prober::with_timeout(timeout)?;
    Ok(prober.probe(address).await)
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn exit_with(err: anyhow::Error) -> ! {
    eprintln!("{} {:#}", "✗".red().bold(), err);
    std::process::exit(1);
}

pub fn handle_init(args: &ArgMatches) {
    let dir = args
        .get_one::<String>("PATH")
        .map(|p| expand_path(p))
        .unwrap_or_else(|| PathBuf::from("."));
    let force = args.get_flag("force");

    match write_env_file(&dir, &Settings::default(), force) {
        Ok(path) => {
            println!(
                "{} Configuration written: {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
            println!(
                "{} Edit REQUEST_COLUMN, REQUEST_TIMEOUT and MAX_THREADS to taste",
                "ℹ".blue()
            );
        }
        Err(e) => exit_with(e),
    }
}

pub async fn handle_check(sub_matches: &ArgMatches) {
    let args = CheckArgs::from_matches(sub_matches).unwrap_or_else(|e| exit_with(e));
    let settings = Settings::load(args.env_file.as_deref())
        .map(|s| apply_overrides(s, &args))
        .unwrap_or_else(|e| exit_with(e.into()));

    println!(
        "\n{} Validating {}",
        "→".blue(),
        args.input.display().to_string().bright_white()
    );
    println!("Column:  {}", settings.request_column);
    println!("Workers: {}", settings.max_threads);
    println!("Timeout: {}s\n", settings.request_timeout);

    let run = run_check(&args, &settings)
        .await
        .unwrap_or_else(|e| exit_with(e));
    let summary = run.results.summary();

    println!();
    print_divider();
    println!("{}", "  VALIDATION COMPLETE".green().bold());
    print_divider();
    println!("Addresses checked: {}", summary.total.to_string().cyan());
    println!("Responded:         {}", summary.succeeded.to_string().green());
    if summary.failed() > 0 {
        println!("Failed:            {}", summary.failed().to_string().red());
    }
    println!(
        "{} Results saved: {}",
        "✓".green().bold(),
        run.output_path.display().to_string().bright_white()
    );
}

pub async fn handle_probe(sub_matches: &ArgMatches) {
    let address = sub_matches
        .get_one::<String>("ADDRESS")
        .cloned()
        .unwrap_or_default();
    let timeout = sub_matches.get_one::<u64>("timeout").copied().unwrap_or(10);

    println!("{} {}", "→".blue(), normalize(&address).bright_white());

    let outcome = probe_address(&address, Duration::from_secs(timeout))
        .await
        .unwrap_or_else(|e| exit_with(e));

    let status = match outcome.status.status_code() {
        Some(code @ 200..=299) => code.to_string().green(),
        Some(code @ 300..=399) => code.to_string().cyan(),
        Some(code @ 400..=499) => code.to_string().yellow(),
        Some(code) => code.to_string().red(),
        None => outcome.status.label().red(),
    };

    println!("Status:   {}", status);
    if !outcome.resolved.is_empty() {
        println!("Resolved: {}", outcome.resolved);
    }
    if !outcome.error.is_empty() {
        println!("Error:    {}", outcome.error);
    }
    println!("Time:     {} ms", outcome.response_time.as_millis());
}

use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

mod check;
mod cli;
mod util;

use cheatsheet::{
    CheatSheetError, CheckerConfiguration, CompositeParser, Result, load_config,
    output::OutputMode,
};
use check::{CheckRunner, print_json_report, print_text_report};
use cli::Cli;
use util::expand_inputs;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    match run_check(args).await {
        Ok(true) => Ok(()),
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns whether every document was free of errors.
async fn run_check(args: Cli) -> Result<bool> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => CheckerConfiguration::default(),
    };

    let paths = expand_inputs(&args.paths)?;
    if paths.is_empty() {
        return Err(CheatSheetError::Document(
            "no input files matched".to_string(),
        ));
    }

    let workers = args.workers.or(config.workers);
    let output_mode = args.output.or(config.output).unwrap_or_default();

    let runner = CheckRunner::new(
        CompositeParser::with_config(config.parser),
        workers,
        args.verbose && output_mode == OutputMode::Text,
    );
    let reports = runner.check_files(paths).await;

    match output_mode {
        OutputMode::Text => print_text_report(&reports, args.verbose, args.tree),
        OutputMode::Json => print_json_report(&reports)?,
    }

    Ok(reports.iter().all(|report| !report.has_errors()))
}

use std::path::PathBuf;

use clap::Parser;

use cheatsheet::output::OutputMode;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file to use
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Override number of files checked in parallel
    #[arg(short = 'j', long = "workers")]
    pub workers: Option<usize>,

    /// How to report the results
    #[arg(long = "output", value_enum)]
    pub output: Option<OutputMode>,

    /// Print the task tree of every valid document
    #[arg(long = "tree")]
    pub tree: bool,

    /// Documents to check, glob patterns are expanded
    #[arg(required = true)]
    pub paths: Vec<String>,
}

//! Command-line interface of the `dmetcas` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::io::format::dmetcas_output;

const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// Logs a nicely formatted `dmetcas` heading to the `dmetcas-output` logger.
pub fn log_heading() {
    let version = if let Some(ver) = VERSION {
        format!("v{ver}")
    } else {
        "v unknown".to_string()
    };
    dmetcas_output!("╭──────────────────────────────────────────────────────────────────────╮");
    dmetcas_output!("│ dmetcas — DMET-based active-space construction            {version:>10} │");
    dmetcas_output!("╰──────────────────────────────────────────────────────────────────────╯");
    dmetcas_output!("");
}

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// The YAML configuration file specifying the mean-field source and the
    /// active-space construction parameters.
    #[arg(short, long)]
    pub config: PathBuf,

    /// The output file; if not given, the output is written to the console.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enables debug logging.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,
}

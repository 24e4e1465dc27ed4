use std::process;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

use dmetcas::interfaces::cli::{log_heading, Cli};
use dmetcas::interfaces::input::Input;
use dmetcas::io::read_dmetcas_yaml;

/// Configures the loggers: the `dmetcas-output` logger carries the main
/// program output, either to the console or to the specified output file;
/// everything else goes to stderr.
fn configure_logging(cli: &Cli) -> Result<(), anyhow::Error> {
    let level = match cli.debug {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{l}] {m}{n}")))
        .build();

    let config_builder =
        Config::builder().appender(Appender::builder().build("stderr", Box::new(stderr)));
    let config = if let Some(output) = cli.output.as_ref() {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{m}{n}")))
            .append(false)
            .build(output)
            .with_context(|| format!("Unable to open the output file {}", output.display()))?;
        config_builder
            .appender(Appender::builder().build("output", Box::new(file)))
            .logger(
                Logger::builder()
                    .appender("output")
                    .additive(false)
                    .build("dmetcas-output", LevelFilter::Info),
            )
            .build(Root::builder().appender("stderr").build(level))?
    } else {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{m}{n}")))
            .build();
        config_builder
            .appender(Appender::builder().build("stdout", Box::new(stdout)))
            .logger(
                Logger::builder()
                    .appender("stdout")
                    .additive(false)
                    .build("dmetcas-output", LevelFilter::Info),
            )
            .build(Root::builder().appender("stderr").build(level))?
    };
    log4rs::init_config(config)?;
    Ok(())
}

fn run(cli: &Cli) -> Result<(), anyhow::Error> {
    configure_logging(cli)?;
    log_heading();

    let input: Input = read_dmetcas_yaml(&cli.config)
        .with_context(|| format!("Unable to read the input file {}", cli.config.display()))?;
    input.handle()?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

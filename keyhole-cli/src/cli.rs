//! Keyhole CLI.

use clap::{crate_version, Clap};
use color_eyre::Report;

use crate::commands::{DumpCmd, InfoCmd, SampleCmd};

/// Inspect kernel state images the way the in-kernel dump service does.
#[derive(Clap, Debug)]
#[clap(version=crate_version!())]
pub(crate) struct Cli {
    /// Set the level of verbosity
    #[clap(long, short, parse(from_occurrences))]
    pub verbose: usize,

    #[clap(subcommand)]
    subcmd: SubCommand,
}

#[derive(Clap, Debug)]
enum SubCommand {
    Sample(SampleCmd),
    Info(InfoCmd),
    Dump(DumpCmd),
}

pub(crate) fn run() -> Result<(), Report> {
    let args = Cli::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if args.verbose > 0 {
        simple_logger::SimpleLogger::new().with_level(level).init()?;
    }

    match &args.subcmd {
        SubCommand::Sample(cmd) => cmd.run(),
        SubCommand::Info(cmd) => cmd.run(),
        SubCommand::Dump(cmd) => cmd.run(),
    }
}

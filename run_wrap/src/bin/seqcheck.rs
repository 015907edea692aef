//! seqcheck
#![deny(missing_docs)]

use anyhow::Result;
use clap::Parser;
use run_wrap::{commands, utils};
use std::path::PathBuf;
use std::process::ExitCode;

/// Check a sequencing run's sample configuration before it goes to the instrument.
#[derive(Parser, Debug)]
#[clap(name = "seqcheck")]
struct SeqCheck {
    #[clap(subcommand)]
    subcmd: SubCommand,

    /// Log at debug level.
    #[clap(long, global = true)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum SubCommand {
    /// Validate a run and print the findings as JSON. Exits 1 if there are errors.
    #[clap(name = "validate")]
    Validate(Validate),

    /// Check instrument definitions for mistakes. Exits 1 if there are errors.
    #[clap(name = "check-instruments")]
    CheckInstruments(CheckInstruments),

    /// Check test and application profile definitions. Exits 1 if there are errors.
    #[clap(name = "check-profiles")]
    CheckProfiles(CheckProfiles),
}

#[derive(Parser, Debug)]
struct Validate {
    /// Run JSON file.
    #[clap(long = "run", value_name = "JSON")]
    run: PathBuf,

    /// Instrument definitions TOML. Defaults to the built-in instruments.
    #[clap(long, value_name = "TOML")]
    instruments: Option<PathBuf>,

    /// Profile catalog JSON with test and application profiles.
    #[clap(long, value_name = "JSON")]
    profiles: Option<PathBuf>,

    /// Print a flat summary report instead of the full result.
    #[clap(long)]
    report: bool,
}

#[derive(Parser, Debug)]
struct CheckInstruments {
    /// Instrument definitions TOML. Defaults to the built-in instruments.
    #[clap(long, value_name = "TOML")]
    instruments: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct CheckProfiles {
    /// Profile catalog JSON with test and application profiles.
    #[clap(long, value_name = "JSON")]
    profiles: PathBuf,
}

fn inner_main() -> Result<ExitCode> {
    let opts = SeqCheck::parse();
    utils::init_logging(opts.verbose);

    match opts.subcmd {
        SubCommand::Validate(args) => commands::validate(
            &args.run,
            args.instruments.as_deref(),
            args.profiles.as_deref(),
            args.report,
        ),
        SubCommand::CheckInstruments(args) => {
            commands::check_instruments(args.instruments.as_deref())
        }
        SubCommand::CheckProfiles(args) => commands::check_profiles(&args.profiles),
    }
}

fn main() -> ExitCode {
    match inner_main() {
        Ok(exit_code) => exit_code,
        Err(err) => {
            utils::print_error_chain(&err);
            ExitCode::FAILURE
        }
    }
}

//! um32: UM-32 universal machine emulator

use std::env;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use um32_emu::config::Config;
use um32_emu::interpreter::{Fault, RunOptions, RunOutcome, Runner};

const USAGE: &str = "Usage: um32 [--trace] [--stats] [--max-instructions N] <program>";

/// Exit status for usage and host errors.
const EXIT_ERROR: u8 = 1;
/// Exit status for machine faults.
const EXIT_FAULT: u8 = 2;
/// Exit status when the instruction budget runs out.
const EXIT_BUDGET: u8 = 3;

/// Parsed command line.
#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    trace: bool,
    stats: bool,
    max_instructions: Option<u64>,
    sample_config: bool,
    help: bool,
    program: Option<String>,
}

impl CliArgs {
    fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut cli = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--trace" => cli.trace = true,
                "--stats" => cli.stats = true,
                "--sample-config" => cli.sample_config = true,
                "-h" | "--help" => cli.help = true,
                "--max-instructions" => {
                    let value = args.next().context("--max-instructions needs a value")?;
                    cli.max_instructions = Some(parse_limit(&value)?);
                }
                _ if arg.starts_with("--max-instructions=") => {
                    let value = &arg["--max-instructions=".len()..];
                    cli.max_instructions = Some(parse_limit(value)?);
                }
                _ if arg.starts_with('-') => bail!("unknown option '{}'", arg),
                _ => {
                    if cli.program.is_some() {
                        bail!("expected exactly one program file");
                    }
                    cli.program = Some(arg);
                }
            }
        }

        Ok(cli)
    }

    /// Layer command-line flags over the configured options.
    fn options(&self, config: &Config) -> RunOptions {
        let mut options = RunOptions::from_config(config);
        if self.trace {
            options.trace = true;
        }
        if self.max_instructions.is_some() {
            options.max_instructions = self.max_instructions;
        }
        options
    }
}

fn parse_limit(value: &str) -> Result<u64> {
    value
        .parse()
        .with_context(|| format!("invalid instruction limit '{}'", value))
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    match run(env::args().skip(1)) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run<I>(args: I) -> Result<u8>
where
    I: IntoIterator<Item = String>,
{
    let cli = match CliArgs::parse(args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("um32: {:#}", e);
            eprintln!("{}", USAGE);
            return Ok(EXIT_ERROR);
        }
    };

    if cli.help {
        eprintln!("{}", USAGE);
        return Ok(0);
    }
    if cli.sample_config {
        print!("{}", Config::sample_config());
        return Ok(0);
    }

    let path = match cli.program.as_deref() {
        Some(path) => path,
        None => {
            eprintln!("{}", USAGE);
            return Ok(EXIT_ERROR);
        }
    };

    let mut runner = match Runner::from_file(path, cli.options(Config::get())) {
        Ok(runner) => runner,
        Err(e) => match e.downcast_ref::<Fault>() {
            // A readable file with a malformed image is a machine fault
            Some(fault) => {
                eprintln!("fault {}: {:#}", fault.kind(), e);
                return Ok(EXIT_FAULT);
            }
            None => return Err(e),
        },
    };
    let result = runner.run();

    if cli.stats {
        eprintln!("{}", runner.stats());
    }

    match result {
        Ok(RunOutcome::Halted) => Ok(0),
        Ok(RunOutcome::BudgetExhausted) => {
            eprintln!(
                "Instruction budget exhausted after {} instructions",
                runner.machine().instructions()
            );
            Ok(EXIT_BUDGET)
        }
        Err(err) => {
            eprintln!("{}", err.report());
            match err.fault {
                Fault::Console { .. } => Ok(EXIT_ERROR),
                _ => Ok(EXIT_FAULT),
            }
        }
    }
}

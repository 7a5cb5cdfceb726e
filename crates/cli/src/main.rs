mod cmd;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use extmgr_lib::BuildError;

use cmd::{BuildArgs, ConfigArgs, cmd_build, cmd_list, cmd_status};
use output::{print_error, print_warning};

/// Exit code reported when the operator interrupted the build.
const EXIT_INTERRUPTED: u8 = 130;

/// extmgr - build external software distributions from source
#[derive(Parser)]
#[command(name = "extmgr")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build a distribution, resuming from completed steps
  Build(BuildArgs),

  /// Show the next step each package of a distribution would run
  Status(ConfigArgs),

  /// List the available distributions
  List {
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      if is_interrupted(&err) {
        print_warning("Interrupted by user");
        ExitCode::from(EXIT_INTERRUPTED)
      } else {
        print_error(&format!("{:#}", err));
        ExitCode::FAILURE
      }
    }
  }
}

fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::Build(args) => cmd_build(&args),
    Commands::Status(args) => cmd_status(&args),
    Commands::List { json } => cmd_list(json),
  }
}

fn is_interrupted(err: &anyhow::Error) -> bool {
  err.downcast_ref::<BuildError>().is_some_and(BuildError::is_interrupted)
}

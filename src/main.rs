use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Increase log verbosity (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// The path to the configuration file
    #[arg(short, long, global = true, default_value = "navcase.yaml")]
    config_file: PathBuf,

    /// The command to execute
    #[command(subcommand)]
    command: NavcaseCommand,
}

#[derive(Parser)]
struct InitArgs {
    /// The path to initialize the project in
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Whether to create the directory if it doesn't exist
    #[arg(long, default_value = "false")]
    create: bool,

    /// Overwrite an existing config file
    #[arg(short, long, default_value = "false")]
    force: bool,
}

#[derive(Parser)]
struct NormalizeArgs {
    /// Labels to normalize; reads lines from stdin when omitted
    text: Vec<String>,
}

#[derive(Parser)]
struct ExportArgs {
    /// Export the lookup table including dash variants
    #[arg(short, long, default_value = "false")]
    expanded: bool,
}

#[derive(Parser)]
struct FixArgs {
    /// A page or directory to fix instead of the configured site output
    path: Option<PathBuf>,

    /// Report what would change without writing
    #[arg(short = 'n', long, default_value = "false")]
    dry_run: bool,
}

#[derive(Parser)]
struct WatchArgs {
    /// A directory to watch instead of the configured site output
    path: Option<PathBuf>,
}

#[derive(Parser)]
struct ServeArgs {
    /// The address to bind to
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// The port to bind to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Open the site in the default browser
    #[arg(short, long, default_value = "false")]
    open: bool,
}

#[derive(Subcommand)]
enum NavcaseCommand {
    /// Write a default navcase.yaml
    Init(InitArgs),

    /// Print the normalized form of navigation labels
    Normalize(NormalizeArgs),

    /// Validate the term dictionary
    Check,

    /// Print the term dictionary as JSON
    Export(ExportArgs),

    /// Fix navigation labels in the built site once
    Fix(FixArgs),

    /// Keep navigation labels fixed while the site changes
    Watch(WatchArgs),

    /// Serve the built site, re-applying the fix as pages are visited
    Serve(ServeArgs),
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "navcase=info",
        1 => "navcase=debug",
        _ => "navcase=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config_file = args.config_file.as_path();

    match args.command {
        NavcaseCommand::Init(args) => {
            commands::init::run(&args).await?;
        }
        NavcaseCommand::Normalize(args) => {
            commands::normalize::run(&args, config_file).await?;
        }
        NavcaseCommand::Check => {
            commands::check::run(config_file).await?;
        }
        NavcaseCommand::Export(args) => {
            commands::export::run(&args, config_file).await?;
        }
        NavcaseCommand::Fix(args) => {
            commands::fix::run(&args, config_file).await?;
        }
        NavcaseCommand::Watch(args) => {
            commands::watch::run(&args, config_file).await?;
        }
        NavcaseCommand::Serve(args) => {
            commands::serve::run(&args, config_file).await?;
        }
    }

    Ok(())
}

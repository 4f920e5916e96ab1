use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod auth;
mod check;
mod common;
mod lookup;

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(name = "dirbridge")]
struct Cli {
    #[command(flatten)]
    common: common::CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print the effective settings
    CheckConfig(check::CheckConfigArgs),
    /// Resolve a user by login name
    LookupName(lookup::LookupNameArgs),
    /// Resolve a user by numeric id
    LookupId(lookup::LookupIdArgs),
    /// Verify a password read from stdin
    Auth(auth::AuthArgs),
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::CheckConfig(args) => args.run(&cli.common),
        Commands::LookupName(args) => args.run(&cli.common),
        Commands::LookupId(args) => args.run(&cli.common),
        Commands::Auth(args) => args.run(&cli.common),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use fsvault::cli::{Cli, Commands};
use fsvault::{FsvaultContext, commands};
use std::io;
use std::process;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        commands::print_error(&format!("{e:#}"));
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Status { short, ignored } => {
            let ctx = FsvaultContext::new()?;
            commands::status::execute(&ctx, short, ignored)
        }
        Commands::Ignore { action } => {
            let ctx = FsvaultContext::new()?;
            commands::ignore::execute(&ctx, &action, cli.verbose)
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "fsv", &mut io::stdout());
            Ok(())
        }
    }
}

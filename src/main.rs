//! archisync CLI entry point.

use archisync::cli::commands;
use archisync::cli::{Cli, Commands};
use archisync::config::StoreConfig;
use archisync::error::Error;
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let json = cli.json;
    match &cli.command {
        Commands::Version => return commands::version::execute(json),
        Commands::Completions { shell } => return commands::completions::execute(shell),
        _ => {}
    }

    let config = StoreConfig::resolve(
        cli.db.as_deref(),
        cli.dialect.as_deref(),
        cli.schema.as_deref(),
    )?;
    match &cli.command {
        Commands::Init { force } => commands::init::execute(&config, *force, json),
        Commands::Models { name } => commands::models::execute(&config, name.as_deref(), json),
        Commands::Import(args) => commands::import::execute(&config, args, json),
        Commands::Show { kind, id, version } => {
            commands::show::execute(&config, kind, id, *version, json)
        }
        Commands::Images { command } => commands::images::execute(&config, command, json),
        Commands::Status(args) => commands::status::execute(&config, args, json),
        Commands::Version | Commands::Completions { .. } => Ok(()),
    }
}

mod args;
mod commands;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let filter = match cli.verbose {
        0 => "chanfetch=info,chanfetch_core=info",
        1 => "chanfetch=debug,chanfetch_core=debug,chanfetch_client=debug",
        2 => "chanfetch=trace,chanfetch_core=trace,chanfetch_client=trace",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Some(Commands::List) => commands::steps::list(config_path).await,
        Some(Commands::Classify) => commands::steps::classify(config_path).await,
        Some(Commands::Download) => commands::steps::download(config_path).await,
        Some(Commands::Verify) => commands::steps::verify(config_path).await,
        Some(Commands::Report) => commands::steps::report(config_path).await,
        Some(Commands::Run { url, options }) => {
            commands::run::run(url.as_deref(), &options, config_path).await
        }
        Some(Commands::Fetch { url, options }) => {
            commands::fetch::run(&url, &options, config_path).await
        }
        Some(Commands::Doctor) => commands::doctor::run(config_path).await,
        Some(Commands::Config) => commands::config::run(config_path).await,
        None => {
            // No subcommand, print help
            use clap::CommandFactory;
            match Cli::command().print_help() {
                Ok(()) => {
                    println!();
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => Err(e.into()),
            }
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

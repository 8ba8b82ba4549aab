//! azprompt binary
//!
//! Resolves configuration, sends one chat completion request, and prints the
//! response. Any failure is reported on stderr with a non-zero exit code.

use azprompt::cli::{Cli, Command, generate_config_template};
use azprompt::config::{Config, FileConfig};
use azprompt::error::AppResult;
use azprompt::{runner, telemetry};
use clap::Parser;
use std::error::Error as _;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(
                category = err.category().as_str(),
                exit_code = err.exit_code(),
                "Run failed"
            );
            eprintln!("Error: {}", err);
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    if let Some(Command::Config { output }) = cli.command {
        let template = generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(&path, template)?;
                eprintln!("Wrote configuration template to {}", path.display());
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    let file = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    telemetry::init(file.log_level(cli.log_level.as_deref()));

    let mut config = Config::from_env(file, cli.profile)?;
    if let Some(format) = cli.format {
        config.output = format;
    }

    tracing::info!(
        profile = %config.endpoint.profile(),
        deployment = %config.endpoint.deployment(),
        "Starting azprompt"
    );

    let mut stdout = std::io::stdout();
    runner::run(&config, &mut stdout).await?;
    Ok(())
}

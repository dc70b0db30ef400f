use std::process::ExitCode;

use args::Args;
use clap::Parser;

mod args;
mod commands;
mod logger;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    logger::init(&args);

    let config = match args.config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match commands::run(args.command, config).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

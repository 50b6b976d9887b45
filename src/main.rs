//! Main entry point for the translate CLI

#![forbid(unsafe_code)]

use dotenvy::dotenv;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yandex_translate::cli::commands;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenv().ok();

    // Logs go to stderr so stdout carries only the translation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yandex_translate=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let outcome = match commands::parse_args(std::env::args_os()) {
        Ok(cli) => commands::execute(&cli).await,
        Err(outcome) => outcome,
    };

    print!("{}", outcome.stdout);
    eprint!("{}", outcome.stderr);
    ExitCode::from(outcome.exit_code)
}

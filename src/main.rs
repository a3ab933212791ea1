use clap::Parser;
use tokio::signal;
use tracing::info;

use powerpos::app::{Config, Orchestrator};
use powerpos::cli::{check, dlq, Cli, Commands};
use powerpos::core::service::shutdown_channel;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Run => {
            let mut logging = config.logging.clone();
            if let Some(level) = cli.log_level.clone() {
                logging.level = level;
            }
            logging.init();

            info!("powerpos starting");

            let (trigger, shutdown) = shutdown_channel();
            tokio::spawn(async move {
                if signal::ctrl_c().await.is_ok() {
                    info!("Shutdown signal received");
                }
                trigger.trigger();
            });

            if let Err(e) = Orchestrator::run_with_shutdown(config, shutdown).await {
                tracing::error!(error = %e, "Fatal error");
                std::process::exit(1);
            }

            info!("powerpos stopped");
        }
        Commands::Check => {
            if let Err(e) = check::run(&config) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Commands::Dlq(command) => {
            if let Err(e) = dlq::run(&config, &command) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}

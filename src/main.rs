use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use restock_watcher::scheduler::WatchScheduler;
use restock_watcher::{AppConfig, Handler, InvocationResponse};

#[derive(Parser)]
#[command(name = "restock-watcher")]
#[command(about = "Checks a product page and emails you when it can be bought", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one check and print the invocation response (default)
    Check {
        /// Trigger event as JSON; logged, otherwise unused
        #[arg(long, default_value = "{}")]
        event: String,
    },
    /// Run the check on a cron schedule until a notification is sent
    Watch {
        /// Cron expression with seconds, e.g. "0 */15 * * * *" (default: WATCH_SCHEDULE)
        #[arg(long)]
        schedule: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("restock_watcher=debug".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Check { event: "{}".to_string() }) {
        Commands::Check { event } => check(&event).await,
        Commands::Watch { schedule } => watch(schedule).await,
    }
}

async fn check(event: &str) -> Result<ExitCode> {
    let event: Value = serde_json::from_str(event)?;

    let response = match AppConfig::from_env() {
        Ok(config) => match Handler::from_config(&config) {
            Ok(handler) => handler.handle_invocation(&event, &config).await,
            Err(e) => InvocationResponse::failure(&e),
        },
        Err(e) => {
            tracing::error!("Error loading configuration: {}", e);
            InvocationResponse::failure(&e)
        }
    };

    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn watch(schedule: Option<String>) -> Result<ExitCode> {
    let config = AppConfig::from_env()?;
    let schedule = schedule
        .or_else(|| config.watch.schedule.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("No schedule given; pass --schedule or set WATCH_SCHEDULE")
        })?;

    info!("Starting Restock Watcher...");

    let handler = Arc::new(Handler::from_config(&config)?);
    let scheduler = WatchScheduler::new(handler, Arc::new(config)).await?;

    match scheduler.watch(&schedule).await? {
        Some(report) => {
            info!(
                "Notification sent for {}, stopping",
                report.product_info.title()
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        None => info!("Shutting down..."),
    }

    Ok(ExitCode::SUCCESS)
}

//! Local test harness: run a check without emailing, send a test email, or
//! dump a page's structure when the store changes its markup.

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing::{error, info};

use restock_watcher::core::analyzer::analyze_structure;
use restock_watcher::core::classifier::ProductPageClassifier;
use restock_watcher::core::fetcher::{fetch_page, HttpFetcher, RetryPolicy};
use restock_watcher::models::{CheckRecord, ProductSnapshot};
use restock_watcher::plugins::notifiers::{DryRunNotifier, EmailNotifier};
use restock_watcher::plugins::NotifierPlugin;
use restock_watcher::AppConfig;

const DEFAULT_URL: &str = "https://www.sweetwater.com/store/detail/TAG3CSDB--yamaha-tag3-c-transacoustic-dreadnought-acoustic-electric-guitar-sand-burst";
const EXAMPLE_SENDER: &str = "sender@example.com";
const EXAMPLE_RECIPIENT: &str = "recipient@example.com";
const RESULTS_FILE: &str = "test_results.json";
const STRUCTURE_FILE: &str = "page_structure.html";

#[derive(Parser)]
#[command(name = "probe")]
#[command(about = "Product availability scraper - local test tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and classify a page without notifying; saves test_results.json
    Check {
        /// Product URL (default: PRODUCT_URL, then the sample guitar page)
        #[arg(long)]
        url: Option<String>,
    },
    /// Send a test notification for a mock product
    Email {
        /// Sender address; the example address only logs what would be sent
        #[arg(long, default_value = EXAMPLE_SENDER)]
        sender: String,
        /// Recipient address
        #[arg(long, default_value = EXAMPLE_RECIPIENT)]
        recipient: String,
    },
    /// Report common page elements; saves page_structure.html
    Analyze {
        /// Page URL (default: PRODUCT_URL, then the sample guitar page)
        #[arg(long)]
        url: Option<String>,
    },
    /// Interactive menu (default)
    Menu,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("restock_watcher=debug".parse()?)
                .add_directive("probe=info".parse()?),
        )
        .init();

    let config = AppConfig::from_env()?;
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Check { url } => check(&config, &target_url(&config, url)).await,
        Commands::Email { sender, recipient } => email(&config, &sender, &recipient).await,
        Commands::Analyze { url } => analyze(&config, &target_url(&config, url)).await,
        Commands::Menu => menu(&config).await,
    }

    Ok(())
}

fn target_url(config: &AppConfig, url: Option<String>) -> String {
    url.filter(|u| !u.trim().is_empty())
        .or_else(|| config.product.url.clone())
        .unwrap_or_else(|| DEFAULT_URL.to_string())
}

fn rule_line() -> String {
    "=".repeat(50)
}

async fn check(config: &AppConfig, url: &str) {
    info!("Testing scraping for URL: {}", url);

    if let Err(e) = try_check(config, url).await {
        error!("Error during scraping: {}", e);
    }
}

async fn try_check(config: &AppConfig, url: &str) -> Result<()> {
    let fetcher = HttpFetcher::new(&config.scraper)?;
    let classifier = ProductPageClassifier::new()?;

    let page = fetch_page(&fetcher, url, &RetryPolicy::from(&config.scraper)).await?;
    let classification = classifier.classify(&page.body);
    let decided_by = classification
        .decided_by
        .map(|rule| rule.to_string())
        .unwrap_or_else(|| "none (default)".to_string());
    let snapshot = classification.into_snapshot(url);

    println!("\n{}", rule_line());
    println!("SCRAPING RESULTS");
    println!("{}", rule_line());
    println!("Timestamp: {}", Utc::now().to_rfc3339());
    println!("URL: {}", url);
    if page.final_url != url {
        println!("Final URL: {}", page.final_url);
    }
    println!("Available: {}", if snapshot.available() { "YES" } else { "NO" });
    println!("Decided by: {}", decided_by);
    println!("Product Title: {}", snapshot.title());
    println!("Price: {}", snapshot.price());
    println!("{}\n", rule_line());

    CheckRecord::now(snapshot).save(RESULTS_FILE).await?;
    info!("Results saved to {}", RESULTS_FILE);
    Ok(())
}

async fn email(config: &AppConfig, sender: &str, recipient: &str) {
    let product = ProductSnapshot::new(
        "Test Product - Yamaha Guitar",
        "$999.99",
        "https://example.com/product",
        true,
    );

    let notifier: Box<dyn NotifierPlugin> = if sender == EXAMPLE_SENDER {
        Box::new(DryRunNotifier::new(sender, recipient))
    } else {
        let mut notifications = config.notifications.clone();
        notifications.sender_email = Some(sender.to_string());
        notifications.recipient_email = Some(recipient.to_string());
        info!("Attempting to send test email...");
        Box::new(EmailNotifier::new(notifications))
    };

    match notifier.notify(&product).await {
        Ok(message_id) => info!("Email sent successfully! Message ID: {}", message_id),
        Err(e) => error!("Error sending email: {}", e),
    }
}

async fn analyze(config: &AppConfig, url: &str) {
    if let Err(e) = try_analyze(config, url).await {
        error!("Error analyzing HTML: {}", e);
    }
}

async fn try_analyze(config: &AppConfig, url: &str) -> Result<()> {
    info!("Analyzing HTML structure for: {}", url);

    let fetcher = HttpFetcher::new(&config.scraper)?;
    let page = fetch_page(&fetcher, url, &RetryPolicy::from(&config.scraper)).await?;
    let report = analyze_structure(&page.body)?;

    println!("\n{}", rule_line());
    println!("HTML STRUCTURE ANALYSIS");
    println!("{}", rule_line());
    print!("{}", report);

    tokio::fs::write(STRUCTURE_FILE, &page.body).await?;
    println!("\nFull HTML saved to {} for manual inspection", STRUCTURE_FILE);
    println!("{}\n", rule_line());
    Ok(())
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, text: &str) -> Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;

    Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
}

async fn menu(config: &AppConfig) {
    if let Err(e) = run_menu(config).await {
        error!("Menu error: {}", e);
    }
}

async fn run_menu(config: &AppConfig) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("\nProduct Availability Scraper - Local Test Tool");
    println!("{}", rule_line());

    loop {
        println!("\nChoose an option:");
        println!("1. Test scraping with default URL");
        println!("2. Test scraping with custom URL");
        println!("3. Test email notification (dry run)");
        println!("4. Analyze HTML structure");
        println!("5. Exit");

        // EOF on stdin ends the menu like choosing Exit.
        let Some(choice) = prompt(&mut lines, "\nEnter your choice (1-5): ").await? else {
            println!("Exiting...");
            return Ok(());
        };

        match choice.as_str() {
            "1" => check(config, &target_url(config, None)).await,
            "2" => {
                let url = prompt(&mut lines, "Enter the product URL: ").await?;
                check(config, &target_url(config, url)).await;
            }
            "3" => {
                let sender = prompt(&mut lines, "Enter sender email (or press enter to skip): ")
                    .await?
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| EXAMPLE_SENDER.to_string());
                let recipient =
                    prompt(&mut lines, "Enter recipient email (or press enter to skip): ")
                        .await?
                        .filter(|s| !s.is_empty())
                        .unwrap_or_else(|| EXAMPLE_RECIPIENT.to_string());
                email(config, &sender, &recipient).await;
            }
            "4" => {
                let url =
                    prompt(&mut lines, "Enter URL to analyze (or press enter for default): ")
                        .await?;
                analyze(config, &target_url(config, url)).await;
            }
            "5" => {
                println!("Exiting...");
                return Ok(());
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

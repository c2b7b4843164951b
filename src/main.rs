use anyhow::{Context, Result, bail};
use busdash::api::ApiClient;
use busdash::state::SelectionState;
use busdash::{config, logging, tui};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "busdash")]
#[command(about = "Dashboard client for the bus ticket crawler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    overrides: ClientArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive dashboard (the default).
    Tui,
    /// Print crawler status and exit.
    Status,
    /// Start a crawl job from the command line.
    Start(StartArgs),
    /// Ask the server to stop the running job.
    Stop,
    /// List output data files.
    Files,
    /// Print the cross-platform comparison report.
    Compare,
    /// Request price/occupancy predictions.
    Predict(PredictArgs),
}

#[derive(Args, Serialize)]
struct ClientArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    server_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    platform: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    verbose: Option<bool>,
}

#[derive(Args)]
struct StartArgs {
    /// Route name, repeatable.
    #[arg(long = "route", required = true)]
    routes: Vec<String>,

    /// Travel date (YYYY-MM-DD), repeatable.
    #[arg(long = "date", required = true)]
    dates: Vec<String>,

    #[arg(long, default_value_t = 3)]
    workers: u32,

    #[arg(long, default_value_t = 1)]
    runs: u32,
}

#[derive(Args)]
struct PredictArgs {
    /// Restrict predictions to one route.
    #[arg(long)]
    route: Option<String>,

    /// Predict this many days ahead.
    #[arg(long, conflicts_with_all = ["start_date", "end_date"])]
    days: Option<u32>,

    #[arg(long, requires = "end_date")]
    start_date: Option<String>,

    #[arg(long, requires = "start_date")]
    end_date: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::AppConfig::new(Some(&cli.overrides))?;

    let command = cli.command.unwrap_or(Commands::Tui);

    // The TUI owns the terminal; tracing output would tear the screen.
    if !matches!(command, Commands::Tui) {
        logging::init(logging::LogConfig {
            json: false,
            verbose: config.verbose,
        });
    }

    match command {
        Commands::Tui => tui::run(config).await.context("Dashboard exited with an error")?,
        Commands::Status => run_status(config).await?,
        Commands::Start(args) => run_start(config, args).await?,
        Commands::Stop => run_stop(config).await?,
        Commands::Files => run_files(config).await?,
        Commands::Compare => run_compare(config).await?,
        Commands::Predict(args) => run_predict(config, args).await?,
    }

    Ok(())
}

async fn run_status(config: config::AppConfig) -> Result<()> {
    let client = ApiClient::new(config.server_url);
    let status = client.status().await.context("Failed to fetch status")?;

    let Some(crawl) = status.for_platform(&config.platform) else {
        bail!("No status reported for platform {}", config.platform);
    };

    let state = if crawl.is_running { "RUNNING" } else { "idle" };
    println!("{}: {}", config.platform, state);
    println!(
        "  tasks: {}/{} ({:.1}%)",
        crawl.completed_tasks, crawl.total_tasks, crawl.progress
    );
    println!(
        "  scraped: {}  ok: {}  failed: {}",
        crawl.stats.total_scraped, crawl.stats.successful, crawl.stats.failed
    );
    for task in &crawl.current_tasks {
        println!("  active: {}", task);
    }
    Ok(())
}

async fn run_start(config: config::AppConfig, args: StartArgs) -> Result<()> {
    let mut selection = SelectionState::new();
    selection.select_all_routes(args.routes);
    selection.select_all_dates(args.dates);
    selection.max_workers = args.workers;
    selection.runs_per_task = args.runs;
    selection.validate_start()?;

    let client = ApiClient::new(config.server_url);
    let response = client
        .start(Some(&config.platform), &selection.to_request())
        .await
        .context("Failed to start crawl")?;

    println!("{} ({} tasks)", response.message, response.total_tasks);
    Ok(())
}

async fn run_stop(config: config::AppConfig) -> Result<()> {
    let client = ApiClient::new(config.server_url);
    let ack = client
        .stop(Some(&config.platform))
        .await
        .context("Failed to stop crawl")?;
    println!("{}", ack.message);
    Ok(())
}

async fn run_files(config: config::AppConfig) -> Result<()> {
    let client = ApiClient::new(config.server_url);
    let files = client
        .data_files(Some(&config.platform))
        .await
        .context("Failed to list data files")?;

    if files.is_empty() {
        println!("No data files");
        return Ok(());
    }
    for file in files {
        println!(
            "{:<48} {:>8} rows  {}",
            file.filename, file.rows, file.modified
        );
    }
    Ok(())
}

async fn run_compare(config: config::AppConfig) -> Result<()> {
    let client = ApiClient::new(config.server_url);
    let report = client.compare().await.context("Failed to fetch comparison")?;

    println!(
        "traveloka: {} files, {} records, avg price {:.0}",
        report.traveloka.total_files, report.traveloka.total_records, report.traveloka.avg_price
    );
    println!(
        "redbus:    {} files, {} records, avg price {:.0}",
        report.redbus.total_files, report.redbus.total_records, report.redbus.avg_price
    );
    for row in &report.comparison {
        println!(
            "{:<32} traveloka={:<8} redbus={}",
            row.route, row.traveloka_records, row.redbus_records
        );
    }
    Ok(())
}

async fn run_predict(config: config::AppConfig, args: PredictArgs) -> Result<()> {
    let request = busdash::api::types::PredictRequest {
        route: args.route,
        days: args.days,
        start_date: args.start_date,
        end_date: args.end_date,
    };

    let client = ApiClient::new(config.server_url);
    let response = client.predict(&request).await.context("Prediction failed")?;

    println!(
        "Session {}: {} predictions",
        response.session_id, response.total_predictions
    );
    for row in &response.predictions {
        println!(
            "{:<28} {:<12} total={:<6.0} vip={:<5.0} exec={:<5.0} price={}",
            row.route_name,
            row.prediction_date,
            row.predicted_total,
            row.predicted_vip,
            row.predicted_executive,
            row.predicted_price
                .map(|p| format!("{:.0}", p))
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    Ok(())
}

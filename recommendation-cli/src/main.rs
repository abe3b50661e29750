//! `recommend` binary: restaurant recommendations from the terminal.
//!
//! Subcommands: `recommend` (one request), `info` (dataset overview), `cities`,
//! `interactive` (prompt loop on stdin).

mod interactive;

use anyhow::Context;
use clap::{Parser, Subcommand};
use restaurant_recommender::{
    CsvDatasetSource, DatasetInfo, MockGateway, RecommendationApp, RecommenderConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Canned answer used with `--offline`.
const OFFLINE_RESPONSE: &str = "1. Offline mode - the LLM was not contacted. \
Run without --offline and with GROQ_API_KEY set to get real recommendations.";

#[derive(Parser, Debug)]
#[command(name = "recommend", version)]
#[command(about = "Zomato AI restaurant recommendations from the command line")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// Restaurant dataset (CSV with a header row)
    #[arg(long, global = true, env = "DATASET_PATH", value_name = "PATH")]
    dataset: Option<PathBuf>,

    /// Groq API key
    #[arg(long, global = true, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model identifier sent to the LLM service
    #[arg(long, global = true, env = "GROQ_MODEL", value_name = "MODEL")]
    model: Option<String>,

    /// Use a canned LLM reply instead of calling the service
    #[arg(long, global = true)]
    offline: bool,

    /// Log pipeline details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recommend restaurants for one set of preferences
    Recommend {
        #[arg(long)]
        city: String,

        /// Budget for two people, in rupees
        #[arg(long, allow_negative_numbers = true)]
        price: i64,

        /// veg or non-veg
        #[arg(long, default_value = "veg")]
        diet: String,

        /// Print the structured result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a dataset overview
    Info,
    /// List the cities present in the dataset
    Cities,
    /// Ask for preferences repeatedly until EOF or `quit`
    Interactive,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "restaurant_recommender=debug,recommendation_cli=debug"
    } else {
        "warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so reports and --json output stay clean on stdout.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
        Ok("pretty") => tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
        _ => tracing_subscriber::fmt()
            .compact()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

/// Environment settings overridden by command-line flags.
fn build_config(args: &Args) -> anyhow::Result<RecommenderConfig> {
    let mut config = RecommenderConfig::from_env().context("Invalid configuration")?;
    if let Some(dataset) = &args.dataset {
        config.dataset_path = dataset.clone();
    }
    if let Some(api_key) = args.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        config.api_key = Some(api_key.to_string());
    }
    if let Some(model) = &args.model {
        config.gateway.model = model.clone();
    }
    Ok(config)
}

fn build_app(args: &Args, config: &RecommenderConfig) -> anyhow::Result<RecommendationApp> {
    let app = if args.offline {
        RecommendationApp::from_source(
            &CsvDatasetSource::new(&config.dataset_path),
            Arc::new(MockGateway::with_response(OFFLINE_RESPONSE)),
        )
    } else {
        RecommendationApp::from_config(config)
    };
    app.with_context(|| format!("Failed to load {}", config.dataset_path.display()))
}

fn print_info(info: &DatasetInfo) {
    println!("Total restaurants: {}", info.total_restaurants);
    println!("Available cities: {}", info.available_cities);
    println!("Columns: {}", info.columns.join(", "));
    println!("Sample restaurants:");
    for row in &info.sample_restaurants {
        println!(
            "  - {} ({}, Rs.{} for two)",
            row.name,
            row.city.as_deref().unwrap_or("unknown city"),
            row.approx_cost_for_two.as_deref().unwrap_or("?"),
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = build_config(&args)?;
    debug!(dataset = %config.dataset_path.display(), offline = args.offline, "Starting");
    let app = build_app(&args, &config)?;

    match &args.cmd {
        Command::Recommend {
            city,
            price,
            diet,
            json,
        } => match app.recommend(city, *price, diet).await {
            Ok(outcome) if *json => {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
            Ok(outcome) => {
                let display = app.display();
                println!(
                    "{}",
                    display.format_recommendations(&outcome.result, &outcome.user_input)
                );
                println!(
                    "{}",
                    display.format_statistics(
                        app.dataset().len(),
                        outcome.total_matches,
                        outcome.result.recommendations.len(),
                    )
                );
            }
            Err(e) => {
                eprintln!("{}", app.display().format_error(&e));
                std::process::exit(1);
            }
        },
        Command::Info => print_info(&app.get_dataset_info()),
        Command::Cities => {
            for city in app.get_available_cities() {
                println!("{city}");
            }
        }
        Command::Interactive => interactive::run(&app).await?,
    }

    Ok(())
}

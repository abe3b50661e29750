use anyhow::Context;
use recommendation_service::create_app;
use restaurant_recommender::RecommenderConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "recommendation_service=debug,restaurant_recommender=info,tower_http=debug".into()
    });

    match log_format.as_str() {
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = RecommenderConfig::from_env().context("Invalid configuration")?;
    if config.api_key.is_none() {
        warn!("GROQ_API_KEY not set; recommendation requests will fail until it is provided");
    }

    let app = create_app(&config).context("Failed to initialise the recommendation app")?;
    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    let addr = listener.local_addr()?;

    info!("Restaurant recommendation service starting on {}", addr);
    info!("API description available at http://{}/", addr);
    info!("Health check endpoint: http://{}/health", addr);
    info!("Recommendations endpoint: POST http://{}/api/recommendations", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

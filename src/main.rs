use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use stockcast::config::Config;
use stockcast::services::{Metrics, PredictionService, SequenceClassifier, StandardScaler, TickerRegistry};
use stockcast::sources::{FetchWindow, YahooFinanceClient};
use stockcast::{build_app, AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockcast=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting stockcast server on {}:{}", config.host, config.port);

    // Startup artifacts are required; any failure here is fatal
    let registry = TickerRegistry::load(&config.tickers_path)
        .with_context(|| format!("loading ticker registry from {}", config.tickers_path.display()))?;
    let scaler = StandardScaler::load(&config.scaler_path)
        .with_context(|| format!("loading scaler from {}", config.scaler_path.display()))?;
    let model = SequenceClassifier::load(&config.model_path)
        .with_context(|| format!("loading model from {}", config.model_path.display()))?;

    let source = YahooFinanceClient::new(config.yahoo_base_url.clone(), config.fetch_timeout)
        .context("building Yahoo Finance client")?;

    FetchWindow::trailing(config.lookback_days, Utc::now())
        .with_context(|| format!("LOOKBACK_DAYS={} is out of range", config.lookback_days))?;

    let predictor = Arc::new(PredictionService::new(
        registry,
        Arc::new(source),
        scaler,
        model,
        config.lookback_days,
    ));

    let state = AppState {
        predictor,
        metrics: Metrics::new().context("registering metrics")?,
    };

    let app = build_app(state);

    // Start the server
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("stockcast server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

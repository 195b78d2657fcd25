use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use cardwatch::config::Config;
use cardwatch::pipeline::TransactionPipeline;
use cardwatch::seed::cardholders::seed_cardholders;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Initialize structured logging (set RUST_LOG=info for output)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    tracing::info!("Cardwatch starting");

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path)?;
    tracing::info!(
        fraud_threshold = config.scoring.fraud_threshold,
        suspicious_threshold = config.scoring.suspicious_threshold,
        "Configuration loaded from {}",
        config_path
    );

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(|e| eyre::eyre!("Failed to connect to database: {}", e))?;

    tracing::info!("Connected to PostgreSQL");

    // Run migrations (creates the four core tables and the reference
    // cardholders)
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| eyre::eyre!("Failed to run migrations: {}", e))?;

    tracing::info!("Database migrations complete");

    // Initialize the analysis pipeline (cardholder profiles, scoring engine)
    let mut pipeline = TransactionPipeline::init(&pool, &config).await?;
    tracing::info!("Analysis pipeline initialized");

    // Seed additional cardholders from JSON file
    if let Some(ref path) = config.api.seed_cardholders_path {
        match seed_cardholders(&pool, &mut pipeline.profile_store, path).await {
            Ok(count) => tracing::info!(count, "Cardholders seeded"),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to seed cardholders, continuing without")
            }
        }
    }

    if !config.scoring.enabled {
        tracing::warn!("Scoring disabled by config: transactions will be recorded unscored");
    }

    if !config.api.enabled {
        tracing::warn!("API disabled by config, nothing to serve");
        return Ok(());
    }

    let pipeline = Arc::new(Mutex::new(pipeline));

    tracing::info!("Cardwatch started. Press Ctrl+C to stop.");
    cardwatch::api::serve(pool, pipeline, &config.api.host, config.api.port).await?;

    tracing::info!("Cardwatch stopped gracefully");
    Ok(())
}

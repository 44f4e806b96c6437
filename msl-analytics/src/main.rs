//! msl-analytics - Analytics service
//!
//! Play/engagement event tracking and aggregation endpoints.

use anyhow::Result;
use clap::Parser;
use msl_analytics::config::{AnalyticsConfig, Overrides};
use msl_analytics::{build_router, db, AppState};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "msl-analytics", about = "MSL analytics service")]
struct Args {
    /// HTTP listen port
    #[arg(long)]
    port: Option<String>,

    /// Database path
    #[arg(long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting MSL Analytics (msl-analytics) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = AnalyticsConfig::resolve(&Overrides {
        port: args.port,
        database: args.database,
    })?;
    info!("Database path: {}", config.database_path.display());

    let pool = msl_common::db::init_pool(&config.database_path).await?;
    db::init_schema(&pool).await?;

    let state = AppState::new(pool);
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("msl-analytics listening on http://{}", addr);
    info!("Health check: http://localhost:{}/health", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}

//! msl-catalog - Catalog service
//!
//! Song objects in a media library directory: list/get/upload/delete and
//! time-limited signed stream URLs.

use anyhow::Result;
use clap::Parser;
use msl_catalog::config::{CatalogConfig, Overrides};
use msl_catalog::store::{self, MediaStore};
use msl_catalog::{build_router, AppState};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "msl-catalog", about = "MSL catalog service")]
struct Args {
    /// HTTP listen port
    #[arg(long)]
    port: Option<String>,

    /// Metadata database path
    #[arg(long)]
    database: Option<String>,

    /// Media library directory
    #[arg(long)]
    media_root: Option<String>,

    /// Base URL used in media URLs handed to clients
    #[arg(long)]
    base_url: Option<String>,

    /// Secret for signed stream URLs
    #[arg(long)]
    signing_secret: Option<String>,
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
        "Starting MSL Catalog (msl-catalog) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = CatalogConfig::resolve(&Overrides {
        port: args.port,
        database: args.database,
        media_root: args.media_root,
        base_url: args.base_url,
        signing_secret: args.signing_secret,
    })?;
    info!("Media root: {}", config.media_root.display());
    info!("Database path: {}", config.database_path.display());

    let pool = msl_common::db::init_pool(&config.database_path).await?;
    store::init_schema(&pool).await?;

    let media = MediaStore::open(config.media_root.clone())?;

    let state = AppState::new(
        pool,
        media,
        config.public_base_url.clone(),
        config.signing_secret.clone(),
    );
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("msl-catalog listening on http://{}", addr);
    info!("Health check: http://localhost:{}/health", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}

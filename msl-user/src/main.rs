//! msl-user - User/auth service
//!
//! Registration, login, profiles, playlists, favorites, and listening
//! history behind a bearer-JWT surface.

use anyhow::Result;
use clap::Parser;
use msl_user::config::{Overrides, UserConfig};
use msl_user::{build_router, db, AppState};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "msl-user", about = "MSL user/auth service")]
struct Args {
    /// HTTP listen port
    #[arg(long)]
    port: Option<String>,

    /// Database path
    #[arg(long)]
    database: Option<String>,

    /// HS256 secret for issued bearer tokens
    #[arg(long)]
    jwt_secret: Option<String>,
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
        "Starting MSL User (msl-user) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = UserConfig::resolve(&Overrides {
        port: args.port,
        database: args.database,
        jwt_secret: args.jwt_secret,
    })?;
    info!("Database path: {}", config.database_path.display());

    let pool = msl_common::db::init_pool(&config.database_path).await?;
    db::init_schema(&pool).await?;

    let state = AppState::new(pool, config.jwt_secret.clone());
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("msl-user listening on http://{}", addr);
    info!("Health check: http://localhost:{}/health", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}

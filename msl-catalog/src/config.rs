//! Catalog service configuration
//!
//! Settings resolve through the shared 4-tier priority order (CLI flag,
//! environment variable, `[catalog]` table of the TOML config file,
//! compiled default).

use msl_common::config::{parse_port, resolve_setting, ConfigFile};
use msl_common::{signing, Result};
use std::path::PathBuf;
use tracing::warn;

/// Command-line overrides, filled in by the binary's clap parser
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<String>,
    pub database: Option<String>,
    pub media_root: Option<String>,
    pub base_url: Option<String>,
    pub signing_secret: Option<String>,
}

/// Resolved catalog service configuration
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// HTTP listen port
    pub port: u16,
    /// SQLite metadata database path
    pub database_path: PathBuf,
    /// Media library directory (the "bucket")
    pub media_root: PathBuf,
    /// Base URL used when building public and signed media URLs
    pub public_base_url: String,
    /// Secret for signed stream URLs
    pub signing_secret: String,
}

impl CatalogConfig {
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let file = ConfigFile::discover()?;

        let port = parse_port(&resolve_setting(
            overrides.port.as_deref(),
            "MSL_CATALOG_PORT",
            &file,
            "catalog",
            "port",
            "3001",
        ))?;

        let database_path = PathBuf::from(resolve_setting(
            overrides.database.as_deref(),
            "MSL_CATALOG_DB",
            &file,
            "catalog",
            "database",
            "catalog.db",
        ));

        let media_root = PathBuf::from(resolve_setting(
            overrides.media_root.as_deref(),
            "MSL_MEDIA_ROOT",
            &file,
            "catalog",
            "media_root",
            "media",
        ));

        let public_base_url = resolve_setting(
            overrides.base_url.as_deref(),
            "MSL_CATALOG_BASE_URL",
            &file,
            "catalog",
            "base_url",
            &format!("http://localhost:{}", port),
        )
        .trim_end_matches('/')
        .to_string();

        let signing_secret = resolve_setting(
            overrides.signing_secret.as_deref(),
            "MSL_SIGNING_SECRET",
            &file,
            "catalog",
            "signing_secret",
            "",
        );
        let signing_secret = if signing_secret.is_empty() {
            // Signed URLs from this instance die with the process
            warn!("No signing secret configured; generated an ephemeral one");
            signing::generate_secret()
        } else {
            signing_secret
        };

        Ok(Self {
            port,
            database_path,
            media_root,
            public_base_url,
            signing_secret,
        })
    }
}

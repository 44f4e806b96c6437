//! Analytics service configuration

use msl_common::config::{parse_port, resolve_setting, ConfigFile};
use msl_common::Result;
use std::path::PathBuf;

/// Command-line overrides, filled in by the binary's clap parser
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<String>,
    pub database: Option<String>,
}

/// Resolved analytics service configuration
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// HTTP listen port
    pub port: u16,
    /// SQLite database path
    pub database_path: PathBuf,
}

impl AnalyticsConfig {
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let file = ConfigFile::discover()?;

        let port = parse_port(&resolve_setting(
            overrides.port.as_deref(),
            "MSL_ANALYTICS_PORT",
            &file,
            "analytics",
            "port",
            "3003",
        ))?;

        let database_path = PathBuf::from(resolve_setting(
            overrides.database.as_deref(),
            "MSL_ANALYTICS_DB",
            &file,
            "analytics",
            "database",
            "analytics.db",
        ));

        Ok(Self {
            port,
            database_path,
        })
    }
}

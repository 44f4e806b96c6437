//! User service configuration

use msl_common::config::{parse_port, resolve_setting, ConfigFile};
use msl_common::Result;
use std::path::PathBuf;
use tracing::warn;

/// Command-line overrides, filled in by the binary's clap parser
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<String>,
    pub database: Option<String>,
    pub jwt_secret: Option<String>,
}

/// Resolved user service configuration
#[derive(Debug, Clone)]
pub struct UserConfig {
    /// HTTP listen port
    pub port: u16,
    /// SQLite database path
    pub database_path: PathBuf,
    /// HS256 secret for issued bearer tokens
    pub jwt_secret: String,
}

impl UserConfig {
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let file = ConfigFile::discover()?;

        let port = parse_port(&resolve_setting(
            overrides.port.as_deref(),
            "MSL_USER_PORT",
            &file,
            "user",
            "port",
            "3002",
        ))?;

        let database_path = PathBuf::from(resolve_setting(
            overrides.database.as_deref(),
            "MSL_USER_DB",
            &file,
            "user",
            "database",
            "users.db",
        ));

        let jwt_secret = resolve_setting(
            overrides.jwt_secret.as_deref(),
            "MSL_JWT_SECRET",
            &file,
            "user",
            "jwt_secret",
            "fallback-secret",
        );
        if jwt_secret == "fallback-secret" {
            warn!("Using the built-in fallback JWT secret; set MSL_JWT_SECRET in production");
        }

        Ok(Self {
            port,
            database_path,
            jwt_secret,
        })
    }
}

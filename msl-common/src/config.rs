//! Configuration resolution shared by all services
//!
//! Every service resolves each of its settings through the same priority
//! order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file (`[service]` table)
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use std::path::PathBuf;

/// Environment variable naming the TOML config file
pub const CONFIG_FILE_ENV: &str = "MSL_CONFIG_FILE";

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE_DEFAULT: &str = "msl.toml";

/// Parsed TOML config file, shared by every setting lookup of one startup
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    doc: Option<toml::Value>,
}

impl ConfigFile {
    /// Load the config file named by `MSL_CONFIG_FILE`, falling back to
    /// `./msl.toml`. A missing file is not an error (empty config); an
    /// unparseable file is.
    pub fn discover() -> Result<Self> {
        let path = std::env::var(CONFIG_FILE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE_DEFAULT));

        if !path.exists() {
            return Ok(Self { doc: None });
        }

        let content = std::fs::read_to_string(&path)?;
        let doc = toml::from_str::<toml::Value>(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(Self { doc: Some(doc) })
    }

    /// Construct an empty config (no file present)
    pub fn empty() -> Self {
        Self { doc: None }
    }

    /// Read a string value from `[section]` / `key`
    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        self.doc
            .as_ref()?
            .get(section)?
            .get(key)?
            .as_str()
            .map(str::to_string)
    }
}

/// Resolve a string setting through the 4-tier priority order
pub fn resolve_setting(
    cli_arg: Option<&str>,
    env_var_name: &str,
    file: &ConfigFile,
    section: &str,
    key: &str,
    default: &str,
) -> String {
    // Priority 1: Command-line argument
    if let Some(value) = cli_arg {
        return value.to_string();
    }

    // Priority 2: Environment variable
    if let Ok(value) = std::env::var(env_var_name) {
        if !value.is_empty() {
            return value;
        }
    }

    // Priority 3: TOML config file
    if let Some(value) = file.get(section, key) {
        return value;
    }

    // Priority 4: Compiled default
    default.to_string()
}

/// Parse a resolved port setting
pub fn parse_port(value: &str) -> Result<u16> {
    value
        .parse::<u16>()
        .map_err(|_| Error::Config(format!("Invalid port: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with(content: &str) -> ConfigFile {
        ConfigFile {
            doc: Some(toml::from_str(content).unwrap()),
        }
    }

    #[test]
    fn cli_argument_wins() {
        let file = file_with("[catalog]\nport = \"9000\"\n");
        let value = resolve_setting(
            Some("7000"),
            "MSL_TEST_UNSET_VAR",
            &file,
            "catalog",
            "port",
            "3001",
        );
        assert_eq!(value, "7000");
    }

    #[test]
    fn config_file_beats_default() {
        let file = file_with("[catalog]\nport = \"9000\"\n");
        let value = resolve_setting(None, "MSL_TEST_UNSET_VAR", &file, "catalog", "port", "3001");
        assert_eq!(value, "9000");
    }

    #[test]
    fn default_when_nothing_set() {
        let value = resolve_setting(
            None,
            "MSL_TEST_UNSET_VAR",
            &ConfigFile::empty(),
            "catalog",
            "port",
            "3001",
        );
        assert_eq!(value, "3001");
    }

    #[test]
    fn port_parsing() {
        assert_eq!(parse_port("3001").unwrap(), 3001);
        assert!(parse_port("not-a-port").is_err());
        assert!(parse_port("70000").is_err());
    }
}

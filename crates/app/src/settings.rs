//! Application settings.
//!
//! Read from `settings.toml` (optional) and overridden by `SPLITLEDGER__*`
//! environment variables, e.g. `SPLITLEDGER__SERVER__PORT=8080`.

use std::str::FromStr;

use config::{Config, ConfigError, Environment, File};
use engine::Tolerance;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Default, Deserialize)]
pub struct EngineSettings {
    /// Settlement tolerance as a decimal string, e.g. `"0.01"`.
    pub tolerance: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub engine: EngineSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("SPLITLEDGER").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Tolerance for the optimizer; the default applies when unset.
    pub fn tolerance(&self) -> Result<Tolerance, engine::EngineError> {
        match self.engine.tolerance.as_deref() {
            Some(raw) => Tolerance::from_str(raw.trim()),
            None => Ok(Tolerance::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_tolerance(raw: Option<&str>) -> Settings {
        Settings {
            app: App::default(),
            server: None,
            engine: EngineSettings {
                tolerance: raw.map(ToString::to_string),
            },
        }
    }

    #[test]
    fn tolerance_defaults_to_one_cent() {
        assert_eq!(with_tolerance(None).tolerance().unwrap(), Tolerance::default());
    }

    #[test]
    fn sub_cent_tolerance_is_accepted() {
        let tolerance = with_tolerance(Some(" 0.005 ")).tolerance().unwrap();
        assert_eq!(tolerance.to_string(), "0.005");
    }

    #[test]
    fn negative_tolerance_fails_startup() {
        assert!(with_tolerance(Some("-0.01")).tolerance().is_err());
        assert!(with_tolerance(Some("abc")).tolerance().is_err());
    }

    #[test]
    fn database_variants_deserialize() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(
                "[server]\nport = 3000\ndatabase = { sqlite = \"ledger.db\" }\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        let server = settings.server.unwrap();
        assert_eq!(server.port, 3000);
        assert!(matches!(server.database, Database::Sqlite(ref path) if path == "ledger.db"));
        assert_eq!(settings.app.level, "info");
    }
}

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub scorer: ScorerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }

/// Database settings. Without a `url` the in-memory user store is used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

/// External scorer settings
#[derive(Debug, Clone, Deserialize)]
pub struct ScorerSettings {
    /// Root that script and dataset candidates are resolved against
    #[serde(default = "default_app_root")]
    pub app_root: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Address-space ceiling for the scorer process, 0 disables it
    #[serde(default = "default_memory_limit_mb")]
    pub memory_limit_mb: u64,
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for ScorerSettings {
    fn default() -> Self {
        Self {
            app_root: default_app_root(),
            timeout_secs: default_timeout_secs(),
            memory_limit_mb: default_memory_limit_mb(),
            probe_timeout_secs: default_probe_timeout_secs(),
            max_results: default_max_results(),
        }
    }
}

impl ScorerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

fn default_app_root() -> PathBuf { PathBuf::from(".") }
fn default_timeout_secs() -> u64 { 180 }
fn default_memory_limit_mb() -> u64 { 2048 }
fn default_probe_timeout_secs() -> u64 { 10 }
fn default_max_results() -> usize { 5 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with CAREERPATH__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CAREERPATH__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("CAREERPATH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_database_url(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("CAREERPATH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// `DATABASE_URL` wins over whatever the config files say.
fn apply_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        _ => Ok(settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_scorer_settings() {
        let scorer = ScorerSettings::default();
        assert_eq!(scorer.timeout(), Duration::from_secs(180));
        assert_eq!(scorer.memory_limit_mb, 2048);
        assert_eq!(scorer.max_results, 5);
        assert_eq!(scorer.probe_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_load_from_file_fills_missing_sections() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "[server]\nport = 9100\n\n[scorer]\ntimeout_secs = 30").unwrap();

        let settings = Settings::load_from(file.path()).unwrap();

        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.scorer.timeout_secs, 30);
        assert_eq!(settings.scorer.memory_limit_mb, 2048);
        assert!(settings.database.url.is_none());
    }
}

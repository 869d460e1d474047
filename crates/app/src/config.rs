use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

pub const DEFAULT_CONFIG_PATH: &str = "config/countdown.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub celebration: CelebrationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CelebrationConfig {
    /// Probability that a burst uses hearts.
    #[serde(default = "default_heart_chance")]
    pub heart_chance: f64,
}

impl Default for CelebrationConfig {
    fn default() -> Self {
        Self {
            heart_chance: default_heart_chance(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_heart_chance() -> f64 {
    countdown_core::celebration::HEART_BURST_CHANCE
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (`COUNTDOWN__DATABASE__URL`, etc.)
    /// 2. Config file given by path or `COUNTDOWN_CONFIG`
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder()
            .set_default("database.url", "sqlite://countdown.sqlite3")?
            .set_default("log_level", default_log_level())?
            .set_default("celebration.heart_chance", default_heart_chance())?;

        let config_file_path = config_path
            .or_else(|| env::var("COUNTDOWN_CONFIG").ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        // The file is optional.
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("COUNTDOWN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("database.url must not be empty".to_string());
        }
        if !(0.0..=1.0).contains(&self.celebration.heart_chance) {
            return Err("celebration.heart_chance must be between 0 and 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_a_file() {
        let config = Config::load(Some("does/not/exist.toml".into())).unwrap();
        assert_eq!(config.log_level, "info");
        assert!((config.celebration.heart_chance - 0.35).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_values_override_defaults() {
        let path = env::temp_dir().join(format!("countdown-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "log_level = \"debug\"\n[database]\nurl = \"sqlite::memory:\"\n[celebration]\nheart_chance = 0.5"
        )
        .unwrap();

        let config = Config::load(Some(path.display().to_string())).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.database.url, "sqlite::memory:");
        assert!((config.celebration.heart_chance - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_out_of_range_heart_chance() {
        let config = Config {
            database: DatabaseConfig {
                url: "sqlite::memory:".into(),
            },
            log_level: default_log_level(),
            celebration: CelebrationConfig { heart_chance: 1.5 },
        };
        assert!(config.validate().is_err());
    }
}

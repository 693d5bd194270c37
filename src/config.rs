use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::CliArgs;
use crate::countdown::Countdown;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Config {
    pub version: u32,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub countdowns: Vec<Countdown>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ClockConfig {
    pub tick_interval_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct UiConfig {
    pub show_days: bool,
    pub expired_text: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            clock: ClockConfig::default(),
            ui: UiConfig::default(),
            countdowns: Vec::new(),
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_days: true,
            expired_text: "expired".to_string(),
        }
    }
}

pub fn get_default_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "tickshare")
        .context("Failed to determine project directories")?;

    let config_dir = proj_dirs.config_dir();
    Ok(config_dir.join("tickshare.toml"))
}

impl Config {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p,
            None => get_default_config_path()?,
        };

        if !path.exists() {
            let default_config = Config::default();
            // Create directory if it doesn't exist
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .context("Failed to create config directory")?;
            }
            default_config.save(&path)?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.clock.tick_interval_ms == 0 {
            bail!("clock.tick_interval_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.clock.tick_interval_ms)
    }

    pub fn from_cli_and_file(cli_args: CliArgs, config_path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::load(config_path)?;

        // CLI args override config file
        if let Some(tick_ms) = cli_args.tick_ms {
            config.clock.tick_interval_ms = tick_ms;
        }
        config.countdowns.extend(cli_args.countdowns);

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.version, 1);
        assert_eq!(config.clock.tick_interval_ms, 1000);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert!(config.ui.show_days);
        assert_eq!(config.ui.expired_text, "expired");
        assert!(config.countdowns.is_empty());
    }

    #[test]
    fn test_config_serialization_roundtrip() -> Result<()> {
        let mut config = Config::default();
        config.ui.show_days = false;
        config.countdowns.push(Countdown::new("Launch", 1_700_003_600));
        config.countdowns.push(Countdown::new("Deadline", 1_700_086_400));

        let toml_str = toml::to_string(&config)?;
        let parsed_config: Config = toml::from_str(&toml_str)?;

        assert_eq!(config, parsed_config);
        Ok(())
    }

    #[test]
    fn test_config_sections_are_optional() -> Result<()> {
        let config: Config = toml::from_str("version = 1\n")?;
        assert_eq!(config.clock, ClockConfig::default());
        assert_eq!(config.ui, UiConfig::default());
        Ok(())
    }

    #[test]
    fn test_config_load_nonexistent_creates_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join("nonexistent.toml");

        let config = Config::load(Some(config_path.clone()))?;

        assert_eq!(config, Config::default());
        assert!(config_path.exists());

        Ok(())
    }

    #[test]
    fn test_config_load_rejects_zero_interval() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("zero.toml");
        fs::write(&config_path, "version = 1\n[clock]\ntick_interval_ms = 0\n")?;

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(format!("{:#}", err).contains("tick_interval_ms"));
        Ok(())
    }

    #[test]
    fn test_config_load_reports_parse_errors() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "version = \"one\"")?;

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
        Ok(())
    }

    #[test]
    fn test_cli_override() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("test.toml");

        let original_config = Config {
            countdowns: vec![Countdown::new("From file", 100)],
            ..Config::default()
        };
        original_config.save(&config_path)?;

        let cli_args = CliArgs {
            config: None,
            tick_ms: Some(250),
            countdowns: vec![Countdown::new("From cli", 200)],
        };

        let final_config = Config::from_cli_and_file(cli_args, Some(config_path))?;
        assert_eq!(final_config.clock.tick_interval_ms, 250);
        assert_eq!(
            final_config.countdowns,
            vec![Countdown::new("From file", 100), Countdown::new("From cli", 200)]
        );

        Ok(())
    }

    #[test]
    fn test_cli_zero_interval_rejected() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let cli_args = CliArgs {
            config: None,
            tick_ms: Some(0),
            countdowns: Vec::new(),
        };

        let result = Config::from_cli_and_file(cli_args, Some(temp_dir.path().join("c.toml")));
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_get_default_config_path() -> Result<()> {
        let path = get_default_config_path()?;
        assert!(path.ends_with("tickshare.toml"));
        Ok(())
    }
}

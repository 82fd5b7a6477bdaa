use crate::error::{CropCastError, Result};
use crate::logic::history::DEFAULT_CAPACITY;
use dialoguer::{Confirm, Input};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub predictor: PredictorConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub openweathermap: Option<OpenWeatherMapConfig>,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PredictorConfig {
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    pub url: String,
    /// Earlier messages sent along with each question
    #[serde(default = "default_context_messages")]
    pub context_messages: usize,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_context_messages() -> usize {
    5
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVICE_URL.into(),
            context_messages: default_context_messages(),
            enabled: true,
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct OpenWeatherMapConfig {
    pub api_key: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl std::fmt::Debug for OpenWeatherMapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherMapConfig")
            .field("api_key", &"[REDACTED]")
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .field("enabled", &self.enabled)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

fn default_history_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(CropCastError::Config(format!(
                "Config file not found at {:?}. Run `cropcast init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| CropCastError::Config(format!("Failed to read config: {}", e)))?;

        tracing::debug!(path = %config_path.display(), "Loading configuration");
        Self::from_yaml(&config_str)
    }

    /// Parse YAML after substituting `${VAR}` placeholders from the environment.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content)?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| CropCastError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.predictor.url.trim().is_empty() {
            return Err(CropCastError::Config("predictor.url must not be empty".into()));
        }
        if self.history.capacity == 0 {
            return Err(CropCastError::Config(
                "history.capacity must be at least 1".into(),
            ));
        }
        if let Some(owm) = &self.openweathermap {
            if !(-90.0..=90.0).contains(&owm.latitude) || !(-180.0..=180.0).contains(&owm.longitude)
            {
                return Err(CropCastError::Config(format!(
                    "openweathermap coordinates out of range: {}, {}",
                    owm.latitude, owm.longitude
                )));
            }
        }
        Ok(())
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("cropcast").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        Self::default_config_path()
    }

    /// Returns true if a config file can be found in any standard location.
    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/cropcast/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CropCastError::Config("Cannot determine config directory".into()))?
            .join("cropcast");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("No configuration found. Let's set up CropCast!");
        println!();

        println!("Prediction service");
        let predictor_url: String = Input::new()
            .with_prompt("  URL")
            .default(DEFAULT_SERVICE_URL.into())
            .interact_text()
            .map_err(input_error)?;

        println!();

        println!("Farming assistant chat");
        let chat_enabled = Confirm::new()
            .with_prompt("  Enable chat?")
            .default(true)
            .interact()
            .map_err(input_error)?;

        let chat_url: String = if chat_enabled {
            Input::new()
                .with_prompt("  URL")
                .default(predictor_url.clone())
                .interact_text()
                .map_err(input_error)?
        } else {
            predictor_url.clone()
        };

        println!();

        println!("OpenWeatherMap (leave API key blank to skip)");
        let owm_api_key: String = Input::new()
            .with_prompt("  API key")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(input_error)?;

        let openweathermap = if owm_api_key.is_empty() {
            None
        } else {
            let latitude: f64 = Input::new()
                .with_prompt("  Latitude")
                .default(28.61)
                .interact_text()
                .map_err(input_error)?;

            let longitude: f64 = Input::new()
                .with_prompt("  Longitude")
                .default(77.21)
                .interact_text()
                .map_err(input_error)?;

            Some(OpenWeatherMapConfig {
                api_key: owm_api_key,
                latitude,
                longitude,
                enabled: true,
            })
        };

        println!();

        let config = Config {
            predictor: PredictorConfig {
                url: predictor_url,
                timeout_secs: default_timeout_secs(),
            },
            chat: ChatConfig {
                url: chat_url,
                context_messages: default_context_messages(),
                enabled: chat_enabled,
            },
            openweathermap,
            history: HistoryConfig::default(),
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| CropCastError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# CropCast Configuration\n# Generated by `cropcast init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        let mut result = content.to_string();

        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| CropCastError::Config(format!("Invalid substitution pattern: {}", e)))?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            match std::env::var(var_name) {
                Ok(value) => result = result.replace(placeholder, &value),
                Err(_) => tracing::warn!(var = var_name, "Config references unset variable"),
            }
        }

        Ok(result)
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        if let Ok(dir) = std::env::var("CROPCAST_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| CropCastError::Config("Cannot determine data directory".into()))?
            .join("cropcast");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("cropcast.db"))
    }

    pub fn log_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("cropcast.log"))
    }

    /// Weather settings, if configured and switched on.
    pub fn weather(&self) -> Option<&OpenWeatherMapConfig> {
        self.openweathermap.as_ref().filter(|owm| owm.enabled)
    }
}

fn input_error(e: dialoguer::Error) -> CropCastError {
    CropCastError::Config(format!("Input error: {}", e))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            predictor: PredictorConfig {
                url: DEFAULT_SERVICE_URL.into(),
                timeout_secs: default_timeout_secs(),
            },
            chat: ChatConfig::default(),
            openweathermap: None,
            history: HistoryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let config = Config::from_yaml("predictor:\n  url: http://localhost:5000\n").unwrap();
        assert_eq!(config.predictor.timeout_secs, 30);
        assert_eq!(config.chat.context_messages, 5);
        assert!(config.chat.enabled);
        assert_eq!(config.history.capacity, 50);
        assert!(config.weather().is_none());
    }

    #[test]
    fn substitutes_environment_variables() {
        std::env::set_var("CROPCAST_TEST_OWM_KEY", "abc123");
        let yaml = "predictor:\n  url: http://localhost:5000\nopenweathermap:\n  api_key: ${CROPCAST_TEST_OWM_KEY}\n  latitude: 28.6\n  longitude: 77.2\n";
        let config = Config::from_yaml(yaml).unwrap();
        let owm = config.weather().unwrap();
        assert_eq!(owm.api_key, "abc123");
        assert!(!format!("{:?}", owm).contains("abc123"));
    }

    #[test]
    fn disabled_weather_is_ignored() {
        let yaml = "predictor:\n  url: http://x\nopenweathermap:\n  api_key: k\n  latitude: 1.0\n  longitude: 2.0\n  enabled: false\n";
        assert!(Config::from_yaml(yaml).unwrap().weather().is_none());
    }

    #[test]
    fn rejects_zero_capacity() {
        let yaml = "predictor:\n  url: http://x\nhistory:\n  capacity: 0\n";
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(CropCastError::Config(_))
        ));
    }

    #[test]
    fn rejects_bad_coordinates() {
        let yaml = "predictor:\n  url: http://x\nopenweathermap:\n  api_key: k\n  latitude: 123.0\n  longitude: 2.0\n";
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn missing_predictor_is_an_error() {
        assert!(Config::from_yaml("chat:\n  url: http://x\n").is_err());
    }
}

use crate::captions::CaptionFormat;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the trend harvester
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Platform API settings
    pub api: ApiConfig,

    /// Caption resolution settings
    pub captions: CaptionConfig,

    /// Bulk collection settings
    pub collection: CollectionConfig,

    /// Output and storage settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Platform API key (falls back to YOUTUBE_API_KEY)
    pub youtube_api_key: Option<String>,

    /// Third-party dataset token (falls back to APIFY_API_TOKEN)
    pub apify_token: Option<String>,

    /// Timeout for every transport call, in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionConfig {
    /// Default caption language
    pub default_language: String,

    /// Download formats in preference order
    pub preferred_formats: Vec<CaptionFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Videos fetched per category during a bulk sweep (max 50)
    pub max_videos_per_category: usize,

    /// Search phase fetches up to this multiple of the requested count
    pub overfetch_multiplier: usize,

    /// Recency window for the popular-by-category search, in days
    pub published_after_days: i64,

    /// Maximum number of concurrent units of work
    pub max_workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Base output directory for saved results
    pub base_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Config {
    /// Load configuration from file, falling back to environment variables.
    pub fn load() -> Result<Self> {
        let config_paths = [
            "trend-harvester.toml",
            "config/trend-harvester.toml",
            "~/.config/trend-harvester/config.toml",
            "/etc/trend-harvester/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(mut config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        config.apply_env();
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self::from_env())
    }

    /// Build configuration from defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("YOUTUBE_API_KEY") {
            if !key.is_empty() {
                self.api.youtube_api_key = Some(key);
            }
        }

        if let Ok(token) = std::env::var("APIFY_API_TOKEN") {
            if !token.is_empty() {
                self.api.apify_token = Some(token);
            }
        }

        if let Ok(workers) = std::env::var("TREND_HARVESTER_WORKERS") {
            self.collection.max_workers = workers.parse().unwrap_or(self.collection.max_workers);
        }

        if let Ok(max) = std::env::var("TREND_HARVESTER_MAX_PER_CATEGORY") {
            self.collection.max_videos_per_category =
                max.parse().unwrap_or(self.collection.max_videos_per_category);
        }

        if let Ok(output_dir) = std::env::var("TREND_HARVESTER_OUTPUT_DIR") {
            self.output.base_dir = PathBuf::from(output_dir);
        }

        if let Ok(log_level) = std::env::var("TREND_HARVESTER_LOG_LEVEL") {
            self.output.log_level = log_level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_seconds == 0 {
            return Err(anyhow!("timeout_seconds must be greater than 0"));
        }

        if self.collection.max_workers == 0 {
            return Err(anyhow!("max_workers must be greater than 0"));
        }

        if self.collection.overfetch_multiplier == 0 {
            return Err(anyhow!("overfetch_multiplier must be at least 1"));
        }

        if self.collection.max_videos_per_category == 0
            || self.collection.max_videos_per_category > 50
        {
            return Err(anyhow!("max_videos_per_category must be between 1 and 50"));
        }

        if self.captions.default_language.is_empty() {
            return Err(anyhow!("default caption language cannot be empty"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                youtube_api_key: None,
                apify_token: None,
                timeout_seconds: 30,
            },
            captions: CaptionConfig {
                default_language: "en".to_string(),
                preferred_formats: vec![CaptionFormat::Srt, CaptionFormat::Vtt],
            },
            collection: CollectionConfig {
                max_videos_per_category: 10,
                overfetch_multiplier: 2,
                published_after_days: 365,
                max_workers: num_cpus::get().min(8),
            },
            output: OutputConfig {
                base_dir: PathBuf::from("./trend_results"),
                log_level: "info".to_string(),
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api.youtube_api_key = Some(api_key.into());
        self
    }

    pub fn with_apify_token(mut self, token: impl Into<String>) -> Self {
        self.config.api.apify_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.config.api.timeout_seconds = seconds;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.collection.max_workers = workers;
        self
    }

    pub fn with_max_per_category(mut self, max: usize) -> Self {
        self.config.collection.max_videos_per_category = max;
        self
    }

    pub fn with_overfetch_multiplier(mut self, multiplier: usize) -> Self {
        self.config.collection.overfetch_multiplier = multiplier;
        self
    }

    pub fn with_published_after_days(mut self, days: i64) -> Self {
        self.config.collection.published_after_days = days;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.base_dir = dir;
        self
    }

    pub fn with_caption_language(mut self, language: impl Into<String>) -> Self {
        self.config.captions.default_language = language.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.collection.max_videos_per_category, 10);
        assert_eq!(config.collection.overfetch_multiplier, 2);
        assert_eq!(config.captions.default_language, "en");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_api_key("0123456789abcdef")
            .with_workers(8)
            .with_max_per_category(25)
            .with_overfetch_multiplier(3)
            .build();

        assert_eq!(
            config.api.youtube_api_key.as_deref(),
            Some("0123456789abcdef")
        );
        assert_eq!(config.collection.max_workers, 8);
        assert_eq!(config.collection.max_videos_per_category, 25);
        assert_eq!(config.collection.overfetch_multiplier, 3);
    }

    #[test]
    fn test_validation_rejects_bad_limits() {
        let config = ConfigBuilder::new().with_max_per_category(0).build();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new().with_max_per_category(51).build();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new().with_workers(0).build();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new().with_overfetch_multiplier(0).build();
        assert!(config.validate().is_err());
    }
}

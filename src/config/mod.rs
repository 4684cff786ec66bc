//! Configuration management for pagecrop.
//!
//! Configuration is read from the file passed with `--config`, or from
//! `~/.config/pagecrop/config.toml` when it exists. Missing fields fall back to
//! their defaults and command-line flags override whatever the file sets.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use serde::Deserialize;

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Number of pages to harvest per run (default: 20)
    pub count: usize,

    /// Maximum number of workers with a live browser at once.
    /// Defaults to the host's available parallelism.
    pub concurrency: usize,

    /// Run Chrome without a visible window (default: false)
    pub headless: bool,

    /// Custom Chrome/Chromium executable
    pub binary_location: Option<PathBuf>,

    /// Pause after the landmark appears, letting dynamic content settle (default: 2000)
    pub settle_delay_ms: u64,

    pub fetcher: FetcherConfig,
    pub extractor: ExtractorConfig,
    pub output: OutputConfig,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            count: 20,
            concurrency: default_concurrency(),
            headless: false,
            binary_location: None,
            settle_delay_ms: 2000,
            fetcher: FetcherConfig::default(),
            extractor: ExtractorConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Where to go and how hard to try.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Page that redirects to a random article
    pub target_url: String,

    /// CSS selector whose presence marks the page as loaded
    pub landmark_selector: String,

    /// How long to wait for the landmark per attempt, in seconds (default: 5)
    pub wait_timeout_secs: u64,

    /// Total navigation attempts before giving up (default: 3)
    pub max_attempts: u32,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            target_url: "https://en.wikipedia.org/wiki/Special:Random".to_string(),
            landmark_selector: "#content".to_string(),
            wait_timeout_secs: 5,
            max_attempts: 3,
        }
    }
}

impl FetcherConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

/// CSS selectors for the three harvested fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Element carrying the canonical URL in its `href`
    pub canonical_selector: String,
    pub title_selector: String,
    pub last_modified_selector: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            canonical_selector: r#"link[rel="canonical"]"#.to_string(),
            title_selector: "h1#firstHeading".to_string(),
            last_modified_selector: "li#footer-info-lastmod".to_string(),
        }
    }
}

/// Output file naming and placement.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the CSV file is written to (default: current directory)
    pub directory: PathBuf,

    /// File name prefix (default: "output_")
    pub prefix: String,

    /// File extension without the dot (default: "csv")
    pub extension: String,

    /// Hours east of UTC used for the file name timestamp (default: 3, Moscow)
    pub utc_offset_hours: i32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            prefix: "output_".to_string(),
            extension: "csv".to_string(),
            utc_offset_hours: 3,
        }
    }
}

impl OutputConfig {
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .ok_or(ConfigError::InvalidOffset(self.utc_offset_hours))
    }
}

impl HarvestConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Load configuration from `path`, or from the default path if it exists.
    ///
    /// An explicitly given file must exist. Without one, a missing default
    /// file yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_config_path() {
                Ok(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        Self::from_toml(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Get the default config file path: `~/.config/pagecrop/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("pagecrop").join("config.toml"))
    }

    /// Reject values the harvester cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        if self.fetcher.max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be at least 1".into()));
        }
        self.output.offset()?;
        Ok(())
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("UTC offset of {0} hours is out of range")]
    InvalidOffset(i32),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = HarvestConfig::default();
        assert_eq!(config.count, 20);
        assert!(config.concurrency >= 1);
        assert!(!config.headless);
        assert!(config.binary_location.is_none());
        assert_eq!(config.settle_delay(), Duration::from_secs(2));
        assert_eq!(config.fetcher.max_attempts, 3);
        assert_eq!(config.fetcher.wait_timeout(), Duration::from_secs(5));
        assert_eq!(config.fetcher.landmark_selector, "#content");
        assert_eq!(config.output.prefix, "output_");
        assert_eq!(config.output.extension, "csv");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = HarvestConfig::from_toml(
            r#"
count = 5
headless = true

[fetcher]
max_attempts = 4

[output]
directory = "/tmp/harvest"
"#,
        )
        .unwrap();

        assert_eq!(config.count, 5);
        assert!(config.headless);
        assert_eq!(config.fetcher.max_attempts, 4);
        assert_eq!(config.fetcher.wait_timeout_secs, 5);
        assert_eq!(config.output.directory, PathBuf::from("/tmp/harvest"));
        assert_eq!(config.output.prefix, "output_");
        assert_eq!(config.extractor.title_selector, "h1#firstHeading");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(HarvestConfig::from_toml("count = \"many\"").is_err());
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = HarvestConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "settle_delay_ms = 0\nconcurrency = 2\n").unwrap();

        let config = HarvestConfig::load(Some(&path)).unwrap();
        assert_eq!(config.settle_delay(), Duration::ZERO);
        assert_eq!(config.concurrency, 2);
    }

    #[test]
    fn test_validate() {
        let mut config = HarvestConfig::default();
        assert!(config.validate().is_ok());

        config.concurrency = 0;
        assert!(config.validate().is_err());

        config.concurrency = 1;
        config.output.utc_offset_hours = 30;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOffset(30))
        ));
    }

    #[test]
    fn test_moscow_offset() {
        let output = OutputConfig::default();
        assert_eq!(output.offset().unwrap().local_minus_utc(), 3 * 3600);
    }
}

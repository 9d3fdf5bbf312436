//! Configuration management for chanfetch

use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CHANNEL_URL: &str = "https://www.youtube.com/@vk-streaming3526";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub channel: ChannelConfig,
    pub paths: PathsConfig,
    pub output: OutputConfig,
    pub download: DownloadConfig,
    pub verify: VerifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Channel used by the step commands
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Path to yt-dlp binary (auto-detected if not set)
    pub yt_dlp: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root under which metadata/, downloads/ and reports/ are created
    pub base_directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// yt-dlp format selector
    pub format: String,
    /// Download shorts alongside regular videos
    pub include_shorts: bool,
    /// Pause between successive downloads, in seconds
    pub delay_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Extensions accepted as the media file
    pub media_extensions: Vec<String>,
    /// Extensions accepted as the thumbnail
    pub thumbnail_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel: ChannelConfig {
                url: DEFAULT_CHANNEL_URL.to_string(),
            },
            paths: PathsConfig { yt_dlp: None },
            output: OutputConfig {
                base_directory: PathBuf::from("."),
            },
            download: DownloadConfig {
                format: "best".to_string(),
                include_shorts: false,
                delay_secs: 1.5,
            },
            verify: VerifyConfig::default(),
        }
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            media_extensions: vec!["mp4".to_string()],
            thumbnail_extensions: vec!["webp".to_string(), "jpg".to_string(), "png".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Load from default config directory
        if let Some(config_dir) = dirs::config_dir() {
            let default_config = config_dir.join("chanfetch/config.toml");
            if default_config.exists() {
                figment = figment.merge(Toml::file(&default_config));
            }
        }

        // Load from specified config file
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment
        figment = figment.merge(Env::prefixed("CHANFETCH_").split("__"));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::LoadError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.delay()?;
        if self.verify.media_extensions.is_empty() {
            return Err(ConfigError::InvalidValue(
                "verify.media_extensions must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Get yt-dlp path, auto-detecting if not configured
    pub fn yt_dlp_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.yt_dlp {
            Ok(path.clone())
        } else {
            which::which("yt-dlp")
                .map_err(|_| ConfigError::InvalidValue("yt-dlp not found in PATH".to_string()))
        }
    }

    /// Pause between downloads; rejects negative, NaN and out-of-range values
    pub fn delay(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.download.delay_secs).map_err(|_| {
            ConfigError::InvalidValue(format!(
                "download.delay_secs must be a non-negative number of seconds, got {}",
                self.download.delay_secs
            ))
        })
    }

    pub fn layout(&self) -> Layout {
        Layout::new(&self.output.base_directory)
    }
}

/// Fixed directory layout rooted at a base directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    base: PathBuf,
}

impl Layout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn metadata_dir(&self) -> PathBuf {
        self.base.join("metadata")
    }

    pub fn raw_listing(&self) -> PathBuf {
        self.metadata_dir().join("channel_raw_info.json")
    }

    pub fn videos_metadata(&self) -> PathBuf {
        self.metadata_dir().join("videos_metadata.json")
    }

    pub fn shorts_metadata(&self) -> PathBuf {
        self.metadata_dir().join("shorts_metadata.json")
    }

    pub fn summary(&self) -> PathBuf {
        self.metadata_dir().join("summary.txt")
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.base.join("downloads")
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.downloads_dir().join("videos")
    }

    pub fn video_dir(&self, id: &str) -> PathBuf {
        self.videos_dir().join(id)
    }

    pub fn verification_results(&self) -> PathBuf {
        self.downloads_dir().join("verification_results.json")
    }

    pub fn verification_report(&self) -> PathBuf {
        self.downloads_dir().join("verification_report.txt")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.base.join("reports")
    }

    pub fn run_report(&self) -> PathBuf {
        self.reports_dir().join("download_report.txt")
    }
}

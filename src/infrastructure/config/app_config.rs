//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const APP_NAME: &str = "chatkit";
const APP_QUALIFIER: &str = "rs";
const APP_ORGANIZATION: &str = "chatkit";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, merged from the config file and CLI.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Enable mouse support.
    #[serde(default = "default_true")]
    pub mouse: bool,

    /// UI configuration.
    #[serde(default)]
    pub ui: UiConfig,

    /// Theme configuration.
    #[serde(default)]
    pub theme: ThemeConfig,

    /// Image cache configuration.
    #[serde(default)]
    pub images: ImagesConfig,

    /// Conversation shown by the demo screen.
    #[serde(default)]
    pub conversation: ConversationConfig,
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Show image previews for attachments.
    #[serde(default = "default_true")]
    pub image_preview: bool,

    /// Timestamp format string (chrono format).
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            image_preview: true,
            timestamp_format: default_timestamp_format(),
        }
    }
}

/// Theme configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Accent color (name or hex code).
    #[serde(default = "default_accent_color")]
    pub accent_color: String,

    /// Status/placeholder gray (name or hex code).
    #[serde(default)]
    pub status_color: Option<String>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            accent_color: default_accent_color(),
            status_color: None,
        }
    }
}

/// Image cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Maximum decoded images kept in memory.
    #[serde(default = "default_memory_cache_size")]
    pub memory_cache_size: usize,

    /// Maximum disk cache size in megabytes.
    #[serde(default = "default_disk_cache_mb")]
    pub disk_cache_mb: u64,

    /// Maximum concurrent downloads.
    #[serde(default = "default_max_downloads")]
    pub max_concurrent_downloads: usize,

    /// Download timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            memory_cache_size: default_memory_cache_size(),
            disk_cache_mb: default_disk_cache_mb(),
            max_concurrent_downloads: default_max_downloads(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ImagesConfig {
    /// Converts to the loader's configuration type.
    #[must_use]
    pub const fn to_loader_config(&self) -> crate::infrastructure::image::ImageLoaderConfig {
        crate::infrastructure::image::ImageLoaderConfig {
            memory_cache_size: self.memory_cache_size,
            disk_cache_size: self.disk_cache_mb * 1024 * 1024,
            max_concurrent_downloads: self.max_concurrent_downloads,
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Conversation shown by the demo screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Title shown in the navigation chrome.
    #[serde(default = "default_title")]
    pub title: String,

    /// Presence line shown under the title.
    #[serde(default)]
    pub status: Option<String>,

    /// Avatar image URL; when absent the avatar slot is omitted.
    #[serde(default)]
    pub cover_url: Option<String>,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            status: None,
            cover_url: None,
        }
    }
}

fn default_accent_color() -> String {
    "Yellow".to_string()
}

fn default_timestamp_format() -> String {
    "%H:%M".to_string()
}

fn default_true() -> bool {
    true
}

fn default_memory_cache_size() -> usize {
    64
}

fn default_disk_cache_mb() -> u64 {
    100
}

fn default_max_downloads() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_title() -> String {
    "Chat".to_string()
}

use super::args::CliArgs;

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(config_path) = args.config {
            self.config = Some(config_path);
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(mouse) = args.mouse {
            self.mouse = mouse;
        }
        if let Some(accent_color) = args.accent_color {
            self.theme.accent_color = accent_color;
        }
        if let Some(title) = args.title {
            self.conversation.title = title;
        }
        if let Some(status) = args.status {
            self.conversation.status = Some(status);
        }
        if let Some(cover_url) = args.cover_url {
            self.conversation.cover_url = Some(cover_url);
        }
        if let Some(image_preview) = args.image_preview {
            self.ui.image_preview = image_preview;
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("chatkit.log"))
    }

    /// Returns effective config path.
    #[must_use]
    pub fn effective_config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Self::default_config_path)
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            mouse: true,
            ui: UiConfig::default(),
            theme: ThemeConfig::default(),
            images: ImagesConfig::default(),
            conversation: ConversationConfig::default(),
        }
    }
}

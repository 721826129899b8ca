use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Gemini API key (falls back to the GOOGLE_API_KEY environment variable)
    pub api_key: Option<String>,
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL for the Generative Language API (overridable for proxies)
    pub base_url: Option<String>,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Remote file-processing poll policy
    #[serde(default)]
    pub poll: PollConfig,
    /// Video download settings
    #[serde(default)]
    pub download: DownloadConfig,
    /// Persistence backend settings
    #[serde(default)]
    pub store: StoreConfig,
}

/// Bounded retry policy for remote file-processing polls
#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    /// Initial delay between polls in milliseconds (grows with each attempt)
    #[serde(default = "default_poll_delay_ms")]
    pub delay_ms: u64,
    /// Maximum number of poll attempts before giving up
    #[serde(default = "default_poll_attempts")]
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_poll_delay_ms(),
            max_attempts: default_poll_attempts(),
        }
    }
}

/// Settings handed to the video downloader
#[derive(Debug, Deserialize, Clone)]
pub struct DownloadConfig {
    /// yt-dlp format selection
    #[serde(default = "default_format")]
    pub format: String,
    /// Directory for downloaded media and staged cookie files
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,
    /// Path to a Netscape-format cookie file
    pub cookies_file: Option<String>,
    /// Raw cookie blob (e.g. from a secret); staged to a temp file on use
    pub cookies: Option<String>,
    /// User agent presented to the platform
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            temp_dir: default_temp_dir(),
            cookies_file: None,
            cookies: None,
            user_agent: default_user_agent(),
        }
    }
}

/// Persistence backend selection and settings
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Backend name: "json" or "sheets"
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Path of the JSON array file (json backend)
    #[serde(default = "default_db_file")]
    pub db_file: String,
    /// Directory for mirrored thumbnail images
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
    /// Spreadsheet identifier (sheets backend)
    pub spreadsheet_id: Option<String>,
    /// Sheet tab name (sheets backend)
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// OAuth access token for the Sheets API (sheets backend)
    pub access_token: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            db_file: default_db_file(),
            media_dir: default_media_dir(),
            spreadsheet_id: None,
            sheet_name: default_sheet_name(),
            access_token: None,
        }
    }
}

// Default value functions
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout() -> u64 {
    30
}

fn default_poll_delay_ms() -> u64 {
    1000
}

fn default_poll_attempts() -> u32 {
    120
}

fn default_format() -> String {
    "best".to_string()
}

fn default_temp_dir() -> String {
    "temp".to_string()
}

fn default_user_agent() -> String {
    // Some platforms only serve the mobile player
    "Mozilla/5.0 (iPhone; CPU iPhone OS 14_8 like Mac OS X) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/14.1.2 Mobile/15E148 Safari/604.1"
        .to_string()
}

fn default_backend() -> String {
    "json".to_string()
}

fn default_db_file() -> String {
    "database.json".to_string()
}

fn default_media_dir() -> String {
    "media".to_string()
}

fn default_sheet_name() -> String {
    "Recettes".to_string()
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with REEL prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: REEL__STORE__DB_FILE
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Optional config file (can be missing)
            .add_source(File::with_name("config").required(false))
            // Use double underscore for nested: REEL__POLL__MAX_ATTEMPTS
            .add_source(
                Environment::with_prefix("REEL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(default_model(), "gemini-2.5-flash");
        assert_eq!(default_temperature(), 0.7);
        assert_eq!(default_poll_delay_ms(), 1000);
        assert_eq!(default_poll_attempts(), 120);
        assert_eq!(default_backend(), "json");
    }

    #[test]
    fn test_poll_config_default() {
        let poll = PollConfig::default();
        assert_eq!(poll.delay_ms, 1000);
        assert_eq!(poll.max_attempts, 120);
    }

    #[test]
    fn test_download_config_default() {
        let download = DownloadConfig::default();
        assert_eq!(download.format, "best");
        assert_eq!(download.temp_dir, "temp");
        assert!(download.cookies_file.is_none());
        assert!(download.cookies.is_none());
        assert!(download.user_agent.contains("iPhone"));
    }

    #[test]
    fn test_store_config_default() {
        let store = StoreConfig::default();
        assert_eq!(store.backend, "json");
        assert_eq!(store.db_file, "database.json");
        assert_eq!(store.media_dir, "media");
        assert!(store.spreadsheet_id.is_none());
    }
}

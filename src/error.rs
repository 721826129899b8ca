use thiserror::Error;

/// Errors that can occur while importing a recipe from a video
#[derive(Error, Debug)]
pub enum ImportError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The downloader could not produce a media file
    #[error("Download failed: {0}")]
    Downloader(String),

    /// Neither a media file nor usable text metadata was available
    #[error("Nothing to analyse: {0}")]
    Blocked(String),

    /// The remote API answered with a non-success status
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// No API key in configuration or environment
    #[error("GOOGLE_API_KEY not found in config or environment")]
    MissingApiKey,

    /// The model answer could not be decoded as JSON; carries the raw text
    #[error("Unparseable model output: {message}")]
    ModelOutput { message: String, raw: String },

    /// The uploaded file never left the processing state
    #[error("Remote file still processing after {attempts} attempts")]
    ProcessingTimeout { attempts: u32 },

    /// The remote service failed to process the uploaded file
    #[error("Remote file processing failed: {0}")]
    Processing(String),

    /// Persistence backend failure
    #[error("Store error: {0}")]
    Store(String),

    /// No record with the given identifier
    #[error("No recipe with id {0}")]
    NotFound(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

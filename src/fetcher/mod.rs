pub mod page;
pub mod ytdlp;

pub use page::{PageFetcher, PageMetadata};
pub use ytdlp::{DownloadedVideo, YtDlp};

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};

use crate::config::DownloadConfig;
use crate::error::ImportError;

/// What the fetcher managed to obtain for a URL.
///
/// Download and network errors never surface as errors here: the degraded
/// states are normal outcomes the pipeline dispatches on.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The binary stream was downloaded
    Media {
        path: PathBuf,
        title: String,
        thumbnail: Option<String>,
    },
    /// The stream was unavailable but the page still served usable text
    MetadataOnly {
        title: String,
        description: String,
        thumbnail: Option<String>,
    },
    /// Neither media nor usable text; carries the downloader's error text
    Blocked { reason: String },
}

/// Source of video content for the extraction pipeline.
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Production fetcher: yt-dlp first, page metadata scrape as degraded mode.
pub struct VideoFetcher {
    downloader: YtDlp,
    page: PageFetcher,
}

impl VideoFetcher {
    /// Build the fetcher, staging the configured cookie blob to a file if
    /// needed (yt-dlp only accepts cookies from a file).
    pub async fn new(config: &DownloadConfig) -> Result<Self, ImportError> {
        let cookies = stage_cookies(config).await?;
        if cookies.is_some() {
            info!("Using platform cookies for downloads");
        }

        Ok(VideoFetcher {
            downloader: YtDlp::new(config, cookies),
            page: PageFetcher::new(&config.user_agent, Duration::from_secs(30))?,
        })
    }
}

#[async_trait]
impl VideoSource for VideoFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let download_error = match self.downloader.download(url).await {
            Ok(video) => {
                return FetchOutcome::Media {
                    path: video.path,
                    title: video.title,
                    thumbnail: video.thumbnail,
                };
            }
            Err(e) => e.to_string(),
        };
        warn!("Download failed for {}: {}", url, download_error);

        // Degraded mode: the platform may block the stream yet serve the page
        match self.page.fetch_metadata(url).await {
            Ok(metadata) if metadata.has_text() => FetchOutcome::MetadataOnly {
                title: metadata.title,
                description: metadata.description,
                thumbnail: metadata.thumbnail,
            },
            Ok(_) => FetchOutcome::Blocked {
                reason: download_error,
            },
            Err(page_error) => {
                warn!("Page metadata scrape failed for {}: {}", url, page_error);
                FetchOutcome::Blocked {
                    reason: download_error,
                }
            }
        }
    }
}

/// Resolve the cookie file to hand to yt-dlp.
///
/// An explicit file path wins; otherwise a configured cookie blob (typically
/// injected as a secret) is written to `<temp_dir>/cookies.txt`.
async fn stage_cookies(config: &DownloadConfig) -> Result<Option<PathBuf>, ImportError> {
    if let Some(path) = &config.cookies_file {
        return Ok(Some(PathBuf::from(path)));
    }

    if let Some(blob) = &config.cookies {
        let temp_dir = PathBuf::from(&config.temp_dir);
        tokio::fs::create_dir_all(&temp_dir).await?;
        let path = temp_dir.join("cookies.txt");
        tokio::fs::write(&path, blob).await?;
        return Ok(Some(path));
    }

    Ok(None)
}

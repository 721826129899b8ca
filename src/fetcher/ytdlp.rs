use std::path::PathBuf;
use std::process::Stdio;

use log::debug;
use serde_json::Value;
use tokio::process::Command;

use crate::config::DownloadConfig;
use crate::error::ImportError;

/// A successfully downloaded media file with its metadata.
#[derive(Debug, Clone)]
pub struct DownloadedVideo {
    pub path: PathBuf,
    pub title: String,
    pub thumbnail: Option<String>,
}

/// Wrapper around the yt-dlp command-line tool.
///
/// The executable is called directly rather than through bindings so the
/// crate does not chase yt-dlp's release cadence.
pub struct YtDlp {
    program: String,
    format: String,
    temp_dir: PathBuf,
    user_agent: String,
    cookies: Option<PathBuf>,
}

impl YtDlp {
    pub fn new(config: &DownloadConfig, cookies: Option<PathBuf>) -> Self {
        YtDlp {
            program: "yt-dlp".to_string(),
            format: config.format.clone(),
            temp_dir: PathBuf::from(&config.temp_dir),
            user_agent: config.user_agent.clone(),
            cookies,
        }
    }

    #[doc(hidden)]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Download the video behind `url` into the temp directory.
    ///
    /// yt-dlp is asked for its info dump (`--print-json`) so the final file
    /// path, the title, and the thumbnail URL come from one invocation.
    pub async fn download(&self, url: &str) -> Result<DownloadedVideo, ImportError> {
        tokio::fs::create_dir_all(&self.temp_dir).await?;
        let template = format!("{}/video_%(id)s.%(ext)s", self.temp_dir.display());

        let mut command = Command::new(&self.program);
        command
            .arg("--format")
            .arg(&self.format)
            .arg("--output")
            .arg(&template)
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("--no-check-certificates")
            .arg("--user-agent")
            .arg(&self.user_agent)
            .arg("--print-json");

        if let Some(cookies) = &self.cookies {
            command.arg("--cookies").arg(cookies);
        }

        let output = command
            .arg(url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                ImportError::Downloader(format!(
                    "Failed to execute {}: {e}. Make sure yt-dlp is installed.",
                    self.program
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ImportError::Downloader(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("yt-dlp info dump: {} bytes", stdout.len());
        let video = parse_info_dump(&stdout)?;

        if !video.path.exists() {
            return Err(ImportError::Downloader(format!(
                "yt-dlp reported {} but the file does not exist",
                video.path.display()
            )));
        }
        Ok(video)
    }
}

/// Parse the `--print-json` info dump into path/title/thumbnail.
fn parse_info_dump(stdout: &str) -> Result<DownloadedVideo, ImportError> {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with('{'))
        .ok_or_else(|| ImportError::Downloader("yt-dlp produced no info JSON".to_string()))?;

    let info: Value = serde_json::from_str(line)
        .map_err(|e| ImportError::Downloader(format!("Unreadable yt-dlp info dump: {e}")))?;

    let path = info["_filename"]
        .as_str()
        .or_else(|| info["filename"].as_str())
        .map(PathBuf::from)
        .ok_or_else(|| {
            ImportError::Downloader("yt-dlp info dump carries no filename".to_string())
        })?;

    Ok(DownloadedVideo {
        path,
        title: info["title"].as_str().unwrap_or("Recette").to_string(),
        thumbnail: info["thumbnail"].as_str().map(String::from),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info_dump() {
        let stdout = r#"{"id": "abc123", "_filename": "temp/video_abc123.mp4", "title": "Pasta hack", "thumbnail": "https://cdn.example.com/abc123.jpg"}"#;
        let video = parse_info_dump(stdout).unwrap();
        assert_eq!(video.path, PathBuf::from("temp/video_abc123.mp4"));
        assert_eq!(video.title, "Pasta hack");
        assert_eq!(
            video.thumbnail.as_deref(),
            Some("https://cdn.example.com/abc123.jpg")
        );
    }

    #[test]
    fn test_parse_info_dump_fallback_filename_key() {
        let stdout = r#"{"filename": "temp/video_x.webm", "title": "Clip"}"#;
        let video = parse_info_dump(stdout).unwrap();
        assert_eq!(video.path, PathBuf::from("temp/video_x.webm"));
        assert!(video.thumbnail.is_none());
    }

    #[test]
    fn test_parse_info_dump_defaults_title() {
        let stdout = r#"{"_filename": "temp/video_y.mp4"}"#;
        let video = parse_info_dump(stdout).unwrap();
        assert_eq!(video.title, "Recette");
    }

    #[test]
    fn test_parse_info_dump_without_json() {
        let err = parse_info_dump("WARNING: nothing here\n").unwrap_err();
        assert!(matches!(err, ImportError::Downloader(_)));
    }

    #[tokio::test]
    async fn test_missing_executable_is_absorbed() {
        let dir = tempfile::tempdir().unwrap();
        let config = DownloadConfig {
            temp_dir: dir.path().to_string_lossy().into_owned(),
            ..Default::default()
        };
        let downloader = YtDlp::new(&config, None).with_program("yt-dlp-definitely-not-installed");
        let err = downloader
            .download("https://example.com/v/1")
            .await
            .unwrap_err();
        match err {
            ImportError::Downloader(message) => {
                assert!(message.contains("yt-dlp-definitely-not-installed"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

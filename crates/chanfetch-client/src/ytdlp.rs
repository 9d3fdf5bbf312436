//! `VideoSource` backed by the yt-dlp JSON interface

use crate::error::ClientError;
use crate::video::{RawVideo, Stream, Video};
use crate::VideoSource;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct YtDlpClient {
    yt_dlp_path: PathBuf,
}

/// Entry emitted by `--flat-playlist`
#[derive(Debug, Deserialize)]
struct FlatEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    webpage_url: Option<String>,
}

impl FlatEntry {
    fn into_url(self) -> Option<String> {
        self.webpage_url.or(self.url).or_else(|| {
            self.id
                .map(|id| format!("https://www.youtube.com/watch?v={}", id))
        })
    }
}

impl YtDlpClient {
    pub fn new(yt_dlp_path: PathBuf) -> Self {
        Self { yt_dlp_path }
    }

    async fn run(&self, args: &[&str]) -> Result<Output, ClientError> {
        debug!("yt-dlp {}", args.join(" "));

        let output = Command::new(&self.yt_dlp_path)
            .args(args)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ClientError::ToolNotFound,
                _ => ClientError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            debug!("yt-dlp stderr: {}", stderr);

            if stderr.contains("Video unavailable") || stderr.contains("Private video") {
                let target = args.last().copied().unwrap_or_default();
                return Err(ClientError::VideoUnavailable(target.to_string()));
            }

            return Err(ClientError::CommandFailed {
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(output)
    }
}

#[async_trait]
impl VideoSource for YtDlpClient {
    async fn video_urls(&self, channel_url: &str) -> Result<Vec<String>, ClientError> {
        info!("Enumerating channel: {}", channel_url);

        let output = self
            .run(&["--flat-playlist", "--dump-json", channel_url])
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut urls = Vec::new();
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            let entry: FlatEntry = serde_json::from_str(line)?;
            if let Some(url) = entry.into_url() {
                urls.push(url);
            }
        }

        if urls.is_empty() {
            return Err(ClientError::EmptyChannel(channel_url.to_string()));
        }

        debug!("Found {} video URLs", urls.len());
        Ok(urls)
    }

    async fn video(&self, url: &str) -> Result<Video, ClientError> {
        let output = self
            .run(&["--dump-single-json", "--skip-download", "--no-playlist", url])
            .await?;

        let raw: RawVideo = serde_json::from_slice(&output.stdout)?;
        Ok(Video::from(raw))
    }

    async fn download_stream(
        &self,
        video: &Video,
        stream: &Stream,
        dest: &Path,
    ) -> Result<(), ClientError> {
        info!("Downloading format {} of {}", stream.format_id, video.video_id);

        let dest = dest.to_string_lossy();
        self.run(&[
            "-f",
            &stream.format_id,
            "-o",
            &dest,
            "--no-playlist",
            &video.watch_url,
        ])
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_entry_url_precedence() {
        let entry: FlatEntry = serde_json::from_str(
            r#"{"id": "x", "url": "https://www.youtube.com/shorts/x", "webpage_url": "https://www.youtube.com/watch?v=x"}"#,
        )
        .unwrap();
        assert_eq!(entry.into_url().unwrap(), "https://www.youtube.com/watch?v=x");

        let entry: FlatEntry = serde_json::from_str(r#"{"id": "y"}"#).unwrap();
        assert_eq!(entry.into_url().unwrap(), "https://www.youtube.com/watch?v=y");

        let entry: FlatEntry = serde_json::from_str(r#"{}"#).unwrap();
        assert!(entry.into_url().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_video_urls_from_stub() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let stub = dir.path().join("yt-dlp");
        std::fs::write(
            &stub,
            "#!/bin/sh\necho '{\"id\": \"a\", \"url\": \"https://www.youtube.com/watch?v=a\"}'\necho\necho '{\"id\": \"b\", \"url\": \"https://www.youtube.com/shorts/b\"}'\n",
        )
        .unwrap();
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();

        let client = YtDlpClient::new(stub);
        let urls = client.video_urls("https://www.youtube.com/@chan").await.unwrap();
        assert_eq!(
            urls,
            vec![
                "https://www.youtube.com/watch?v=a",
                "https://www.youtube.com/shorts/b"
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unavailable_video_is_classified() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let stub = dir.path().join("yt-dlp");
        std::fs::write(&stub, "#!/bin/sh\necho 'ERROR: Video unavailable' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();

        let client = YtDlpClient::new(stub);
        let err = client.video("https://www.youtube.com/watch?v=gone").await.unwrap_err();
        assert!(matches!(err, ClientError::VideoUnavailable(_)));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let client = YtDlpClient::new(PathBuf::from("/nonexistent/yt-dlp"));
        let err = client.video_urls("https://www.youtube.com/@chan").await.unwrap_err();
        assert!(matches!(err, ClientError::ToolNotFound));
    }
}

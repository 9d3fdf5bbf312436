//! Batch video downloader using yt-dlp

use crate::config::Layout;
use crate::error::DownloadError;
use crate::record::ListingRecord;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct Downloader {
    yt_dlp_path: PathBuf,
    format: String,
    delay: Duration,
}

/// Per-batch tally; one failing video never aborts the batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Records that had both an ID and a URL
    pub attempted: usize,
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedDownload>,
    /// 1-based positions of records skipped for a missing ID or URL
    pub skipped: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDownload {
    pub id: String,
    pub error: String,
}

impl Downloader {
    pub fn new(yt_dlp_path: PathBuf) -> Self {
        Self {
            yt_dlp_path,
            format: "best".to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Download every record into `downloads/videos/<id>/`
    pub async fn download_all(
        &self,
        videos: &[ListingRecord],
        layout: &Layout,
    ) -> Result<BatchReport, DownloadError> {
        fs::create_dir_all(layout.videos_dir()).await?;
        info!("Found {} videos to download", videos.len());

        let mut report = BatchReport::default();
        let total = videos.len();

        for (idx, record) in videos.iter().enumerate() {
            let position = idx + 1;
            let (Some(id), Some(url)) = (record.id(), record.url()) else {
                warn!("Skipping video {} due to missing ID or URL", position);
                report.skipped.push(position);
                continue;
            };

            if report.attempted > 0 && !self.delay.is_zero() {
                debug!("Waiting {:?} before next download", self.delay);
                tokio::time::sleep(self.delay).await;
            }
            report.attempted += 1;

            let title = record.title().unwrap_or("Unknown Title");
            info!("Downloading video {}/{}: {} (ID: {})", position, total, title, id);

            match self.download_one(record, id, url, layout).await {
                Ok(()) => {
                    info!("Successfully downloaded video: {}", title);
                    report.succeeded.push(id.to_string());
                }
                Err(e) => {
                    warn!("Error downloading video {}: {}", title, e);
                    report.failed.push(FailedDownload {
                        id: id.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Video download process completed: {} succeeded, {} failed, {} skipped",
            report.succeeded.len(),
            report.failed.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    async fn download_one(
        &self,
        record: &ListingRecord,
        id: &str,
        url: &str,
        layout: &Layout,
    ) -> Result<(), DownloadError> {
        let video_dir = layout.video_dir(id);
        fs::create_dir_all(&video_dir).await?;

        // Snapshot of the listing record
        fs::write(
            video_dir.join("metadata.json"),
            serde_json::to_string_pretty(record)?,
        )
        .await?;

        let output_template = video_dir.join("%(title)s.%(ext)s");

        let output = Command::new(&self.yt_dlp_path)
            .arg("-f")
            .arg(&self.format)
            .arg("-o")
            .arg(&output_template)
            .args(["--write-description", "--write-info-json", "--write-thumbnail"])
            .arg(url)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => DownloadError::ToolNotFound,
                _ => DownloadError::Io(e),
            })?;

        if !output.status.success() {
            debug!("yt-dlp stderr: {}", String::from_utf8_lossy(&output.stderr));
            return Err(DownloadError::ToolFailed(output.status.code()));
        }

        Ok(())
    }
}

/// Load a classified metadata collection written by the classifier
pub async fn load_records(path: &Path) -> Result<Vec<ListingRecord>, DownloadError> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DownloadError::MissingInput(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_str(&content)?)
}
